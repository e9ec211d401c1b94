// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report rendering for batch results

pub mod formatter;
pub mod sarif;

use crate::batch::BatchReport;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs;
use std::path::Path;

pub use formatter::ReportFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportOutputFormat {
    Text,
    Json,
    Yaml,
    Sarif,
}

impl ReportOutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportOutputFormat::Text),
            "json" => Some(ReportOutputFormat::Json),
            "yaml" | "yml" => Some(ReportOutputFormat::Yaml),
            "sarif" => Some(ReportOutputFormat::Sarif),
            _ => None,
        }
    }

    /// Format implied by a file's extension
    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportOutputFormat::Text => "txt",
            ReportOutputFormat::Json => "json",
            ReportOutputFormat::Yaml => "yaml",
            ReportOutputFormat::Sarif => "sarif",
        }
    }

    pub fn serialize(&self, report: &BatchReport) -> Result<String> {
        match self {
            ReportOutputFormat::Text => Ok(ReportFormatter::new().render(report)),
            ReportOutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportOutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            ReportOutputFormat::Sarif => sarif::to_sarif_json(report),
        }
    }
}

/// Write a rendered report, creating parent directories
pub fn save_report(report: &BatchReport, format: ReportOutputFormat, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let content = format.serialize(report)?;
    fs::write(path, content).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

/// Print to stdout
pub fn print_report(report: &BatchReport, format: ReportOutputFormat) -> Result<()> {
    match format {
        ReportOutputFormat::Text => ReportFormatter::new().print(report),
        _ => println!("{}", format.serialize(report)?),
    }
    Ok(())
}
