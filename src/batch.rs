// SPDX-License-Identifier: PMPL-1.0-or-later

//! Batch: analyze many script files in one run
//!
//! Files named directly are always analyzed; directories are walked and
//! filtered by extension. Files are analyzed in parallel and the report
//! is sorted by syntax error count (highest first), then path.

use crate::context::{AnalysisOptions, AnalysisRequest};
use crate::types::AnalysisResult;
use crate::validator::Validator;
use anyhow::{bail, Context, Result};
use colored::*;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: &[&str] = &["mush", "mu", "msh", "softcode", "txt"];

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Files and directories to analyze
    pub paths: Vec<PathBuf>,
    pub dialect_id: Option<String>,
    pub options: AnalysisOptions,
    /// Extensions picked up when walking directories
    pub extensions: Vec<String>,
}

impl BatchConfig {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            dialect_id: None,
            options: AnalysisOptions::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Outcome for one file: a result, or the reason it was not analyzed
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
}

impl FileResult {
    pub fn error_count(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.error_count())
    }

    pub fn is_valid(&self) -> bool {
        self.result.as_ref().is_some_and(|r| r.is_valid)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub files_analyzed: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    /// Files that could not be read or were rejected before analysis
    pub failed_files: usize,
    pub total_syntax_errors: usize,
    pub total_security_findings: usize,
    pub results: Vec<FileResult>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.invalid_files > 0 || self.failed_files > 0
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Expand the configured paths into a sorted, de-duplicated file list
pub fn discover_files(config: &BatchConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in &config.paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry
                    .with_context(|| format!("walking directory {}", path.display()))?;
                if entry.file_type().is_file() && has_extension(entry.path(), &config.extensions) {
                    files.push(entry.into_path());
                }
            }
        } else {
            bail!("Path does not exist: {}", path.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// UTF-8 first, then Windows-1252
fn read_script(path: &Path) -> Result<String> {
    let raw_bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    match String::from_utf8(raw_bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let raw_bytes = err.into_bytes();
            let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(&raw_bytes);
            if had_errors {
                bail!("{} is neither UTF-8 nor Windows-1252 text", path.display());
            }
            debug!(path = %path.display(), "decoded as Windows-1252");
            Ok(cow.into_owned())
        }
    }
}

fn analyze_file(path: &Path, config: &BatchConfig, validator: &Validator<'_>) -> FileResult {
    let outcome = read_script(path).and_then(|text| {
        let mut request = AnalysisRequest::new(text).with_options(config.options);
        if let Some(dialect) = &config.dialect_id {
            request = request.with_dialect(dialect.clone());
        }
        validator
            .analyze(&request)
            .with_context(|| format!("rejected {}", path.display()))
    });

    match outcome {
        Ok(result) => FileResult {
            path: path.to_path_buf(),
            error: None,
            result: Some(result),
        },
        Err(e) => FileResult {
            path: path.to_path_buf(),
            error: Some(format!("{:#}", e)),
            result: None,
        },
    }
}

/// Analyze every file the configuration names
pub fn run(config: &BatchConfig, validator: &Validator<'_>) -> Result<BatchReport> {
    let files = discover_files(config)?;
    info!(files = files.len(), "batch analysis started");

    let mut results: Vec<FileResult> = files
        .par_iter()
        .map(|path| analyze_file(path, config, validator))
        .collect();

    results.sort_by(|a, b| {
        b.error_count()
            .cmp(&a.error_count())
            .then_with(|| a.path.cmp(&b.path))
    });

    let failed_files = results.iter().filter(|r| r.error.is_some()).count();
    let valid_files = results.iter().filter(|r| r.is_valid()).count();
    let report = BatchReport {
        files_analyzed: results.len() - failed_files,
        valid_files,
        invalid_files: results.len() - failed_files - valid_files,
        failed_files,
        total_syntax_errors: results.iter().map(|r| r.error_count()).sum(),
        total_security_findings: results
            .iter()
            .filter_map(|r| r.result.as_ref())
            .map(|r| r.security_findings.len())
            .sum(),
        results,
    };

    info!(
        analyzed = report.files_analyzed,
        invalid = report.invalid_files,
        failed = report.failed_files,
        "batch analysis complete"
    );
    Ok(report)
}

/// Print a summary table to the terminal
pub fn print_summary(report: &BatchReport) {
    println!("\n{}", "=== MUSHCHECK SUMMARY ===".bold().cyan());
    println!(
        "Files analyzed: {}  |  Valid: {}  |  Invalid: {}  |  Failed: {}",
        report.files_analyzed,
        report.valid_files.to_string().green(),
        report.invalid_files.to_string().red(),
        report.failed_files
    );
    println!(
        "Syntax errors: {}  |  Security findings: {}",
        report.total_syntax_errors, report.total_security_findings
    );
    println!();

    if report.results.is_empty() {
        println!("  No script files found.");
        return;
    }

    println!(
        "  {:<48} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "File", "Errors", "Sec", "Cplx", "Secu", "Maint"
    );
    println!("  {}", "-".repeat(84));

    for file in &report.results {
        let name = file.path.display().to_string();
        match (&file.error, &file.result) {
            (Some(err), _) => println!("  {:<48} {}: {}", name, "ERROR".red(), err),
            (None, Some(result)) => println!(
                "  {:<48} {:>6} {:>6} {:>6} {:>6} {:>6}",
                name,
                result.error_count(),
                result.security_findings.len(),
                result.scores.complexity_score,
                result.scores.security_score,
                result.scores.maintainability_score,
            ),
            (None, None) => {}
        }
    }
    println!();
}
