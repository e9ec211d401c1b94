// SPDX-License-Identifier: PMPL-1.0-or-later

//! mushcheck: syntax, security and best-practice analysis for MUSHcode
//!
//! Analyzes script files for a MUD scripting dialect and reports syntax
//! defects, security rule matches, improvement suggestions and three
//! quality scores.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use mushcheck::batch::{self, BatchConfig};
use mushcheck::catalogue::Catalogue;
use mushcheck::config::EngineConfig;
use mushcheck::context::AnalysisOptions;
use mushcheck::report::{self, ReportOutputFormat};
use mushcheck::validator::Validator;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mushcheck")]
#[command(version)]
#[command(about = "Syntax, security and best-practice analysis for MUSHcode")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze script files or directories of scripts
    Check {
        /// Files or directories to analyze
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,

        /// Dialect id or name (e.g. pennmush)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Extra catalogue (YAML or JSON) merged over the built-in one
        #[arg(long)]
        catalogue: Option<PathBuf>,

        /// Engine configuration (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable strict checks
        #[arg(long)]
        strict: bool,

        /// Skip security rule matching
        #[arg(long)]
        no_security: bool,

        /// Skip best-practice analysis
        #[arg(long)]
        no_best_practices: bool,

        /// Report format (defaults to the output file's extension, else text)
        #[arg(short, long, value_enum)]
        format: Option<ReportOutputFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Debug logging on stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// List known dialects
    Dialects {
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },

    /// List security rules
    Rules {
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalogue(extra: Option<&Path>) -> Result<Catalogue> {
    let builtin = Catalogue::builtin()?;
    match extra {
        Some(path) => Ok(builtin.merge(Catalogue::load(path)?)),
        None => Ok(builtin),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            paths,
            dialect,
            catalogue,
            config,
            strict,
            no_security,
            no_best_practices,
            format,
            output,
            verbose,
        } => {
            init_logging(verbose);

            let catalogue = load_catalogue(catalogue.as_deref())?;
            let engine_config = match &config {
                Some(path) => EngineConfig::load(path)?,
                None => EngineConfig::default(),
            };
            let validator = Validator::with_config(&catalogue, engine_config);

            let batch_config = BatchConfig {
                dialect_id: dialect,
                options: AnalysisOptions {
                    strict_mode: strict,
                    check_security: !no_security,
                    check_best_practices: !no_best_practices,
                },
                ..BatchConfig::new(paths)
            };
            let report = batch::run(&batch_config, &validator)?;
            let format = format
                .or_else(|| output.as_deref().and_then(ReportOutputFormat::for_path))
                .unwrap_or(ReportOutputFormat::Text);

            match output {
                Some(output_path) => {
                    if format == ReportOutputFormat::Text {
                        colored::control::set_override(false);
                    }
                    report::save_report(&report, format, &output_path)?;
                    batch::print_summary(&report);
                    println!("Report saved to: {}", output_path.display());
                }
                None => report::print_report(&report, format)?,
            }

            if report.has_failures() {
                std::process::exit(1);
            }
        }

        Commands::Dialects { catalogue } => {
            init_logging(false);
            let catalogue = load_catalogue(catalogue.as_deref())?;
            println!("{}", "DIALECTS".bold().yellow());
            for dialect in &catalogue.dialects {
                let deprecated = dialect.functions.iter().filter(|f| f.deprecated).count();
                println!(
                    "  {:<12} {:<12} {} functions ({} deprecated)",
                    dialect.id.bold(),
                    dialect.name,
                    dialect.functions.len(),
                    deprecated
                );
                for note in &dialect.notes {
                    println!("      {}", note.dimmed());
                }
            }
        }

        Commands::Rules { catalogue } => {
            init_logging(false);
            let catalogue = load_catalogue(catalogue.as_deref())?;
            println!("{}", "SECURITY RULES".bold().yellow());
            for rule in &catalogue.rules {
                let scope = if rule.dialects.is_empty() {
                    "all dialects".to_string()
                } else {
                    rule.dialects.join(", ")
                };
                println!(
                    "  {:<14} {:<9} {:<22} {}",
                    rule.id.bold(),
                    rule.severity.to_string(),
                    rule.category,
                    scope.dimmed()
                );
            }
        }
    }

    Ok(())
}
