// SPDX-License-Identifier: PMPL-1.0-or-later

//! Human-readable report formatting

use crate::batch::{BatchReport, FileResult};
use crate::types::*;
use colored::*;
use std::fmt::Write;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &BatchReport) {
        print!("{}", self.render(report));
    }

    pub fn render(&self, report: &BatchReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", "=== MUSHCHECK REPORT ===".bold().cyan());
        let _ = writeln!(out);

        for file in &report.results {
            self.render_file(&mut out, file);
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "{} {} analyzed, {} valid, {} invalid, {} failed",
            "TOTAL".bold().yellow(),
            report.files_analyzed,
            report.valid_files,
            report.invalid_files,
            report.failed_files
        );
        out
    }

    fn render_file(&self, out: &mut String, file: &FileResult) {
        let _ = writeln!(out, "{}", file.path.display().to_string().bold());
        if let Some(err) = &file.error {
            let _ = writeln!(out, "  {} {}", "FAILED".red().bold(), err);
            return;
        }
        let Some(result) = &file.result else {
            return;
        };

        let status = if result.is_valid {
            "VALID".green()
        } else {
            "INVALID".red()
        };
        let _ = writeln!(
            out,
            "  {}  lines: {}  errors: {}  warnings: {}  complexity: {}  security: {}  maintainability: {}",
            status,
            result.total_lines,
            result.error_count(),
            result.warning_count(),
            result.scores.complexity_score,
            score_colored(result.scores.security_score),
            score_colored(result.scores.maintainability_score)
        );

        if !result.syntax_findings.is_empty() {
            let _ = writeln!(out, "  {}", "SYNTAX".bold().yellow());
            for f in &result.syntax_findings {
                let severity = match f.severity {
                    IssueSeverity::Error => f.severity.to_string().red(),
                    IssueSeverity::Warning => f.severity.to_string().yellow(),
                    IssueSeverity::Info => f.severity.to_string().blue(),
                };
                let _ = writeln!(
                    out,
                    "    {}:{} [{}] {} {}",
                    f.line,
                    f.column,
                    severity,
                    f.code.as_str().bold(),
                    f.message
                );
                let _ = writeln!(out, "      {}", f.suggestion.dimmed());
            }
        }

        if !result.security_findings.is_empty() {
            let _ = writeln!(out, "  {}", "SECURITY".bold().red());
            for f in &result.security_findings {
                let severity_color = match f.severity {
                    Severity::Critical => "red",
                    Severity::High => "yellow",
                    Severity::Medium => "blue",
                    Severity::Low => "green",
                };
                let _ = writeln!(
                    out,
                    "    {}:{} [{}] {} {}",
                    f.line,
                    f.column,
                    f.severity.to_string().color(severity_color),
                    f.rule_id.bold(),
                    f.message
                );
                let _ = writeln!(out, "      Mitigation: {}", f.mitigation.dimmed());
            }
        }

        if !result.improvements.is_empty() {
            let _ = writeln!(out, "  {}", "IMPROVEMENTS".bold().blue());
            for f in &result.improvements {
                let _ = writeln!(
                    out,
                    "    {}:{} {}/{} {} (confidence {:.2})",
                    f.line, f.column, f.kind, f.category, f.message, f.confidence
                );
            }
        }

        if !result.compatibility_notes.is_empty() {
            let _ = writeln!(out, "  {}", "COMPATIBILITY".bold().magenta());
            for note in &result.compatibility_notes {
                let _ = writeln!(out, "    - {}", note);
            }
        }
    }
}

fn score_colored(score: u8) -> ColoredString {
    let text = score.to_string();
    if score >= 80 {
        text.green()
    } else if score >= 50 {
        text.yellow()
    } else {
        text.red()
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
