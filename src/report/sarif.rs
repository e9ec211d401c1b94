// SPDX-License-Identifier: PMPL-1.0-or-later

//! SARIF 2.1.0 output for code-scanning integrations
//!
//! Every syntax, security and improvement finding of a batch becomes one
//! SARIF result. Rules are declared once per distinct code.
//! See: https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html

use crate::batch::BatchReport;
use crate::types::{ImprovementFinding, IssueSeverity, SecurityFinding, Severity, SyntaxFinding};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/main/sarif-2.1/schema/sarif-schema-2.1.0.json";
const SARIF_VERSION: &str = "2.1.0";

/// Top-level SARIF log
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLog {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifTool {
    pub driver: SarifToolComponent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifToolComponent {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    pub short_description: SarifMessage,
    pub default_configuration: SarifConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifConfiguration {
    pub level: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    pub start_column: usize,
}

fn issue_level(severity: IssueSeverity) -> &'static str {
    match severity {
        IssueSeverity::Error => "error",
        IssueSeverity::Warning => "warning",
        IssueSeverity::Info => "note",
    }
}

fn security_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "error",
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// Improvement categories share one namespace, apart from syntax codes
fn improvement_rule_id(finding: &ImprovementFinding) -> String {
    format!("practice/{}", finding.category)
}

/// Collects rule descriptors in first-seen order
#[derive(Default)]
struct RuleTable {
    seen: HashSet<String>,
    rules: Vec<SarifRule>,
}

impl RuleTable {
    fn declare(&mut self, id: &str, name: &str, description: &str, level: &str) {
        if self.seen.insert(id.to_string()) {
            self.rules.push(SarifRule {
                id: id.to_string(),
                name: name.to_string(),
                short_description: SarifMessage {
                    text: description.to_string(),
                },
                default_configuration: SarifConfiguration {
                    level: level.to_string(),
                },
            });
        }
    }

    fn syntax(&mut self, finding: &SyntaxFinding) {
        let id = finding.code.as_str();
        let name = id.to_ascii_lowercase().replace('_', "-");
        self.declare(id, &name, id, issue_level(finding.severity));
    }

    fn security(&mut self, finding: &SecurityFinding) {
        self.declare(
            &finding.rule_id,
            &finding.category,
            &finding.message,
            security_level(finding.severity),
        );
    }

    fn improvement(&mut self, finding: &ImprovementFinding) {
        self.declare(
            &improvement_rule_id(finding),
            &finding.category,
            &finding.kind.to_string(),
            issue_level(finding.severity),
        );
    }
}

fn result(uri: &str, rule_id: String, level: &str, text: String, line: usize, column: usize) -> SarifResult {
    SarifResult {
        rule_id,
        level: level.to_string(),
        message: SarifMessage { text },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: uri.to_string(),
                },
                region: SarifRegion {
                    start_line: line.max(1),
                    start_column: column.max(1),
                },
            },
        }],
    }
}

/// Convert a batch report to a SARIF log
pub fn to_sarif(report: &BatchReport) -> Result<SarifLog> {
    let mut rules = RuleTable::default();
    let mut results = Vec::new();

    for file in &report.results {
        let Some(analysis) = &file.result else {
            continue;
        };
        let uri = file.path.to_string_lossy().replace('\\', "/");

        for finding in &analysis.syntax_findings {
            rules.syntax(finding);
            results.push(result(
                &uri,
                finding.code.as_str().to_string(),
                issue_level(finding.severity),
                format!("{} ({})", finding.message, finding.suggestion),
                finding.line,
                finding.column,
            ));
        }
        for finding in &analysis.security_findings {
            rules.security(finding);
            results.push(result(
                &uri,
                finding.rule_id.clone(),
                security_level(finding.severity),
                format!("{}. {}", finding.message, finding.mitigation),
                finding.line,
                finding.column,
            ));
        }
        for finding in &analysis.improvements {
            rules.improvement(finding);
            results.push(result(
                &uri,
                improvement_rule_id(finding),
                issue_level(finding.severity),
                finding.message.clone(),
                finding.line,
                finding.column,
            ));
        }
    }

    Ok(SarifLog {
        schema: SARIF_SCHEMA.to_string(),
        version: SARIF_VERSION.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifToolComponent {
                    name: "mushcheck".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: "https://github.com/hyperpolymath/mushcheck".to_string(),
                    rules: rules.rules,
                },
            },
            results,
        }],
    })
}

/// Serialize a SARIF log to a JSON string
pub fn to_sarif_json(report: &BatchReport) -> Result<String> {
    let log = to_sarif(report)?;
    let json = serde_json::to_string_pretty(&log)?;
    Ok(json)
}
