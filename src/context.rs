// SPDX-License-Identifier: PMPL-1.0-or-later

//! Analysis requests and the read-only context every pass works over

use crate::config::EngineConfig;
use crate::error::ValidationFailure;
use crate::scan;
use crate::types::Dialect;
use serde::{Deserialize, Serialize};

/// Analysis flags. Every field has a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    pub strict_mode: bool,
    pub check_security: bool,
    pub check_best_practices: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            strict_mode: false,
            check_security: true,
            check_best_practices: true,
        }
    }
}

/// One analysis request. Built once, never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dialect_id: Option<String>,
    #[serde(flatten)]
    options: AnalysisOptions,
}

/// Wire shape of a request; unknown keys are rejected
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RequestRecord {
    text: String,
    #[serde(default)]
    dialect_id: Option<String>,
    #[serde(default)]
    strict_mode: bool,
    #[serde(default = "enabled")]
    check_security: bool,
    #[serde(default = "enabled")]
    check_best_practices: bool,
}

fn enabled() -> bool {
    true
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dialect_id: None,
            options: AnalysisOptions::default(),
        }
    }

    pub fn with_dialect(mut self, dialect_id: impl Into<String>) -> Self {
        self.dialect_id = Some(dialect_id.into());
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Decode a request from its JSON record form
    pub fn from_json(json: &str) -> Result<Self, ValidationFailure> {
        let record: RequestRecord =
            serde_json::from_str(json).map_err(|e| ValidationFailure::from_json_error(&e))?;
        Ok(Self {
            text: record.text,
            dialect_id: record.dialect_id,
            options: AnalysisOptions {
                strict_mode: record.strict_mode,
                check_security: record.check_security,
                check_best_practices: record.check_best_practices,
            },
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect_id(&self) -> Option<&str> {
        self.dialect_id.as_deref()
    }

    pub fn options(&self) -> AnalysisOptions {
        self.options
    }

    /// Text constraints that do not need a knowledge store
    pub(crate) fn check_text(&self, config: &EngineConfig) -> Result<(), ValidationFailure> {
        if self.text.trim().is_empty() {
            return Err(ValidationFailure::EmptyText);
        }
        let length = self.text.chars().count();
        if length > config.max_text_length {
            return Err(ValidationFailure::TextTooLong {
                length,
                max: config.max_text_length,
            });
        }
        Ok(())
    }
}

/// Derived, read-only view of one validated request
#[derive(Debug, Clone)]
pub struct AnalysisContext<'a> {
    pub text: &'a str,
    /// Lines in order without terminators; line `n` is `lines[n - 1]`
    pub lines: Vec<&'a str>,
    pub dialect: Option<&'a Dialect>,
    pub options: AnalysisOptions,
    pub config: &'a EngineConfig,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        text: &'a str,
        dialect: Option<&'a Dialect>,
        options: AnalysisOptions,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            text,
            lines: text
                .lines()
                .map(|line| line.trim_end_matches('\r'))
                .collect(),
            dialect,
            options,
            config,
        }
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    /// 1-based line text; empty for out-of-range numbers
    pub fn line(&self, number: usize) -> &'a str {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .copied()
            .unwrap_or("")
    }

    /// `(line_number, text)` for every non-blank, non-comment line
    pub fn code_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| scan::is_code_line(line))
            .map(|(idx, line)| (idx + 1, *line))
    }

    pub fn comment_lines(&self) -> usize {
        self.lines.iter().filter(|line| scan::is_comment(line)).count()
    }
}
