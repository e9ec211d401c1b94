// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for mushcheck
//!
//! Findings, catalogue entities and the aggregate analysis result. Every
//! type here is a plain record tree so results can cross a process or
//! protocol boundary unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a syntax or improvement finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Info => write!(f, "INFO"),
            IssueSeverity::Warning => write!(f, "WARNING"),
            IssueSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Severity of a security finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Stable codes for syntax findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyntaxCode {
    InvalidCharacter,
    UnmatchedClosingBracket,
    MismatchedBracket,
    UnclosedBracket,
    UnterminatedString,
    SpaceAfterParen,
    DeprecatedFunction,
    UnknownFunction,
    InvalidAttributeName,
    AttributeNameTooLong,
    VariableOutOfRange,
    InvalidVariableReference,
    TrailingSemicolon,
    CommandNameTooLong,
    LineTooLong,
    UnbalancedBrackets,
    ExcessiveNesting,
}

impl SyntaxCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxCode::InvalidCharacter => "INVALID_CHARACTER",
            SyntaxCode::UnmatchedClosingBracket => "UNMATCHED_CLOSING_BRACKET",
            SyntaxCode::MismatchedBracket => "MISMATCHED_BRACKET",
            SyntaxCode::UnclosedBracket => "UNCLOSED_BRACKET",
            SyntaxCode::UnterminatedString => "UNTERMINATED_STRING",
            SyntaxCode::SpaceAfterParen => "SPACE_AFTER_PAREN",
            SyntaxCode::DeprecatedFunction => "DEPRECATED_FUNCTION",
            SyntaxCode::UnknownFunction => "UNKNOWN_FUNCTION",
            SyntaxCode::InvalidAttributeName => "INVALID_ATTRIBUTE_NAME",
            SyntaxCode::AttributeNameTooLong => "ATTRIBUTE_NAME_TOO_LONG",
            SyntaxCode::VariableOutOfRange => "VARIABLE_OUT_OF_RANGE",
            SyntaxCode::InvalidVariableReference => "INVALID_VARIABLE_REFERENCE",
            SyntaxCode::TrailingSemicolon => "TRAILING_SEMICOLON",
            SyntaxCode::CommandNameTooLong => "COMMAND_NAME_TOO_LONG",
            SyntaxCode::LineTooLong => "LINE_TOO_LONG",
            SyntaxCode::UnbalancedBrackets => "UNBALANCED_BRACKETS",
            SyntaxCode::ExcessiveNesting => "EXCESSIVE_NESTING",
        }
    }
}

impl fmt::Display for SyntaxCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One syntax defect or style note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxFinding {
    pub line: usize,
    pub column: usize,
    pub severity: IssueSeverity,
    pub code: SyntaxCode,
    pub message: String,
    pub suggestion: String,
    pub fixable: bool,
}

impl SyntaxFinding {
    pub fn new(
        line: usize,
        column: usize,
        severity: IssueSeverity,
        code: SyntaxCode,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            line,
            column,
            severity,
            code,
            message: message.into(),
            suggestion: suggestion.into(),
            fixable: false,
        }
    }

    pub fn error(
        line: usize,
        column: usize,
        code: SyntaxCode,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(line, column, IssueSeverity::Error, code, message, suggestion)
    }

    pub fn warning(
        line: usize,
        column: usize,
        code: SyntaxCode,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(line, column, IssueSeverity::Warning, code, message, suggestion)
    }

    pub fn info(
        line: usize,
        column: usize,
        code: SyntaxCode,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::new(line, column, IssueSeverity::Info, code, message, suggestion)
    }

    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// A security rule match. `rule_id` is the finding's stable code and
/// `mitigation` its suggested fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityFinding {
    pub line: usize,
    pub column: usize,
    pub rule_id: String,
    pub category: String,
    pub severity: Severity,
    pub message: String,
    pub mitigation: String,
    pub snippet: String,
    #[serde(default)]
    pub references: Vec<String>,
    pub fixable: bool,
}

/// Improvement categories used for weighting in the maintainability score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementKind {
    Readability,
    Performance,
    Maintainability,
    Security,
    BestPractice,
}

impl fmt::Display for ImprovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ImprovementKind::Readability => "readability",
            ImprovementKind::Performance => "performance",
            ImprovementKind::Maintainability => "maintainability",
            ImprovementKind::Security => "security",
            ImprovementKind::BestPractice => "best_practice",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

/// A best-practice suggestion. `category` doubles as the stable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementFinding {
    pub line: usize,
    pub column: usize,
    #[serde(rename = "type")]
    pub kind: ImprovementKind,
    pub category: String,
    pub severity: IssueSeverity,
    pub message: String,
    pub before: String,
    pub after: String,
    pub confidence: f64,
    pub effort: Effort,
    pub fixable: bool,
}

/// One entry in a dialect's function catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectFunction {
    pub name: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

/// A server variant and its function catalogue. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialect {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub functions: Vec<DialectFunction>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Dialect {
    /// Case-insensitive function lookup (MUSH function names are not case sensitive)
    pub fn function(&self, name: &str) -> Option<&DialectFunction> {
        self.functions
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// True if `label` names this dialect by id or display name
    pub fn is_named(&self, label: &str) -> bool {
        self.id.eq_ignore_ascii_case(label) || self.name.eq_ignore_ascii_case(label)
    }
}

/// A data-driven security rule. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRule {
    pub id: String,
    pub pattern: String,
    pub severity: Severity,
    pub category: String,
    /// Dialect names the rule applies to; empty means every dialect
    #[serde(default)]
    pub dialects: Vec<String>,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

impl SecurityRule {
    pub fn applies_to(&self, dialect: &Dialect) -> bool {
        self.dialects.is_empty() || self.dialects.iter().any(|d| dialect.is_named(d))
    }
}

/// The three bounded quality scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScores {
    pub complexity_score: u8,
    pub security_score: u8,
    pub maintainability_score: u8,
}

/// Aggregate output of one analysis call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_valid: bool,
    pub syntax_findings: Vec<SyntaxFinding>,
    pub security_findings: Vec<SecurityFinding>,
    pub improvements: Vec<ImprovementFinding>,
    pub compatibility_notes: Vec<String>,
    pub total_lines: usize,
    #[serde(flatten)]
    pub scores: QualityScores,
}

impl AnalysisResult {
    pub fn error_count(&self) -> usize {
        self.syntax_findings.iter().filter(|f| f.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.syntax_findings
            .iter()
            .filter(|f| f.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn highest_security_severity(&self) -> Option<Severity> {
        self.security_findings.iter().map(|f| f.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> Dialect {
        Dialect {
            id: "pennmush".to_string(),
            name: "PennMUSH".to_string(),
            functions: vec![DialectFunction {
                name: "oldfn".to_string(),
                deprecated: true,
                replacement: Some("newfn".to_string()),
            }],
            notes: vec![],
        }
    }

    #[test]
    fn test_syntax_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&SyntaxCode::UnterminatedString).unwrap();
        assert_eq!(json, "\"UNTERMINATED_STRING\"");
        assert_eq!(SyntaxCode::UnterminatedString.to_string(), "UNTERMINATED_STRING");
    }

    #[test]
    fn test_function_lookup_is_case_insensitive() {
        let d = dialect();
        assert!(d.function("OLDFN").is_some());
        assert!(d.function("missing").is_none());
    }

    #[test]
    fn test_rule_with_empty_dialect_list_applies_everywhere() {
        let rule = SecurityRule {
            id: "R1".to_string(),
            pattern: "x".to_string(),
            severity: Severity::Low,
            category: "test".to_string(),
            dialects: vec![],
            recommendation: String::new(),
            description: None,
            references: vec![],
        };
        assert!(rule.applies_to(&dialect()));

        let scoped = SecurityRule {
            dialects: vec!["TinyMUSH".to_string()],
            ..rule
        };
        assert!(!scoped.applies_to(&dialect()));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(IssueSeverity::Error > IssueSeverity::Warning);
    }

    #[test]
    fn test_result_serializes_flat_scores() {
        let result = AnalysisResult {
            is_valid: true,
            syntax_findings: vec![],
            security_findings: vec![],
            improvements: vec![],
            compatibility_notes: vec![],
            total_lines: 1,
            scores: QualityScores {
                complexity_score: 1,
                security_score: 100,
                maintainability_score: 90,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isValid"], true);
        assert_eq!(value["securityScore"], 100);
        assert_eq!(value["totalLines"], 1);
    }
}
