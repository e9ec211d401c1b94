// SPDX-License-Identifier: PMPL-1.0-or-later

//! Security rule matching
//!
//! Catalogue rules are data: a pattern, a severity and the dialects they
//! apply to. One matcher interprets all of them against the full text, so
//! a rule may match across line boundaries. A rule whose pattern does not
//! compile is skipped on its own.

pub mod engine;
pub mod rules;

pub use rules::SensitiveDataRules;

use crate::context::AnalysisContext;
use crate::scan::LineIndex;
use crate::types::{SecurityFinding, SecurityRule};
use tracing::debug;

/// Catalogue rules applicable to the context's dialect, then the built-in
/// sensitive-data heuristics
pub fn scan(ctx: &AnalysisContext<'_>, catalogue_rules: &[SecurityRule]) -> Vec<SecurityFinding> {
    let index = LineIndex::new(ctx.text);
    let total_lines = ctx.total_lines();
    let sensitive = SensitiveDataRules::new();

    let applicable = catalogue_rules
        .iter()
        .filter(|rule| ctx.dialect.map_or(true, |dialect| rule.applies_to(dialect)));

    let findings: Vec<SecurityFinding> = applicable
        .chain(sensitive.rules())
        .flat_map(|rule| engine::match_rule(rule, ctx.text, &index, total_lines))
        .collect();

    debug!(findings = findings.len(), "security scan complete");
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::AnalysisOptions;
    use crate::types::{Dialect, Severity};

    fn dialect(id: &str, name: &str) -> Dialect {
        Dialect {
            id: id.to_string(),
            name: name.to_string(),
            functions: vec![],
            notes: vec![],
        }
    }

    fn eval_rule() -> SecurityRule {
        SecurityRule {
            id: "EVAL".to_string(),
            pattern: r"\beval\s*\(\s*%[0-9]".to_string(),
            severity: Severity::High,
            category: "code_injection".to_string(),
            dialects: vec!["PennMUSH".to_string()],
            recommendation: "escape input".to_string(),
            description: None,
            references: vec![],
        }
    }

    fn run(text: &str, dialect: Option<&Dialect>, rules: &[SecurityRule]) -> Vec<SecurityFinding> {
        let config = EngineConfig::default();
        let ctx = AnalysisContext::new(text, dialect, AnalysisOptions::default(), &config);
        scan(&ctx, rules)
    }

    #[test]
    fn test_dialect_filter() {
        let rules = vec![eval_rule()];
        let penn = dialect("pennmush", "PennMUSH");
        let tiny = dialect("tinymush", "TinyMUSH");
        assert_eq!(run("think eval(%0)", Some(&penn), &rules).len(), 1);
        assert!(run("think eval(%0)", Some(&tiny), &rules).is_empty());
        // no dialect resolved: every rule applies
        assert_eq!(run("think eval(%0)", None, &rules).len(), 1);
    }

    #[test]
    fn test_dialect_filter_accepts_id() {
        let mut rule = eval_rule();
        rule.dialects = vec!["PENNMUSH".to_string()];
        let penn = dialect("pennmush", "PennMUSH");
        assert_eq!(run("eval(%1)", Some(&penn), &[rule]).len(), 1);
    }

    #[test]
    fn test_sensitive_data_ignores_dialect() {
        let tiny = dialect("tinymush", "TinyMUSH");
        let findings = run("&CONF me=password: \"hunter2\"", Some(&tiny), &[]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, rules::SENSITIVE_DATA_CATEGORY);
        assert_eq!(findings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_bad_rule_does_not_stop_scan() {
        let mut broken = eval_rule();
        broken.id = "BROKEN".to_string();
        broken.pattern = "[unclosed".to_string();
        broken.dialects.clear();
        let findings = run("eval(%0)", None, &[broken, eval_rule()]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "EVAL");
    }
}
