// SPDX-License-Identifier: PMPL-1.0-or-later

//! Applies one rule to the full text

use crate::scan::LineIndex;
use crate::types::{SecurityFinding, SecurityRule};
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Compile a rule's pattern case-insensitively. Uncompilable patterns are
/// logged and yield `None`.
pub fn compile(rule: &SecurityRule) -> Option<Regex> {
    match RegexBuilder::new(&rule.pattern)
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(rule = %rule.id, error = %err, "skipping security rule with invalid pattern");
            None
        }
    }
}

/// Every non-empty match of `rule` in `text`, in text order
pub fn match_rule(
    rule: &SecurityRule,
    text: &str,
    index: &LineIndex<'_>,
    total_lines: usize,
) -> Vec<SecurityFinding> {
    let Some(regex) = compile(rule) else {
        return Vec::new();
    };
    let last_line = total_lines.max(1);

    regex
        .find_iter(text)
        .filter(|m| !m.is_empty())
        .map(|m| {
            let (line, column) = index.locate(m.start());
            let line = line.min(last_line);
            SecurityFinding {
                line,
                column,
                rule_id: rule.id.clone(),
                category: rule.category.clone(),
                severity: rule.severity,
                message: rule
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Matched security rule {}", rule.id)),
                mitigation: rule.recommendation.clone(),
                snippet: snippet(index, line, last_line),
                references: rule.references.clone(),
                fixable: false,
            }
        })
        .collect()
}

/// The matched line with one line of context either side
fn snippet(index: &LineIndex<'_>, line: usize, last_line: usize) -> String {
    let first = line.saturating_sub(1).max(1);
    let last = (line + 1).min(last_line);
    (first..=last)
        .map(|n| index.line(n))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn rule(pattern: &str) -> SecurityRule {
        SecurityRule {
            id: "T-1".to_string(),
            pattern: pattern.to_string(),
            severity: Severity::High,
            category: "test".to_string(),
            dialects: vec![],
            recommendation: "fix it".to_string(),
            description: None,
            references: vec!["https://example.org/t1".to_string()],
        }
    }

    #[test]
    fn test_positions_and_snippet() {
        let text = "think one\n  think EVAL(%0)\nthink three\nthink four";
        let index = LineIndex::new(text);
        let findings = match_rule(&rule(r"\beval\("), text, &index, 4);
        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!((finding.line, finding.column), (2, 9));
        assert_eq!(finding.snippet, "think one\n  think EVAL(%0)\nthink three");
        assert_eq!(finding.mitigation, "fix it");
        assert_eq!(finding.references.len(), 1);
        assert!(finding.message.contains("T-1"));
    }

    #[test]
    fn test_every_match_reported() {
        let text = "eval(%0) eval(%1)\neval(%2)";
        let index = LineIndex::new(text);
        let findings = match_rule(&rule(r"eval\(%\d"), text, &index, 2);
        let positions: Vec<_> = findings.iter().map(|f| (f.line, f.column)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 10), (2, 1)]);
    }

    #[test]
    fn test_invalid_pattern_yields_nothing() {
        let text = "eval(%0)";
        let index = LineIndex::new(text);
        assert!(match_rule(&rule("eval(("), text, &index, 1).is_empty());
    }

    #[test]
    fn test_empty_matches_are_ignored() {
        let text = "think hi";
        let index = LineIndex::new(text);
        assert!(match_rule(&rule("x*"), text, &index, 1).is_empty());
    }

    #[test]
    fn test_column_counts_characters() {
        let text = "é eval(%0)";
        let index = LineIndex::new(text);
        let findings = match_rule(&rule("eval"), text, &index, 1);
        assert_eq!(findings[0].column, 3);
    }
}
