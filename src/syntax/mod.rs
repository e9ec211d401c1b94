// SPDX-License-Identifier: PMPL-1.0-or-later

//! Syntax validation
//!
//! Per-line checks run on every code line (non-blank, not a full-line
//! comment); whole-text checks run once afterwards. Nothing here fails:
//! checks only produce findings, and a line that cannot be classified
//! produces none.

pub mod global;
pub mod line;

use crate::context::AnalysisContext;
use crate::types::SyntaxFinding;
use tracing::debug;

/// Run every syntax check over the context, in line order, whole-text
/// findings last
pub fn validate(ctx: &AnalysisContext<'_>) -> Vec<SyntaxFinding> {
    let mut findings: Vec<SyntaxFinding> = ctx
        .code_lines()
        .flat_map(|(number, text)| line::check_line(ctx, number, text))
        .collect();
    findings.extend(global::check_text(ctx));

    debug!(findings = findings.len(), "syntax validation complete");
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::AnalysisOptions;
    use crate::types::SyntaxCode;

    #[test]
    fn test_comment_lines_are_skipped() {
        let config = EngineConfig::default();
        let ctx = AnalysisContext::new(
            "@@ unbalanced ( in a comment \"\n@pemit me=ok",
            None,
            AnalysisOptions::default(),
            &config,
        );
        assert!(validate(&ctx).is_empty());
    }

    #[test]
    fn test_findings_ordered_by_line_then_global() {
        let config = EngineConfig::default();
        let ctx = AnalysisContext::new(
            "think add(1\nthink \"open\nthink [add(1]",
            None,
            AnalysisOptions::default(),
            &config,
        );
        let codes: Vec<_> = validate(&ctx).iter().map(|f| (f.line, f.code)).collect();
        assert_eq!(
            codes,
            vec![
                (1, SyntaxCode::UnclosedBracket),
                (2, SyntaxCode::UnterminatedString),
                (3, SyntaxCode::MismatchedBracket),
                (1, SyntaxCode::UnbalancedBrackets),
            ]
        );
    }
}
