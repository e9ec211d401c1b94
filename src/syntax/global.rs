// SPDX-License-Identifier: PMPL-1.0-or-later

//! Whole-text structural checks

use crate::context::AnalysisContext;
use crate::scan::{BracketKind, BracketProfile};
use crate::types::{SyntaxCode, SyntaxFinding};

pub fn check_text(ctx: &AnalysisContext<'_>) -> Vec<SyntaxFinding> {
    let profile = BracketProfile::build(ctx.code_lines());
    let mut findings = Vec::new();

    // Openers left at a line end already carry an UNCLOSED_BRACKET finding
    for kind in BracketKind::ALL {
        let net = profile.unreported_open(kind);
        if net > 0 {
            findings.push(SyntaxFinding::error(
                1,
                1,
                SyntaxCode::UnbalancedBrackets,
                format!(
                    "{} '{}' left open across the script",
                    net,
                    kind.open_char()
                ),
                format!("Add {} matching '{}'", net, kind.close_char()),
            ));
        }
    }

    if profile.max_depth > ctx.config.max_nesting_depth {
        findings.push(SyntaxFinding::warning(
            profile.max_depth_line,
            1,
            SyntaxCode::ExcessiveNesting,
            format!(
                "Nesting depth {} exceeds {}",
                profile.max_depth, ctx.config.max_nesting_depth
            ),
            "Move inner expressions into separate attributes and call them with u()",
        ));
    }

    findings
}
