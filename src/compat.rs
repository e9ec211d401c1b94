// SPDX-License-Identifier: PMPL-1.0-or-later

//! Dialect compatibility notes

use crate::context::AnalysisContext;
use crate::scan::ScannedLine;
use std::collections::HashSet;
use tracing::debug;

/// Notes for deprecated functions, one entry per distinct function in
/// order of first use. Empty without a resolved dialect.
pub fn check(ctx: &AnalysisContext<'_>) -> Vec<String> {
    let Some(dialect) = ctx.dialect else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut notes = Vec::new();
    for (_, text) in ctx.code_lines() {
        for call in ScannedLine::new(text).function_calls() {
            if !seen.insert(call.name.to_ascii_lowercase()) {
                continue;
            }
            let Some(function) = dialect.function(call.name) else {
                continue;
            };
            if !function.deprecated {
                continue;
            }
            notes.push(format!(
                "{}() is deprecated in {}",
                function.name, dialect.name
            ));
            if let Some(replacement) = &function.replacement {
                notes.push(format!(
                    "Replace {}() with {}()",
                    function.name, replacement
                ));
            }
        }
    }

    debug!(notes = notes.len(), dialect = %dialect.id, "compatibility check complete");
    notes
}
