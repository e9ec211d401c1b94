// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-practice analysis
//!
//! Style, performance, maintainability, readability and security-hygiene
//! heuristics over individual code lines

pub mod analyzer;
pub mod patterns;

use crate::context::AnalysisContext;
use crate::types::ImprovementFinding;
use tracing::debug;

pub use analyzer::Analyzer;

pub fn analyze(ctx: &AnalysisContext<'_>) -> Vec<ImprovementFinding> {
    let findings = Analyzer::new(ctx).analyze();
    debug!(findings = findings.len(), "best-practice analysis complete");
    findings
}
