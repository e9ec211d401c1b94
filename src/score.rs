// SPDX-License-Identifier: PMPL-1.0-or-later

//! Quality scores
//!
//! Three heuristic scores in `[0, 100]`, computed from the findings and a
//! few raw statistics of the text. Weights come from
//! [`ScoringWeights`](crate::config::ScoringWeights).

use crate::config::ScoringWeights;
use crate::context::AnalysisContext;
use crate::practices::patterns::count_control_markers;
use crate::scan::{BracketProfile, ScannedLine};
use crate::types::{ImprovementFinding, ImprovementKind, QualityScores, SecurityFinding, Severity};

pub fn score(
    ctx: &AnalysisContext<'_>,
    security: &[SecurityFinding],
    improvements: &[ImprovementFinding],
) -> QualityScores {
    let weights = &ctx.config.scoring;
    QualityScores {
        complexity_score: bounded(complexity(ctx, weights)),
        security_score: bounded(security_score(security, weights)),
        maintainability_score: bounded(maintainability(ctx, improvements, weights)),
    }
}

/// Clamp to `[0, 100]` and round to the nearest integer
pub fn bounded(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

fn complexity(ctx: &AnalysisContext<'_>, weights: &ScoringWeights) -> f64 {
    let mut markers = 0usize;
    let mut calls = 0usize;
    for (_, text) in ctx.code_lines() {
        let scanned = ScannedLine::new(text);
        markers += count_control_markers(&scanned);
        calls += scanned.function_calls().len();
    }
    let depth = BracketProfile::build(ctx.code_lines()).max_depth;

    let lines = (ctx.total_lines() as f64 * weights.line_weight).min(weights.line_base_cap);
    lines
        + markers as f64 * weights.control_marker_weight
        + depth as f64 * weights.nesting_weight
        + calls as f64 * weights.function_call_weight
}

fn security_score(findings: &[SecurityFinding], weights: &ScoringWeights) -> f64 {
    let penalty: f64 = findings
        .iter()
        .map(|f| match f.severity {
            Severity::Critical => weights.critical_weight,
            Severity::High => weights.high_weight,
            Severity::Medium => weights.medium_weight,
            Severity::Low => weights.low_weight,
        })
        .sum();
    (100.0 - penalty).max(0.0)
}

fn maintainability(
    ctx: &AnalysisContext<'_>,
    improvements: &[ImprovementFinding],
    weights: &ScoringWeights,
) -> f64 {
    let lines = ctx.total_lines();
    // Length tiers count code lines only
    let code = ctx.code_lines().count();
    let mut score = 100.0;

    if code > weights.huge_script_lines {
        score -= weights.huge_script_penalty;
    } else if code > weights.very_long_script_lines {
        score -= weights.very_long_script_penalty;
    } else if code > weights.long_script_lines {
        score -= weights.long_script_penalty;
    }

    let ratio = if lines == 0 {
        0.0
    } else {
        ctx.comment_lines() as f64 / lines as f64
    };
    if ratio < weights.low_comment_ratio {
        score -= weights.low_comment_penalty;
        if ratio < weights.very_low_comment_ratio {
            score -= weights.very_low_comment_penalty;
        }
    } else if ratio > weights.good_comment_ratio {
        score += weights.good_comment_bonus;
    }

    score -= improvements
        .iter()
        .map(|f| match f.kind {
            ImprovementKind::Maintainability => weights.maintainability_weight,
            ImprovementKind::Readability => weights.readability_weight,
            ImprovementKind::Performance => weights.performance_weight,
            ImprovementKind::Security => weights.security_improvement_weight,
            ImprovementKind::BestPractice => weights.best_practice_weight,
        })
        .sum::<f64>();

    if code > 0 && code < weights.long_script_lines {
        score += weights.short_script_bonus;
    }
    score
}
