// SPDX-License-Identifier: PMPL-1.0-or-later

//! Engine configuration: limits, thresholds and scoring weights.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on request text, in characters
    pub max_text_length: usize,
    pub indent_unit: usize,
    /// Only enforced in strict mode
    pub max_line_length: usize,
    pub max_nesting_depth: usize,
    pub max_attribute_name_length: usize,
    pub max_command_name_length: usize,
    pub max_variable_index: u64,
    /// Line-local complexity above this is reported as a complex expression
    pub complexity_threshold: usize,
    pub scoring: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            indent_unit: 2,
            max_line_length: 200,
            max_nesting_depth: 10,
            max_attribute_name_length: 32,
            max_command_name_length: 20,
            max_variable_index: 99,
            complexity_threshold: 10,
            scoring: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("parsing json engine config {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("parsing yaml engine config {}", path.display())),
            _ => Err(anyhow!(
                "unsupported engine config extension for {}",
                path.display()
            )),
        }
    }
}

/// Heuristic weights for the three quality scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // complexity
    pub line_weight: f64,
    pub line_base_cap: f64,
    pub control_marker_weight: f64,
    pub nesting_weight: f64,
    pub function_call_weight: f64,

    // security
    pub critical_weight: f64,
    pub high_weight: f64,
    pub medium_weight: f64,
    pub low_weight: f64,

    // maintainability
    pub long_script_lines: usize,
    pub long_script_penalty: f64,
    pub very_long_script_lines: usize,
    pub very_long_script_penalty: f64,
    pub huge_script_lines: usize,
    pub huge_script_penalty: f64,
    pub low_comment_ratio: f64,
    pub low_comment_penalty: f64,
    pub very_low_comment_ratio: f64,
    pub very_low_comment_penalty: f64,
    pub good_comment_ratio: f64,
    pub good_comment_bonus: f64,
    pub short_script_bonus: f64,
    pub maintainability_weight: f64,
    pub readability_weight: f64,
    pub performance_weight: f64,
    pub security_improvement_weight: f64,
    pub best_practice_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            line_weight: 0.5,
            line_base_cap: 20.0,
            control_marker_weight: 2.0,
            nesting_weight: 3.0,
            function_call_weight: 0.5,

            critical_weight: 30.0,
            high_weight: 20.0,
            medium_weight: 10.0,
            low_weight: 5.0,

            long_script_lines: 50,
            long_script_penalty: 10.0,
            very_long_script_lines: 100,
            very_long_script_penalty: 20.0,
            huge_script_lines: 200,
            huge_script_penalty: 30.0,
            low_comment_ratio: 0.10,
            low_comment_penalty: 15.0,
            very_low_comment_ratio: 0.05,
            very_low_comment_penalty: 10.0,
            good_comment_ratio: 0.20,
            good_comment_bonus: 5.0,
            short_script_bonus: 5.0,
            maintainability_weight: 5.0,
            readability_weight: 3.0,
            performance_weight: 4.0,
            security_improvement_weight: 6.0,
            best_practice_weight: 2.0,
        }
    }
}
