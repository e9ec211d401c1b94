// SPDX-License-Identifier: PMPL-1.0-or-later

//! Built-in sensitive-data heuristics
//!
//! These run on every analysis with security checks enabled, regardless of
//! dialect, after the catalogue rules.

use crate::types::{SecurityRule, Severity};

pub const SENSITIVE_DATA_CATEGORY: &str = "sensitive_data";

pub struct SensitiveDataRules {
    rules: Vec<SecurityRule>,
}

impl SensitiveDataRules {
    pub fn new() -> Self {
        Self {
            rules: Self::build_rules(),
        }
    }

    pub fn rules(&self) -> &[SecurityRule] {
        &self.rules
    }

    fn build_rules() -> Vec<SecurityRule> {
        vec![
            // password = "hunter2" / password: "hunter2"
            SecurityRule {
                id: "SENSITIVE-PASSWORD".to_string(),
                pattern: r#"\bpassword\s*[=:]\s*"[^"\r\n]+""#.to_string(),
                severity: Severity::Medium,
                category: SENSITIVE_DATA_CATEGORY.to_string(),
                dialects: vec![],
                recommendation:
                    "Keep passwords out of softcode; store them on a locked, wizard-only attribute"
                        .to_string(),
                description: Some("Hardcoded password".to_string()),
                references: vec![],
            },
            SecurityRule {
                id: "SENSITIVE-SECRET".to_string(),
                pattern: r#"\bsecret\s*[=:]\s*"[^"\r\n]+""#.to_string(),
                severity: Severity::Medium,
                category: SENSITIVE_DATA_CATEGORY.to_string(),
                dialects: vec![],
                recommendation: "Move secrets to a protected attribute and read them with get()"
                    .to_string(),
                description: Some("Hardcoded secret".to_string()),
                references: vec![],
            },
            // api_key, api-key, apikey
            SecurityRule {
                id: "SENSITIVE-API-KEY".to_string(),
                pattern: r#"\bapi[_-]?key\s*[=:]\s*"[^"\r\n]+""#.to_string(),
                severity: Severity::Medium,
                category: SENSITIVE_DATA_CATEGORY.to_string(),
                dialects: vec![],
                recommendation: "Never embed API keys in script text; configure them server-side"
                    .to_string(),
                description: Some("Hardcoded API key".to_string()),
                references: vec![],
            },
        ]
    }
}

impl Default for SensitiveDataRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn matches(text: &str) -> Vec<String> {
        SensitiveDataRules::new()
            .rules()
            .iter()
            .filter(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .unwrap()
                    .is_match(text)
            })
            .map(|rule| rule.id.clone())
            .collect()
    }

    #[test]
    fn test_separators_and_spellings() {
        assert_eq!(matches(r#"&PASSWORD me="hunter2""#), Vec::<String>::new());
        assert_eq!(matches(r#"think password = "hunter2""#), vec!["SENSITIVE-PASSWORD"]);
        assert_eq!(matches(r#"secret: "abc""#), vec!["SENSITIVE-SECRET"]);
        assert_eq!(matches(r#"API-KEY="abc""#), vec!["SENSITIVE-API-KEY"]);
        assert_eq!(matches(r#"apikey = "abc""#), vec!["SENSITIVE-API-KEY"]);
    }

    #[test]
    fn test_all_heuristics_are_medium() {
        for rule in SensitiveDataRules::new().rules() {
            assert_eq!(rule.severity, Severity::Medium);
            assert!(rule.dialects.is_empty());
        }
    }
}
