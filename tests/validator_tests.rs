// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end tests through Validator::analyze

use mushcheck::catalogue::Catalogue;
use mushcheck::context::{AnalysisOptions, AnalysisRequest};
use mushcheck::types::*;
use mushcheck::{EngineConfig, ValidationFailure, Validator};

fn test_catalogue() -> Catalogue {
    Catalogue::from_yaml(
        r#"
dialects:
  - id: pennmush
    name: PennMUSH
    functions:
      - { name: oldfn, deprecated: true, replacement: newfn }
      - { name: newfn }
      - { name: eval }
  - id: tinymush
    name: TinyMUSH
    functions:
      - { name: eval }
rules:
  - id: EVAL-INPUT
    pattern: '\beval\s*\(\s*%[0-9]'
    severity: high
    category: code_injection
    dialects: [PennMUSH]
    recommendation: "Escape the argument first"
"#,
    )
    .expect("test catalogue should parse")
}

fn codes(result: &AnalysisResult) -> Vec<SyntaxCode> {
    result.syntax_findings.iter().map(|f| f.code).collect()
}

#[test]
fn test_quoted_bracket_is_ignored() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    let result = validator
        .analyze(&AnalysisRequest::new("think switch(\"(\",a,b)"))
        .unwrap();
    assert!(result.is_valid);
    assert!(codes(&result).is_empty());
}

#[test]
fn test_missing_paren_reports_one_unclosed_bracket() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    for text in ["switch((a,b)", "think switch((a,b)"] {
        let result = validator.analyze(&AnalysisRequest::new(text)).unwrap();
        assert!(!result.is_valid);
        let errors: Vec<_> = result
            .syntax_findings
            .iter()
            .filter(|f| f.severity == IssueSeverity::Error)
            .collect();
        assert_eq!(errors.len(), 1, "{}: {:?}", text, errors);
        assert_eq!(errors[0].code, SyntaxCode::UnclosedBracket);
        assert!(errors[0].message.contains('('));
    }
}

#[test]
fn test_trailing_carriage_return_is_not_a_control_character() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    for text in ["think hi\r", "@@ note\r\nthink hi\r"] {
        let result = validator.analyze(&AnalysisRequest::new(text)).unwrap();
        assert!(result.is_valid, "{:?}", result.syntax_findings);
        assert!(!result
            .syntax_findings
            .iter()
            .any(|f| f.code == SyntaxCode::InvalidCharacter));
    }
}

#[test]
fn test_unterminated_string_is_the_only_finding() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    let result = validator
        .analyze(&AnalysisRequest::new("@pemit me=\"Hello"))
        .unwrap();
    assert_eq!(codes(&result), vec![SyntaxCode::UnterminatedString]);
    assert_eq!(result.syntax_findings[0].column, 11);
    assert_eq!(result.syntax_findings[0].line, 1);
}

#[test]
fn test_rule_dialect_restriction() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);

    let penn = validator
        .analyze(&AnalysisRequest::new("think eval(%0)").with_dialect("PennMUSH"))
        .unwrap();
    assert_eq!(penn.security_findings.len(), 1);
    assert_eq!(penn.security_findings[0].rule_id, "EVAL-INPUT");
    assert_eq!(penn.scores.security_score, 80);

    let tiny = validator
        .analyze(&AnalysisRequest::new("think eval(%0)").with_dialect("TinyMUSH"))
        .unwrap();
    assert!(tiny.security_findings.is_empty());
    assert_eq!(tiny.scores.security_score, 100);
}

#[test]
fn test_deprecated_function_finding_and_notes() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    let result = validator
        .analyze(&AnalysisRequest::new("think oldfn(x)").with_dialect("pennmush"))
        .unwrap();
    assert!(codes(&result).contains(&SyntaxCode::DeprecatedFunction));
    assert_eq!(result.compatibility_notes.len(), 2);
    assert!(result.compatibility_notes[0].contains("oldfn"));
    assert!(result.compatibility_notes[1].contains("newfn"));
    assert!(result.is_valid);
}

#[test]
fn test_unknown_function_only_in_strict_mode() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    let text = "think mystery(1)";

    let relaxed = validator
        .analyze(&AnalysisRequest::new(text).with_dialect("pennmush"))
        .unwrap();
    assert!(!codes(&relaxed).contains(&SyntaxCode::UnknownFunction));

    let strict = validator
        .analyze(
            &AnalysisRequest::new(text)
                .with_dialect("pennmush")
                .with_options(AnalysisOptions {
                    strict_mode: true,
                    ..AnalysisOptions::default()
                }),
        )
        .unwrap();
    assert!(codes(&strict).contains(&SyntaxCode::UnknownFunction));
    assert!(strict.is_valid);
}

#[test]
fn test_request_rejections() {
    let catalogue = test_catalogue();
    let config = EngineConfig {
        max_text_length: 10,
        ..EngineConfig::default()
    };
    let validator = Validator::with_config(&catalogue, config);

    assert_eq!(
        validator.analyze(&AnalysisRequest::new("\n\n")),
        Err(ValidationFailure::EmptyText)
    );
    assert!(matches!(
        validator.analyze(&AnalysisRequest::new("think hello world")),
        Err(ValidationFailure::TextTooLong { max: 10, .. })
    ));
    assert_eq!(
        validator.analyze(&AnalysisRequest::new("think hi").with_dialect("rhost")),
        Err(ValidationFailure::UnknownDialect {
            dialect_id: "rhost".to_string()
        })
    );
}

#[test]
fn test_json_request_round_trip() {
    let catalogue = test_catalogue();
    let validator = Validator::new(&catalogue);
    let request = AnalysisRequest::from_json(
        r#"{"text": "think eval(%1)", "dialectId": "pennmush", "checkBestPractices": false}"#,
    )
    .unwrap();
    let result = validator.analyze(&request).unwrap();
    assert!(result.improvements.is_empty());
    assert_eq!(result.security_findings.len(), 1);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["isValid"], true);
    assert_eq!(json["totalLines"], 1);
    assert_eq!(json["securityScore"], 80);
    assert!(json["syntaxFindings"].is_array());
    assert_eq!(json["securityFindings"][0]["ruleId"], "EVAL-INPUT");
}

#[test]
fn test_analysis_is_idempotent() {
    let catalogue = Catalogue::builtin().unwrap();
    let validator = Validator::new(&catalogue);
    let request = AnalysisRequest::new(
        "@@ setup\n&CMD_GO me=$go *:@force me=%0;\nthink [iter(lnum(20),add(##,#123))]",
    )
    .with_dialect("pennmush");
    let first = validator.analyze(&request).unwrap();
    let second = validator.analyze(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_builtin_catalogue_flags_forced_input() {
    let catalogue = Catalogue::builtin().unwrap();
    let validator = Validator::new(&catalogue);
    let result = validator
        .analyze(&AnalysisRequest::new("@force %#=%0").with_dialect("tinymush"))
        .unwrap();
    assert_eq!(
        result.highest_security_severity(),
        Some(Severity::Critical)
    );
    assert!(result
        .improvements
        .iter()
        .any(|f| f.category == "unsanitized_input"));
}
