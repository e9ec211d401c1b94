// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tests for SARIF 2.1.0 output format

use mushcheck::batch::{self, BatchConfig};
use mushcheck::catalogue::Catalogue;
use mushcheck::report::sarif;
use mushcheck::Validator;
use std::fs;
use tempfile::TempDir;

fn make_test_report(dir: &TempDir) -> batch::BatchReport {
    fs::write(
        dir.path().join("broken.mush"),
        "think add(1\n@force me=%0",
    )
    .unwrap();
    fs::write(dir.path().join("clean.mush"), "@@ fine\nthink hi").unwrap();

    let catalogue = Catalogue::builtin().unwrap();
    let validator = Validator::new(&catalogue);
    batch::run(&BatchConfig::new(vec![dir.path().to_path_buf()]), &validator)
        .expect("batch should succeed")
}

#[test]
fn test_sarif_schema_and_version() {
    let dir = TempDir::new().unwrap();
    let report = make_test_report(&dir);
    let json = sarif::to_sarif_json(&report).expect("SARIF conversion should succeed");
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["version"], "2.1.0");
    assert!(parsed["$schema"].as_str().unwrap().contains("sarif-schema-2.1.0"));
    assert_eq!(parsed["runs"].as_array().unwrap().len(), 1);
    assert_eq!(parsed["runs"][0]["tool"]["driver"]["name"], "mushcheck");
}

#[test]
fn test_sarif_results_carry_locations_and_levels() {
    let dir = TempDir::new().unwrap();
    let report = make_test_report(&dir);
    let log = sarif::to_sarif(&report).unwrap();
    let run = &log.runs[0];

    let unclosed = run
        .results
        .iter()
        .find(|r| r.rule_id == "UNCLOSED_BRACKET")
        .expect("unclosed bracket result");
    assert_eq!(unclosed.level, "error");
    let region = &unclosed.locations[0].physical_location.region;
    assert_eq!((region.start_line, region.start_column), (1, 10));
    assert!(unclosed.locations[0]
        .physical_location
        .artifact_location
        .uri
        .ends_with("broken.mush"));

    let forced = run
        .results
        .iter()
        .find(|r| r.rule_id == "MUSH-SEC-003")
        .expect("forced input result");
    assert_eq!(forced.level, "error");

    assert!(run
        .results
        .iter()
        .any(|r| r.rule_id == "practice/unsanitized_input" && r.level == "warning"));
}

#[test]
fn test_sarif_rules_declared_once() {
    let dir = TempDir::new().unwrap();
    let report = make_test_report(&dir);
    let log = sarif::to_sarif(&report).unwrap();
    let rules = &log.runs[0].tool.driver.rules;

    let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);

    for result in &log.runs[0].results {
        assert!(rules.iter().any(|r| r.id == result.rule_id));
    }
}

#[test]
fn test_sarif_empty_batch() {
    let dir = TempDir::new().unwrap();
    let catalogue = Catalogue::builtin().unwrap();
    let validator = Validator::new(&catalogue);
    let report = batch::run(&BatchConfig::new(vec![dir.path().to_path_buf()]), &validator).unwrap();
    let log = sarif::to_sarif(&report).unwrap();
    assert!(log.runs[0].results.is_empty());
    assert!(log.runs[0].tool.driver.rules.is_empty());
}
