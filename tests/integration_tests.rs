//! Integration tests for the pquote CLI
//!
//! These tests exercise the commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const FEATURES: [&str; 10] = [
    "volume",
    "through_hole_count",
    "blind_hole_count",
    "blind_hole_avg_depth_to_diameter",
    "blind_hole_max_depth_to_diameter",
    "pocket_count",
    "pocket_total_volume",
    "pocket_avg_depth",
    "pocket_max_depth",
    "non_standard_hole_count",
];

/// Helper to get a pquote command isolated from user settings
fn pquote(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pquote").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env_remove("PQUOTE_PRICING_CONFIG")
        .env_remove("PQUOTE_FORMAT")
        .env_remove("PQUOTE_LOG");
    cmd
}

fn feature_map(value: f64) -> String {
    let entries: Vec<String> = FEATURES
        .iter()
        .map(|f| format!("\"{}\": {}", f, value))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Pricing artifact with neutral coefficients: every part costs `base_price`
fn write_pricing_config(tmp: &TempDir, base_price: f64, r_squared: f64) -> PathBuf {
    let path = tmp.path().join("pricing.json");
    let content = format!(
        r#"{{
  "base_price": {},
  "minimum_order_price": 30.0,
  "r_squared": {},
  "coefficients": {},
  "scaler_mean": {},
  "scaler_std": {},
  "last_updated": "2026-09-30T08:15:00Z"
}}"#,
        base_price,
        r_squared,
        feature_map(0.0),
        feature_map(0.0),
        feature_map(1.0)
    );
    fs::write(&path, content).unwrap();
    path
}

fn write_file(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PLAIN_BLOCK: &str = "\
name: Plain block
bounding_box:
  min: [0, 0, 0]
  max: [10, 20, 30]
volume: 6000
";

const TWO_THROUGH_HOLES: &str = "\
name: Plate with two holes
bounding_box:
  min: [0, 0, 0]
  max: [40, 40, 20]
volume: 31434.5
faces:
  - type: CYLINDER
    bounds: {min: [7, 7, 0], max: [13, 13, 20]}
    direction: [0, 0, 1]
  - type: CYLINDER
    bounds: {min: [27, 27, 0], max: [33, 33, 20]}
    direction: [0, 0, 1]
";

const DEEP_BLIND_HOLE: &str = "\
name: Deep blind hole
bounding_box:
  min: [0, 0, 0]
  max: [60, 60, 80]
volume: 287411
faces:
  - type: CYLINDER
    bounds: {min: [27.5, 27.5, 50], max: [32.5, 32.5, 80]}
    direction: [0, 0, 1]
";

const OVERSIZE: &str = "\
bounding_box:
  min: [0, 0, 0]
  max: [650, 100, 100]
volume: 6500000
";

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    pquote(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("quote"))
        .stdout(predicate::str::contains("evaluate"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    pquote(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pquote"));
}

// ============================================================================
// Analyze
// ============================================================================

#[test]
fn test_analyze_plain_block() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);

    pquote(&tmp)
        .args(["analyze", solid.to_str().unwrap(), "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Analysis: Plain block"))
        .stdout(predicate::str::contains("10.0 × 20.0 × 30.0 mm"))
        .stdout(predicate::str::contains("6000.0 mm³"))
        .stdout(predicate::str::contains("No manufacturability issues found"));
}

#[test]
fn test_analyze_two_through_holes_json() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "plate.yaml", TWO_THROUGH_HOLES);

    pquote(&tmp)
        .args(["analyze", solid.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"through_hole_count\": 2"))
        .stdout(predicate::str::contains("\"blind_hole_count\": 0"))
        .stdout(predicate::str::contains("\"non_standard_hole_count\": 0"));
}

#[test]
fn test_analyze_deep_blind_hole_is_critical() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "deep.yaml", DEEP_BLIND_HOLE);

    pquote(&tmp)
        .args(["analyze", solid.to_str().unwrap(), "--format", "md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("critical"))
        .stdout(predicate::str::contains("Very deep blind hole detected"));
}

#[test]
fn test_analyze_oversize_part_fails() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "big.yaml", OVERSIZE);

    pquote(&tmp)
        .args(["analyze", solid.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Part exceeds maximum size"));
}

#[test]
fn test_analyze_yaml_syntax_error() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "broken.yaml", "bounding_box: [unclosed\n");

    pquote(&tmp)
        .args(["analyze", solid.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_analyze_missing_file() {
    let tmp = TempDir::new().unwrap();
    pquote(&tmp)
        .args(["analyze", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yaml"));
}

// ============================================================================
// Quote
// ============================================================================

#[test]
fn test_quote_full_pipeline() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "quote",
            solid.to_str().unwrap(),
            "-n",
            "5",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Price"))
        .stdout(predicate::str::contains("€200.00"))
        .stdout(predicate::str::contains("non-binding"));
}

#[test]
fn test_quote_quiet_keeps_disclaimer() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "quote",
            solid.to_str().unwrap(),
            "-q",
            "-n",
            "5",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("€200.00"))
        .stdout(predicate::str::contains("non-binding"));
}

#[test]
fn test_quote_json_has_part_id_and_quote() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    let output = pquote(&tmp)
        .args([
            "quote",
            solid.to_str().unwrap(),
            "--quantity",
            "2",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["part_id"].as_str().unwrap().len(), 26);
    assert_eq!(value["quote"]["quantity"], 2);
    assert_eq!(value["quote"]["total_price"], 80.0);
    assert_eq!(value["errors"].as_array().unwrap().len(), 0);
}

#[test]
fn test_quote_quantity_51_rejected() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "quote",
            solid.to_str().unwrap(),
            "-n",
            "51",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "md",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("## Price").not())
        .stderr(predicate::str::contains("Quantity must be between 1 and 50"));
}

#[test]
fn test_quote_untrained_model() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.0);

    pquote(&tmp)
        .args([
            "quote",
            solid.to_str().unwrap(),
            "-n",
            "5",
            "--pricing-config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("System not ready - training required"));
}

#[test]
fn test_quote_uses_pricing_config_from_environment() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .env("PQUOTE_PRICING_CONFIG", &config)
        .args(["quote", solid.to_str().unwrap(), "-n", "1", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"price_per_unit\": 40.0"));
}

#[test]
fn test_quote_missing_pricing_config() {
    let tmp = TempDir::new().unwrap();
    let solid = write_file(&tmp, "block.yaml", PLAIN_BLOCK);

    pquote(&tmp)
        .args(["quote", solid.to_str().unwrap(), "-n", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Pricing config file not found"));
}

// ============================================================================
// Price
// ============================================================================

#[test]
fn test_price_minimum_order_applied() {
    let tmp = TempDir::new().unwrap();
    let features = write_file(&tmp, "features.yaml", "volume: 6000\nthrough_hole_count: 2\n");
    let config = write_pricing_config(&tmp, 6.0, 0.9);

    pquote(&tmp)
        .args([
            "price",
            features.to_str().unwrap(),
            "-n",
            "3",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"minimum_applied\": true"))
        .stdout(predicate::str::contains("\"total_price\": 30.0"))
        .stdout(predicate::str::contains("\"calculated_total\": 18.0"))
        .stdout(predicate::str::contains("\"disclaimer\": \"This quote is automatically generated"));
}

#[test]
fn test_price_yaml_carries_disclaimer() {
    let tmp = TempDir::new().unwrap();
    let features = write_file(&tmp, "features.yaml", "volume: 6000\n");
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "price",
            features.to_str().unwrap(),
            "-n",
            "2",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "yaml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("total_price: 80.0"))
        .stdout(predicate::str::contains("disclaimer:"));
}

#[test]
fn test_price_quiet_keeps_disclaimer() {
    let tmp = TempDir::new().unwrap();
    let features = write_file(&tmp, "features.yaml", "volume: 6000\n");
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "price",
            features.to_str().unwrap(),
            "-q",
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("non-binding"));
}

#[test]
fn test_price_negative_quantity_rejected() {
    let tmp = TempDir::new().unwrap();
    let features = write_file(&tmp, "features.json", "{\"volume\": 6000}");
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args([
            "price",
            features.to_str().unwrap(),
            "-n",
            "-2",
            "--pricing-config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Quantity must be between 1 and 50"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_check_valid() {
    let tmp = TempDir::new().unwrap();
    let config = write_pricing_config(&tmp, 40.0, 0.9);

    pquote(&tmp)
        .args(["config", "check", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("is a valid pricing artifact"))
        .stdout(predicate::str::contains("2026-09-30 08:15 UTC"));
}

#[test]
fn test_config_check_missing_feature() {
    let tmp = TempDir::new().unwrap();
    let config = write_pricing_config(&tmp, 40.0, 0.9);
    let content = fs::read_to_string(&config)
        .unwrap()
        .replacen("\"pocket_count\": 0, ", "", 1);
    fs::write(&config, content).unwrap();

    pquote(&tmp)
        .args(["config", "check", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Schema validation failed"));
}

#[test]
fn test_config_check_zero_std() {
    let tmp = TempDir::new().unwrap();
    let config = write_pricing_config(&tmp, 40.0, 0.9);
    let content = fs::read_to_string(&config)
        .unwrap()
        .replace("\"volume\": 1, ", "\"volume\": 0, ");
    fs::write(&config, content).unwrap();

    pquote(&tmp)
        .args(["config", "check", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scaler_std for 'volume'"));
}

#[test]
fn test_config_show_reads_local_settings() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, ".pquote.yaml", "pricing_config: models/latest.json\n");

    pquote(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("models/latest.json"));
}

// ============================================================================
// Evaluate
// ============================================================================

#[test]
fn test_evaluate_samples() {
    let tmp = TempDir::new().unwrap();
    let config = write_pricing_config(&tmp, 40.0, 0.9);
    let csv = format!(
        "name,quantity,actual_price_per_unit,{}\n\
         exact,5,40.0,6000,0,0,0,0,0,0,0,0,0\n\
         cheap,5,50.0,6000,2,0,0,0,0,0,0,0,0\n",
        FEATURES.join(",")
    );
    let samples = write_file(&tmp, "samples.csv", &csv);

    pquote(&tmp)
        .args([
            "evaluate",
            samples.to_str().unwrap(),
            "--pricing-config",
            config.to_str().unwrap(),
            "--format",
            "md",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("**Parts tested:** 2"))
        .stdout(predicate::str::contains("-20.0%"))
        .stdout(predicate::str::contains("**Above 10% / 20%:** 1 / 0"));
}

#[test]
fn test_evaluate_missing_columns() {
    let tmp = TempDir::new().unwrap();
    let config = write_pricing_config(&tmp, 40.0, 0.9);
    let samples = write_file(&tmp, "samples.csv", "name,quantity\nx,1\n");

    pquote(&tmp)
        .args([
            "evaluate",
            samples.to_str().unwrap(),
            "--pricing-config",
            config.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing column"));
}
