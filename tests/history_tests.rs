//! Saved calculation history tests

mod common;

use common::{fbacalc, json_output, small_standard_args};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn save_calc(home: &TempDir, price: &str) {
    let mut args = vec!["calc"];
    args.extend(small_standard_args());
    args.extend(["--price", price, "-s", "non-peak", "--save"]);
    fbacalc(home)
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to history"));
}

#[test]
fn test_history_empty() {
    let home = TempDir::new().unwrap();
    fbacalc(&home)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved calculations"));
}

#[test]
fn test_history_newest_first() {
    let home = TempDir::new().unwrap();
    save_calc(&home, "9.50");
    save_calc(&home, "25");

    let json = json_output(fbacalc(&home).args(["history", "list", "--format", "json"]));
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["input"]["price"].as_f64(), Some(25.0));
    assert_eq!(entries[1]["input"]["price"].as_f64(), Some(9.5));
    assert_eq!(entries[1]["summary"]["fulfillment_fee"].as_f64(), Some(2.66));
}

#[test]
fn test_history_file_is_keyed_object() {
    let home = TempDir::new().unwrap();
    save_calc(&home, "9.50");

    let content = fs::read_to_string(home.path().join("history.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["fba_calculator_history"].as_array().unwrap().len(), 1);
}

#[test]
fn test_history_show_recomputes() {
    let home = TempDir::new().unwrap();
    save_calc(&home, "9.50");

    fbacalc(&home)
        .args(["history", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved"))
        .stdout(predicate::str::contains("$2.66"));
}

#[test]
fn test_history_show_out_of_range() {
    let home = TempDir::new().unwrap();
    save_calc(&home, "9.50");

    fbacalc(&home)
        .args(["history", "show", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No saved calculation at position 5"));
}

#[test]
fn test_history_clear() {
    let home = TempDir::new().unwrap();
    save_calc(&home, "9.50");
    save_calc(&home, "12");

    fbacalc(&home)
        .args(["history", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 saved calculation(s)"));

    fbacalc(&home)
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved calculations"));
}

#[test]
fn test_history_keeps_unrelated_keys() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("history.json"),
        r#"{"theme": "dark", "fba_calculator_history": []}"#,
    )
    .unwrap();
    save_calc(&home, "9.50");

    let content = fs::read_to_string(home.path().join("history.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["theme"], "dark");
    assert_eq!(json["fba_calculator_history"].as_array().unwrap().len(), 1);
}

#[test]
fn test_history_file_override() {
    let home = TempDir::new().unwrap();
    let custom = home.path().join("elsewhere.json");
    let mut args = vec!["calc"];
    args.extend(small_standard_args());
    args.extend(["--price", "9.50", "-s", "non-peak", "--save"]);
    fbacalc(&home)
        .env("FBACALC_HISTORY_FILE", &custom)
        .args(args)
        .assert()
        .success();

    assert!(custom.exists());
    assert!(!home.path().join("history.json").exists());
}
