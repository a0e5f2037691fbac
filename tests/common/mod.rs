//! Shared test helpers for integration tests
//!
//! Every command runs with `FBACALC_HOME` pointing into a temp directory so
//! the user's config and history are never touched.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const OVERRIDE_VARS: &[&str] = &[
    "FBACALC_RATE_VERSION",
    "FBACALC_PRODUCT_TYPE",
    "FBACALC_SEASON",
    "FBACALC_CATEGORY",
    "FBACALC_EXCHANGE_RATE",
    "FBACALC_RATES_DIR",
    "FBACALC_HISTORY_FILE",
    "RUST_LOG",
];

/// Helper to get an fbacalc command isolated in `home`
pub fn fbacalc(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("fbacalc"));
    for var in OVERRIDE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("FBACALC_HOME", home.path())
        .env("NO_COLOR", "1")
        .current_dir(home.path());
    cmd
}

/// Arguments for the 10 × 8 × 0.5 in, 14 oz small standard package
pub fn small_standard_args() -> Vec<&'static str> {
    vec!["-L", "10", "-W", "8", "-H", "0.5", "--weight", "14"]
}

/// Arguments for the 20 × 15 × 10 in, 40 lb oversize package
pub fn oversize_args() -> Vec<&'static str> {
    vec![
        "-L", "20", "-W", "15", "-H", "10", "--weight", "40", "--weight-unit", "lb",
    ]
}

/// Path of a bundled data file
pub fn data_file(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

/// Run a command and parse its stdout as JSON
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
