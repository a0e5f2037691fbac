//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::{Config, Engine};

/// Parse a number leniently: anything unparseable reads as 0
///
/// Accepts a leading `$` and thousands separators (`$1,299.00`).
pub fn lenient_f64(s: &str) -> std::result::Result<f64, String> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Ok(cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Build the engine from built-in data plus the configured rates directory
pub fn load_engine(config: &Config) -> Result<Engine> {
    Ok(Engine::with_rates_dir(config.rates_dir.as_deref())?)
}

/// Print a value as JSON or YAML. Returns false for text formats.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        OutputFormat::Auto | OutputFormat::Text => Ok(false),
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_f64() {
        assert_eq!(lenient_f64("9.50"), Ok(9.5));
        assert_eq!(lenient_f64(" $1,299.00 "), Ok(1299.0));
        assert_eq!(lenient_f64("abc"), Ok(0.0));
        assert_eq!(lenient_f64(""), Ok(0.0));
        assert_eq!(lenient_f64("inf"), Ok(0.0));
        assert_eq!(lenient_f64("-3"), Ok(-3.0));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }
}
