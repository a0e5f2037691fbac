//! Calculation history - the most recent runs, newest first
//!
//! The history file is a JSON object. The run list lives under
//! [`HISTORY_KEY`]; any other keys in the document are kept on save.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::pipeline::{CalculationInput, CalculationResult};
use crate::core::tier::SizeTier;

/// Document key holding the run list
pub const HISTORY_KEY: &str = "fba_calculator_history";

/// Maximum number of runs kept
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Error, Diagnostic)]
pub enum HistoryError {
    #[error("failed to access history file {}", path.display())]
    #[diagnostic(code(fbacalc::history::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {} is not valid JSON", path.display())]
    #[diagnostic(
        code(fbacalc::history::json),
        help("delete the file or run `fbacalc history clear` to start over")
    )]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("history file {} must contain a JSON object", path.display())]
    #[diagnostic(code(fbacalc::history::shape))]
    NotAnObject { path: PathBuf },
}

/// Headline outputs of a run; `None` where the value was unresolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub tier: SizeTier,
    pub shipping_weight_oz: f64,
    pub fulfillment_fee: Option<f64>,
    pub referral_fee: Option<f64>,
    pub net_profit: Option<f64>,
    pub margin: Option<f64>,
    pub roi: Option<f64>,
}

impl From<&CalculationResult> for HistorySummary {
    fn from(result: &CalculationResult) -> Self {
        let profit = result.profit.value();
        Self {
            tier: result.classification.tier,
            shipping_weight_oz: result.classification.shipping_weight_oz,
            fulfillment_fee: result.fulfillment_total(),
            referral_fee: result.referral_fee(),
            net_profit: profit.map(|p| p.net_profit),
            margin: profit.map(|p| p.margin),
            roi: profit.map(|p| p.batch.roi),
        }
    }
}

/// One saved run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub input: CalculationInput,
    pub summary: HistorySummary,
}

impl HistoryEntry {
    pub fn new(input: &CalculationInput, result: &CalculationResult) -> Self {
        Self {
            timestamp: Utc::now(),
            input: input.clone(),
            summary: HistorySummary::from(result),
        }
    }
}

/// Ordered run list, newest first, never longer than [`HISTORY_LIMIT`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front and drop the oldest beyond the limit
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Entry by 1-based position (1 is the newest)
    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        position.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type Document = serde_json::Map<String, serde_json::Value>;

/// JSON file backing a [`History`]
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, HistoryError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Document::new());
        }

        let value: serde_json::Value =
            serde_json::from_str(&content).map_err(|source| HistoryError::Json {
                path: self.path.clone(),
                source,
            })?;
        match value {
            serde_json::Value::Object(doc) => Ok(doc),
            _ => Err(HistoryError::NotAnObject {
                path: self.path.clone(),
            }),
        }
    }

    /// Load the history; a missing file is an empty history
    pub fn load(&self) -> Result<History, HistoryError> {
        let mut doc = self.read_document()?;
        let Some(list) = doc.remove(HISTORY_KEY) else {
            return Ok(History::new());
        };
        let mut history: History =
            serde_json::from_value(list).map_err(|source| HistoryError::Json {
                path: self.path.clone(),
                source,
            })?;
        history.entries.truncate(HISTORY_LIMIT);
        Ok(history)
    }

    /// Write the history, keeping unrelated keys already in the file
    pub fn save(&self, history: &History) -> Result<(), HistoryError> {
        let mut doc = self.read_document()?;
        let list = serde_json::to_value(history).map_err(|source| HistoryError::Json {
            path: self.path.clone(),
            source,
        })?;
        doc.insert(HISTORY_KEY.to_string(), list);

        let io_err = |source: std::io::Error| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&doc).map_err(|source| HistoryError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "saved history");
        Ok(())
    }

    /// Remove every run. An unreadable document is replaced outright.
    pub fn clear(&self) -> Result<usize, HistoryError> {
        match self.load() {
            Ok(mut history) => {
                let removed = history.len();
                history.clear();
                self.save(&history)?;
                Ok(removed)
            }
            Err(HistoryError::Json { .. } | HistoryError::NotAnObject { .. }) => {
                tracing::warn!(path = %self.path.display(), "replacing unreadable history file");
                let mut doc = Document::new();
                doc.insert(HISTORY_KEY.to_string(), serde_json::Value::Array(Vec::new()));
                std::fs::write(&self.path, serde_json::Value::Object(doc).to_string()).map_err(
                    |source| HistoryError::Io {
                        path: self.path.clone(),
                        source,
                    },
                )?;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Load, push one entry, save
    pub fn append(&self, entry: HistoryEntry) -> Result<History, HistoryError> {
        let mut history = self.load()?;
        history.push(entry);
        self.save(&history)?;
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::Engine;
    use crate::core::units::PackageSpec;
    use std::fs;
    use tempfile::TempDir;

    fn entry(price: f64) -> HistoryEntry {
        let engine = Engine::builtin().unwrap();
        let input = CalculationInput::new(PackageSpec::inches_ounces(10.0, 8.0, 0.5, 14.0), price);
        let result = engine.calculate(&input);
        HistoryEntry::new(&input, &result)
    }

    #[test]
    fn test_push_is_newest_first_and_capped() {
        let mut history = History::new();
        for i in 0..25 {
            history.push(entry(10.0 + i as f64));
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.get(1).unwrap().input.price, 34.0);
        assert_eq!(history.get(HISTORY_LIMIT).unwrap().input.price, 15.0);
        assert!(history.get(0).is_none());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::new(tmp.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::new(tmp.path().join("sub/history.json"));
        store.append(entry(9.5)).unwrap();
        store.append(entry(20.0)).unwrap();

        let history = store.load().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(1).unwrap().input.price, 20.0);
        assert_eq!(history.get(2).unwrap().summary.fulfillment_fee, Some(2.66));
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = HistoryStore::new(&path);
        store.append(entry(9.5)).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc[HISTORY_KEY].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            HistoryStore::new(&path).load(),
            Err(HistoryError::Json { .. })
        ));

        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            HistoryStore::new(&path).load(),
            Err(HistoryError::NotAnObject { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::new(tmp.path().join("history.json"));
        store.append(entry(9.5)).unwrap();
        store.append(entry(12.0)).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_clear_recovers_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("history.json");
        fs::write(&path, "{ broken").unwrap();
        let store = HistoryStore::new(&path);
        assert_eq!(store.clear().unwrap(), 0);
        assert!(store.load().unwrap().is_empty());
    }
}
