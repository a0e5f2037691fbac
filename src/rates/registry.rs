//! Rate table registry - embedded schedules plus optional local table files
//!
//! Every table is validated as it is added, so a malformed schedule fails at
//! startup instead of producing a nonsense fee deep inside a calculation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::rates::embedded::EmbeddedData;
use crate::rates::error::RateError;
use crate::rates::table::{ProductType, RateTable, RateTableKey, Season};
use crate::yaml::{is_yaml_path, parse_yaml};

/// Embedded directory holding rate files
const RATES_PREFIX: &str = "rates/";

/// A single table entry inside a rate file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTableEntry {
    pub product_type: ProductType,
    pub season: Season,

    #[serde(flatten)]
    pub table: RateTable,
}

/// On-disk shape of a rate file: one version, several tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateFile {
    pub version: String,
    pub tables: Vec<RateTableEntry>,
}

impl RateFile {
    /// Parse and fully validate a rate file
    pub fn parse(content: &str, filename: &str) -> Result<Self, RateError> {
        let file: RateFile = parse_yaml(content, filename)?;
        file.validate(filename)?;
        Ok(file)
    }

    /// Check every table and reject duplicate keys within the file
    pub fn validate(&self, filename: &str) -> Result<(), RateError> {
        let mut seen = BTreeSet::new();
        for entry in &self.tables {
            let key = RateTableKey::new(&self.version, entry.product_type, entry.season);
            entry.table.validate(&key)?;
            if !seen.insert(key.clone()) {
                return Err(RateError::DuplicateTable {
                    key: key.to_string(),
                    source_name: filename.to_string(),
                });
            }
        }
        Ok(())
    }

    fn into_tables(self) -> impl Iterator<Item = (RateTableKey, RateTable)> {
        let version = self.version;
        self.tables.into_iter().map(move |e| {
            (
                RateTableKey::new(version.clone(), e.product_type, e.season),
                e.table,
            )
        })
    }
}

/// Typed registry of validated rate tables
#[derive(Debug, Clone, Default)]
pub struct RateRegistry {
    tables: BTreeMap<RateTableKey, RateTable>,
}

impl RateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the schedules bundled with the binary
    pub fn builtin() -> Result<Self, RateError> {
        let mut registry = Self::new();
        for name in EmbeddedData::names_under(RATES_PREFIX) {
            let content = EmbeddedData::read(&name)?;
            registry.add_file(parse_yaml(&content, &name)?, &name)?;
        }
        tracing::debug!(tables = registry.len(), "loaded built-in rate tables");
        Ok(registry)
    }

    /// Validate a file and add every table, replacing tables with the same key
    pub fn add_file(&mut self, file: RateFile, source_name: &str) -> Result<usize, RateError> {
        file.validate(source_name)?;
        let mut added = 0;
        for (key, table) in file.into_tables() {
            if self.tables.insert(key.clone(), table).is_some() {
                tracing::info!(%key, "rate table replaced by a later definition");
            }
            added += 1;
        }
        Ok(added)
    }

    /// Load one rate file from disk
    pub fn load_file(&mut self, path: &Path) -> Result<usize, RateError> {
        let content = std::fs::read_to_string(path).map_err(|source| RateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();
        self.add_file(parse_yaml(&content, &name)?, &name)
    }

    /// Load every YAML file in a directory, in file-name order
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, RateError> {
        let entries = std::fs::read_dir(dir).map_err(|source| RateError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_yaml_path(p))
            .collect();
        paths.sort();

        let mut total = 0;
        for path in paths {
            total += self.load_file(&path)?;
        }
        tracing::debug!(dir = %dir.display(), tables = total, "loaded local rate tables");
        Ok(total)
    }

    /// Look up the table for a key
    pub fn get(&self, key: &RateTableKey) -> Option<&RateTable> {
        self.tables.get(key)
    }

    pub fn contains(&self, key: &RateTableKey) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RateTableKey> {
        self.tables.keys()
    }

    /// Distinct schedule versions, ascending
    pub fn versions(&self) -> BTreeSet<&str> {
        self.tables.keys().map(|k| k.version.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
