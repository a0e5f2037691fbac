//! Configuration - user defaults merged from config files and environment
//!
//! Sources, later wins:
//! 1. `config.yaml` in the user config directory
//! 2. `.fbacalc.yaml` in the current directory or its ancestors
//! 3. `FBACALC_*` environment variables
//!
//! `FBACALC_HOME` replaces the platform config and data directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::pipeline::DEFAULT_RATE_VERSION;
use crate::rates::{ProductType, Season, DEFAULT_CATEGORY};

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".fbacalc.yaml";

/// Config file name inside the user config directory
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// Default history file name inside the data directory
pub const HISTORY_FILE: &str = "history.json";

/// Environment variable relocating config and data
pub const HOME_ENV: &str = "FBACALC_HOME";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Values read from a single config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub rate_version: Option<String>,
    pub product_type: Option<ProductType>,
    pub season: Option<Season>,
    pub category: Option<String>,
    pub exchange_rate: Option<f64>,
    pub rates_dir: Option<PathBuf>,
    pub history_file: Option<PathBuf>,
}

impl ConfigFile {
    /// Overlay `other` on top of `self`
    fn merge(&mut self, other: ConfigFile) {
        if other.rate_version.is_some() {
            self.rate_version = other.rate_version;
        }
        if other.product_type.is_some() {
            self.product_type = other.product_type;
        }
        if other.season.is_some() {
            self.season = other.season;
        }
        if other.category.is_some() {
            self.category = other.category;
        }
        if other.exchange_rate.is_some() {
            self.exchange_rate = other.exchange_rate;
        }
        if other.rates_dir.is_some() {
            self.rates_dir = other.rates_dir;
        }
        if other.history_file.is_some() {
            self.history_file = other.history_file;
        }
    }

    /// Resolve relative paths against the directory holding the file
    fn anchored_at(mut self, dir: &Path) -> Self {
        self.rates_dir = self.rates_dir.map(|p| dir.join(p));
        self.history_file = self.history_file.map(|p| dir.join(p));
        self
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub rate_version: String,
    pub product_type: ProductType,

    /// Fixed season; when absent the season follows today's date
    pub season: Option<Season>,

    pub category: String,
    pub exchange_rate: f64,
    pub rates_dir: Option<PathBuf>,
    pub history_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), &default_data_dir())
    }
}

impl Config {
    /// Load from all sources, ignoring unreadable files
    pub fn load() -> Self {
        let mut merged = ConfigFile::default();

        if let Some(path) = user_config_path() {
            if let Some(file) = try_load(&path) {
                merged.merge(file);
            }
        }

        if let Some(file) = find_local_config().and_then(|path| try_load(&path)) {
            merged.merge(file);
        }

        merged.merge(env_overrides(|key| std::env::var(key).ok()));
        Self::from_file(merged, &default_data_dir())
    }

    fn from_file(file: ConfigFile, data_dir: &Path) -> Self {
        Self {
            rate_version: file
                .rate_version
                .unwrap_or_else(|| DEFAULT_RATE_VERSION.to_string()),
            product_type: file.product_type.unwrap_or_default(),
            season: file.season,
            category: file
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            exchange_rate: file.exchange_rate.unwrap_or(1.0),
            rates_dir: file.rates_dir,
            history_file: file
                .history_file
                .unwrap_or_else(|| data_dir.join(HISTORY_FILE)),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "fbacalc")
}

fn home_override() -> Option<PathBuf> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Directory holding the user config file
pub fn config_dir() -> Option<PathBuf> {
    home_override().or_else(|| project_dirs().map(|d| d.config_dir().to_path_buf()))
}

/// Directory holding the history file
pub fn default_data_dir() -> PathBuf {
    home_override()
        .or_else(|| project_dirs().map(|d| d.data_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from(".fbacalc"))
}

fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(USER_CONFIG_FILE))
}

/// Nearest `.fbacalc.yaml` walking up from the current directory
fn find_local_config() -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;
    current
        .ancestors()
        .take(MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(LOCAL_CONFIG_FILE))
        .find(|path| path.is_file())
}

/// Parse a config file; problems are logged and the file skipped
pub fn try_load(path: &Path) -> Option<ConfigFile> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to read config file");
            }
            return None;
        }
    };

    if contents.trim().is_empty() {
        return Some(ConfigFile::default());
    }

    match serde_yml::from_str::<ConfigFile>(&contents) {
        Ok(file) => {
            tracing::debug!(path = %path.display(), "loaded config");
            Some(match path.parent() {
                Some(dir) => file.anchored_at(dir),
                None => file,
            })
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
            None
        }
    }
}

/// Overrides from `FBACALC_*` variables; unparseable values are skipped
fn env_overrides(var: impl Fn(&str) -> Option<String>) -> ConfigFile {
    fn parsed<T: std::str::FromStr>(name: &str, value: Option<String>) -> Option<T> {
        let value = value?;
        match value.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(var = name, value = %value, "ignoring invalid environment override");
                None
            }
        }
    }

    ConfigFile {
        rate_version: var("FBACALC_RATE_VERSION"),
        product_type: parsed("FBACALC_PRODUCT_TYPE", var("FBACALC_PRODUCT_TYPE")),
        season: parsed("FBACALC_SEASON", var("FBACALC_SEASON")),
        category: var("FBACALC_CATEGORY"),
        exchange_rate: parsed("FBACALC_EXCHANGE_RATE", var("FBACALC_EXCHANGE_RATE")),
        rates_dir: var("FBACALC_RATES_DIR").map(PathBuf::from),
        history_file: var("FBACALC_HISTORY_FILE").map(PathBuf::from),
    }
}
