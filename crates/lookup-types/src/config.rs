//! Configuration loading for roster-lookup.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/roster-lookup/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LookupError;

/// Upper bound on suggestions shown at once.
pub const MAX_SUGGESTIONS: usize = 5;

/// Incremental search tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSettings {
    /// Quiet period before a suggestion fetch is issued (ms).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum suggestions requested from the store.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Minimum trimmed query length before suggestions are fetched.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suggestion_limit() -> usize {
    5
}

fn default_min_query_chars() -> usize {
    2
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

impl SearchSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.debounce_ms == 0 {
            return Err("debounce_ms must be > 0".to_string());
        }
        if self.suggestion_limit == 0 || self.suggestion_limit > MAX_SUGGESTIONS {
            return Err(format!(
                "suggestion_limit must be between 1 and {MAX_SUGGESTIONS}"
            ));
        }
        if self.min_query_chars == 0 {
            return Err("min_query_chars must be >= 1".to_string());
        }
        Ok(())
    }
}

/// Which record store backs the roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Roster held in memory (sample roster or a JSON roster file)
    #[default]
    Memory,
    /// PostgREST-compatible HTTP endpoint
    Rest,
}

/// Column names of the members table on the REST backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnSettings {
    #[serde(default = "default_id_column")]
    pub id: String,
    #[serde(default = "default_last_name_column")]
    pub last_name: String,
    #[serde(default = "default_first_name_column")]
    pub first_name: String,
    #[serde(default = "default_document_ref_column")]
    pub document_ref: String,
    #[serde(default = "default_created_at_column")]
    pub created_at: String,
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_last_name_column() -> String {
    "nom".to_string()
}

fn default_first_name_column() -> String {
    "prenom".to_string()
}

fn default_document_ref_column() -> String {
    "pdf_name".to_string()
}

fn default_created_at_column() -> String {
    "created_at".to_string()
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            id: default_id_column(),
            last_name: default_last_name_column(),
            first_name: default_first_name_column(),
            document_ref: default_document_ref_column(),
            created_at: default_created_at_column(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// JSON roster file for the memory backend (sample roster when unset)
    #[serde(default)]
    pub roster_path: Option<String>,

    /// Project URL for the REST backend (e.g. "https://xyz.supabase.co")
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key (loaded from env var, never written back out)
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Table holding the roster
    #[serde(default = "default_table")]
    pub table: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub columns: ColumnSettings,
}

fn default_table() -> String {
    "members".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            roster_path: None,
            base_url: None,
            api_key: None,
            table: default_table(),
            timeout_secs: default_timeout_secs(),
            columns: ColumnSettings::default(),
        }
    }
}

impl StoreSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::Rest {
            match self.base_url.as_deref() {
                Some(url) if !url.trim().is_empty() => {}
                _ => return Err("store.base_url is required for the rest backend".to_string()),
            }
        }
        if self.table.trim().is_empty() {
            return Err("store.table must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("store.timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Where member documents are served from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSettings {
    /// Public base URL; the document reference is appended as a path segment.
    #[serde(default = "default_document_base_url")]
    pub base_url: String,
}

fn default_document_base_url() -> String {
    "http://localhost:5173/pdfs/".to_string()
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            base_url: default_document_base_url(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub documents: DocumentSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            search: SearchSettings::default(),
            store: StoreSettings::default(),
            documents: DocumentSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/roster-lookup/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (LOOKUP_*, nested keys joined with `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, LookupError> {
        let config_dir = ProjectDirs::from("", "", "roster-lookup")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("log_level", default_log_level())
            .map_err(|e| LookupError::Config(e.to_string()))?
            .set_default("search.debounce_ms", default_debounce_ms() as i64)
            .map_err(|e| LookupError::Config(e.to_string()))?
            .set_default("search.suggestion_limit", default_suggestion_limit() as i64)
            .map_err(|e| LookupError::Config(e.to_string()))?
            .set_default("search.min_query_chars", default_min_query_chars() as i64)
            .map_err(|e| LookupError::Config(e.to_string()))?
            .set_default("store.table", default_table())
            .map_err(|e| LookupError::Config(e.to_string()))?
            .set_default("documents.base_url", default_document_base_url())
            .map_err(|e| LookupError::Config(e.to_string()))?
            // 2. Default config file
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables, e.g. LOOKUP_LOG_LEVEL, LOOKUP_SEARCH__DEBOUNCE_MS,
        //    LOOKUP_STORE__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("LOOKUP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| LookupError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| LookupError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), LookupError> {
        self.search.validate().map_err(LookupError::Config)?;
        self.store.validate().map_err(LookupError::Config)?;
        if self.documents.base_url.trim().is_empty() {
            return Err(LookupError::Config(
                "documents.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand ~ in the roster path to the home directory
    pub fn expanded_roster_path(&self) -> Option<PathBuf> {
        let raw = self.store.roster_path.as_deref()?;
        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
                return Some(home.join(rest));
            }
        }
        Some(PathBuf::from(raw))
    }
}
