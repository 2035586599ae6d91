//! Console settings loading from config.toml
//!
//! `config.toml` carries the console options, overrides for the code
//! sequences, the operators allowed to use the console and the reference
//! records seeded on startup. Every section is optional; a missing file means
//! built-in defaults.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{collections::HashMap, path::Path};
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// General console options
    #[serde(default)]
    pub console: ConsoleSettings,
    /// Code sequence overrides keyed by table name (e.g. `account`, `regular_pwp`)
    #[serde(default)]
    pub sequences: HashMap<String, SequenceConfig>,
    /// Operators allowed to use the console; empty means everyone
    #[serde(default)]
    pub operators: Vec<OperatorConfig>,
    /// Reference records to seed when missing
    #[serde(default)]
    pub reference: Vec<ReferenceSeed>,
}

/// General console options
#[derive(Debug, Deserialize)]
pub struct ConsoleSettings {
    /// Rows per page in list panels
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Insert attempts before giving up on a colliding generated code
    #[serde(default = "default_code_retry_attempts")]
    pub code_retry_attempts: u32,
}

const fn default_page_size() -> u64 {
    10
}

const fn default_code_retry_attempts() -> u32 {
    3
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            code_retry_attempts: default_code_retry_attempts(),
        }
    }
}

/// Override for one table's code sequence
#[derive(Debug, Deserialize, Clone)]
pub struct SequenceConfig {
    /// Fixed prefix kept on every code
    #[serde(default)]
    pub prefix: String,
    /// Minimum number of digits after the prefix
    pub width: usize,
    /// Numeric part of the first code handed out
    pub seed: u64,
}

/// An operator allowed to use the console
#[derive(Debug, Deserialize, Clone)]
pub struct OperatorConfig {
    /// Discord user ID
    pub user_id: String,
    /// Name recorded in `created_by`, approval history and attachments
    pub name: String,
}

/// A reference record to seed on startup
#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceSeed {
    /// Reference list (e.g. `"distributor"`)
    pub kind: String,
    /// Display name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl Settings {
    /// Returns true when `user_id` may use the console.
    #[must_use]
    pub fn is_operator(&self, user_id: &str) -> bool {
        self.operators.is_empty() || self.operators.iter().any(|op| op.user_id == user_id)
    }

    /// Gets the configured display name for a user ID, if any.
    #[must_use]
    pub fn operator_name(&self, user_id: &str) -> Option<&str> {
        self.operators
            .iter()
            .find(|op| op.user_id == user_id)
            .map(|op| op.name.as_str())
    }
}

/// Loads console settings from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_settings(&contents)
}

/// Parses console settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `PWP_CONFIG` (default `./config.toml`), falling back
/// to built-in defaults when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("PWP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No settings file at {path}; using built-in defaults.");
        Ok(Settings::default())
    }
}
