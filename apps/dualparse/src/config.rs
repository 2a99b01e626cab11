//! # Harness Configuration
//!
//! `dualparse.toml` selects the backend pair, the match policy and the log
//! format. Every section and key is optional; missing values take defaults.
//!
//! ```toml
//! [harness]
//! primary = "arena"
//! secondary = "keyed"
//! match_policy = "permissive"
//! filepath = "/etc/apache2/apache2.conf"
//!
//! [log]
//! format = "text"
//! ```

use crate::error::HarnessError;
use dualparse_core::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "dualparse.toml";

/// Environment variable overriding `[log] format`.
pub const LOG_FORMAT_ENV: &str = "DUALPARSE_LOG_FORMAT";

// =============================================================================
// SELECTORS
// =============================================================================

/// Backend implementation a side of the harness runs on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Vec-backed store, document-order search results.
    #[default]
    Arena,
    /// BTreeMap-backed store, key-order search results.
    Keyed,
    /// No implementation; every answer is the pass sentinel.
    Pass,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena => f.write_str("arena"),
            Self::Keyed => f.write_str("keyed"),
            Self::Pass => f.write_str("pass"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Resolve the effective format: the environment wins over the file.
    #[must_use]
    pub fn resolve(env: Option<&str>, file: Self) -> Self {
        match env {
            Some("json") => Self::Json,
            Some("text") => Self::Text,
            _ => file,
        }
    }
}

/// Parse a `--match-policy` argument.
pub fn parse_match_policy(value: &str) -> Result<MatchPolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "permissive" => Ok(MatchPolicy::Permissive),
        "exclusive" => Ok(MatchPolicy::Exclusive),
        other => Err(format!(
            "unknown match policy '{other}' (expected permissive or exclusive)"
        )),
    }
}

// =============================================================================
// CONFIG SECTIONS
// =============================================================================

/// `[harness]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    pub primary: BackendKind,
    pub secondary: BackendKind,
    pub match_policy: MatchPolicy,
    /// File the root block belongs to. Without it nothing is ever dirty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<PathBuf>,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            primary: BackendKind::Arena,
            secondary: BackendKind::Keyed,
            match_policy: MatchPolicy::default(),
            filepath: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub harness: HarnessSettings,
    pub log: LogSettings,
}

impl Config {
    /// Parse a TOML document. `path` is only used for error reporting.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, HarnessError> {
        toml::from_str(text).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, HarnessError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Apply command line overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(
        mut self,
        primary: Option<BackendKind>,
        secondary: Option<BackendKind>,
        match_policy: Option<MatchPolicy>,
    ) -> Self {
        if let Some(primary) = primary {
            self.harness.primary = primary;
        }
        if let Some(secondary) = secondary {
            self.harness.secondary = secondary;
        }
        if let Some(policy) = match_policy {
            self.harness.match_policy = policy;
        }
        self
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, HarnessError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
