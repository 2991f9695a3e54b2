//! Effective settings with provenance
//!
//! The merged settings plus a record of every layer that contributed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use toml::Table;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Settings file picked up from the working directory when present
pub const DEFAULT_FILE_NAME: &str = "cpq-package.toml";

/// Highest accepted `max_path_depth`; deeper trees risk exhausting the stack
pub const MAX_PATH_DEPTH_LIMIT: usize = 512;

/// Row layout of the input sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Dotted-path configuration rows
    Configuration,
    /// Flat item rows (Commerce, Util Library, ...)
    Items,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Configuration => "configuration",
            Mode::Items => "items",
        }
    }
}

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub mode: Mode,

    /// Minimum number of segments in a configuration path
    pub min_path_depth: usize,

    /// Maximum number of segments in a configuration path
    pub max_path_depth: usize,

    /// Pretty-print emitted JSON
    pub pretty: bool,

    /// Document name; falls back to the sheet's PackageName, then the file stem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

/// Where a settings layer came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged settings and their sources in precedence order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    pub settings: Settings,
    pub sources: Vec<ConfigSource>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl EffectiveSettings {
    /// Merge built-in defaults, an optional settings file and CLI overrides.
    ///
    /// A `file` that is given must exist.
    pub fn build(file: Option<&Path>, cli_overrides: Option<Table>) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_table()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = file {
            let (table, digest) = load_toml_file(path)?;
            layers.push(table);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.display().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let settings: Settings = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid(e.message().to_string()))?;
        validate(&settings)?;

        Ok(Self { settings, sources })
    }

    /// Path of the settings file that contributed, if any
    pub fn file_path(&self) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.origin == ConfigOrigin::File)
            .and_then(|s| s.path.as_deref())
    }
}

fn load_toml_file(path: &Path) -> Result<(Table, String), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = hex::encode(Sha256::digest(&bytes));

    let text = String::from_utf8(bytes).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("invalid UTF-8: {}", e),
    })?;
    let table = text.parse::<Table>().map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;
    Ok((table, digest))
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.min_path_depth == 0 {
        return Err(ConfigError::Invalid(
            "min_path_depth must be at least 1".to_string(),
        ));
    }
    if settings.max_path_depth < settings.min_path_depth {
        return Err(ConfigError::Invalid(format!(
            "max_path_depth ({}) is below min_path_depth ({})",
            settings.max_path_depth, settings.min_path_depth
        )));
    }
    if settings.max_path_depth > MAX_PATH_DEPTH_LIMIT {
        return Err(ConfigError::Invalid(format!(
            "max_path_depth must be at most {}",
            MAX_PATH_DEPTH_LIMIT
        )));
    }
    if let Some(name) = &settings.package_name {
        if name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "package_name must not be blank".to_string(),
            ));
        }
    }
    Ok(())
}
