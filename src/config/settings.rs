//! TOML-based configuration for lkml.
//!
//! Supports a config file (lkml.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [parser]
//! model_file_suffixes = [".model.lkml", ".model.lookml"]
//! detect_by_content = true
//!
//! [enhancer]
//! enabled = true
//! command = "${HOME}/bin/lookml-json"
//! args = ["--strict"]
//! timeout_secs = 10
//!
//! [log]
//! level = "warn"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dsl::classify::DEFAULT_MODEL_FILE_SUFFIXES;
use crate::dsl::ParseOptions;
use crate::enhancer::DEFAULT_TIMEOUT_SECS;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "LKML_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lkml.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Document classification.
    pub parser: ParserSettings,

    /// External semantic enhancer.
    pub enhancer: EnhancerSettings,

    /// Logging.
    pub log: LogSettings,
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserSettings {
    /// File name suffixes that mark a model file.
    pub model_file_suffixes: Vec<String>,

    /// Treat documents with top-level `connection:`/`include:` as model files.
    pub detect_by_content: bool,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            model_file_suffixes: DEFAULT_MODEL_FILE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            detect_by_content: true,
        }
    }
}

impl ParserSettings {
    pub fn to_parse_options(&self) -> ParseOptions {
        ParseOptions {
            model_file_suffixes: self.model_file_suffixes.clone(),
            detect_by_content: self.detect_by_content,
        }
    }
}

/// Semantic enhancer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnhancerSettings {
    /// Run the enhancer after each structural parse.
    pub enabled: bool,

    /// Path to the enhancer executable (supports ${ENV_VAR} expansion).
    pub command: Option<String>,

    /// Arguments passed before the document path.
    pub args: Vec<String>,

    /// Seconds allowed per run.
    pub timeout_secs: u64,
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            command: None,
            args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EnhancerSettings {
    /// Get the enhancer command with environment variables expanded.
    pub fn resolved_command(&self) -> Result<PathBuf, SettingsError> {
        let command = self
            .command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                SettingsError::InvalidConfig("enhancer.command is required when enabled".into())
            })?;
        Ok(PathBuf::from(expand_env_vars(command)?))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LKML_CONFIG`
    /// 2. `./lkml.toml`
    /// 3. `~/.config/lkml/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lkml").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.parser.model_file_suffixes.iter().any(|s| s.is_empty()) {
            return Err(SettingsError::InvalidConfig(
                "parser.model_file_suffixes must not contain empty entries".into(),
            ));
        }
        if self.enhancer.timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "enhancer.timeout_secs must be positive".into(),
            ));
        }
        if self.enhancer.enabled {
            self.enhancer.resolved_command()?;
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
