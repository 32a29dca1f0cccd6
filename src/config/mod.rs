//! Configuration module for lkml.
//!
//! Handles the config file, environment variables, and settings.

mod settings;

pub use settings::{
    expand_env_vars, EnhancerSettings, LogSettings, ParserSettings, Settings, SettingsError,
    CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
