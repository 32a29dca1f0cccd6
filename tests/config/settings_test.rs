//! Integration tests for loading settings from disk.

use std::path::PathBuf;

use lkml::config::{Settings, SettingsError};
use lkml::dsl::{self, Document};
use lkml::enhancer;

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("lkml.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[parser]
model_file_suffixes = [".model.lkml", ".lkml.model"]

[enhancer]
enabled = true
command = "/opt/lookml/bin/lookml-json"
timeout_secs = 4
"#,
    );

    let settings = Settings::from_file(&path).unwrap();

    assert_eq!(settings.parser.model_file_suffixes.len(), 2);
    assert!(settings.parser.detect_by_content);
    assert_eq!(settings.enhancer.timeout_secs, 4);
    assert_eq!(settings.log.level, "warn");
    assert!(enhancer::from_settings(&settings.enhancer).is_ok());
}

#[test]
fn test_parser_settings_drive_classification() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[parser]
model_file_suffixes = [".lkml.model"]
detect_by_content = false
"#,
    );
    let options = Settings::from_file(&path).unwrap().parser.to_parse_options();

    let custom = dsl::parse_with_options(
        &Document::new("/p/shop.lkml.model", "connection: \"x\"\n"),
        &options,
    );
    assert_eq!(custom.model_name(), Some("shop"));

    let default_suffix = dsl::parse_with_options(
        &Document::new("/p/shop.model.lkml", "connection: \"x\"\n"),
        &options,
    );
    assert!(!default_suffix.is_model_file());
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}

#[test]
fn test_malformed_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[enhancer\nenabled = true\n");
    let err = Settings::from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}

#[test]
fn test_wrong_value_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[enhancer]\ntimeout_secs = \"ten\"\n");
    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::ParseError(_))
    ));
}

#[test]
fn test_enabled_enhancer_requires_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[enhancer]\nenabled = true\n");
    let err = Settings::from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidConfig(_)));
}

#[test]
fn test_command_env_expansion() {
    std::env::set_var("LKML_SETTINGS_TEST_HOME", "/home/analyst");
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "[enhancer]\nenabled = true\ncommand = \"${LKML_SETTINGS_TEST_HOME}/bin/lookml-json\"\n",
    );

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(
        settings.enhancer.resolved_command().unwrap(),
        PathBuf::from("/home/analyst/bin/lookml-json")
    );
    std::env::remove_var("LKML_SETTINGS_TEST_HOME");

    let path = write_config(
        &dir,
        "[enhancer]\nenabled = true\ncommand = \"${LKML_SETTINGS_TEST_UNSET_VAR}/x\"\n",
    );
    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::MissingEnvVar(_))
    ));
}

#[test]
fn test_load_honors_config_env_var() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[log]\nlevel = \"lkml=debug\"\n");

    std::env::set_var(lkml::config::CONFIG_ENV_VAR, &path);
    let loaded = Settings::load();
    std::env::remove_var(lkml::config::CONFIG_ENV_VAR);

    assert_eq!(loaded.unwrap().log.level, "lkml=debug");
}
