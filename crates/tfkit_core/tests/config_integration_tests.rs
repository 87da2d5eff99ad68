//! Integration tests for configuration loading.

use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use tfkit_core::{Config, ConfigError, ConfigOverrides, CONFIG_FILE_NAME, DEFAULT_BUCKET_NAME};

#[test]
fn test_load_without_file_uses_defaults() {
    let temp = tempdir().unwrap();

    let config = Config::load(None, temp.path(), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.terraform_version, "~> 1.13");
    assert_eq!(config.bucket_name(), DEFAULT_BUCKET_NAME);
    assert!(config.environments().is_empty());
}

#[test]
fn test_load_discovers_file_in_cwd() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "terraform_version: '~> 1.10'\nprovider:\n  aws:\n    account_mapping:\n      dev: '123456789012'\n",
    )
    .unwrap();

    let config = Config::load(None, temp.path(), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.terraform_version, "~> 1.10");
    assert_eq!(config.account_id("dev"), Some("123456789012"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_explicit_path_wins_over_cwd() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), "terraform_version: '1.0'\n").unwrap();
    let explicit = temp.path().join("other.yaml");
    fs::write(&explicit, "terraform_version: '2.0'\n").unwrap();

    let config = Config::load(Some(&explicit), temp.path(), &ConfigOverrides::default()).unwrap();

    assert_eq!(config.terraform_version, "2.0");
}

#[test]
fn test_missing_explicit_path_is_error() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("nope.yaml");

    let err = Config::load(Some(&missing), temp.path(), &ConfigOverrides::default()).unwrap_err();

    assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
}

#[test]
fn test_malformed_file_reports_path() {
    let temp = tempdir().unwrap();
    let path = temp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "provider: [oops\n").unwrap();

    let err = Config::load(None, temp.path(), &ConfigOverrides::default()).unwrap_err();

    match err {
        ConfigError::Parse { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_overrides_applied_on_load() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "backend:\n  s3:\n    bucket_name: file-bucket\n",
    )
    .unwrap();

    let overrides = ConfigOverrides {
        s3_bucket_name: Some("flag-bucket".to_string()),
        templates_dir: Some(PathBuf::from("tpl")),
        ..Default::default()
    };
    let config = Config::load(None, temp.path(), &overrides).unwrap();

    assert_eq!(config.bucket_name(), "flag-bucket");
    assert_eq!(config.templates_dir, Some(PathBuf::from("tpl")));
}

#[test]
fn test_starter_yaml_loads_back() {
    let temp = tempdir().unwrap();
    let path = temp.path().join(CONFIG_FILE_NAME);
    fs::write(&path, Config::starter_yaml().unwrap()).unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.environments(), vec!["dev", "prd", "stg"]);
    assert_eq!(config.default_tags().get("managed_by").unwrap(), "terraform");
    assert_eq!(config.baseline().provider_version("aws"), "~> 6.0");
}
