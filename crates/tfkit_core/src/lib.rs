//! # tfkit_core
//!
//! Configuration for tfkit.
//!
//! ## Features
//!
//! - `.tfkit.yaml` discovery with explicit-path precedence
//! - Command-line overrides layered over file values
//! - Defaults for Terraform, AWS provider and backend settings
//! - Drift baseline and critical resource settings derived from configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tfkit_core::{Config, ConfigOverrides};
//!
//! let config = Config::load(None, Path::new("."), &ConfigOverrides::default()).unwrap();
//! config.validate().unwrap();
//! println!("baseline: {:?}", config.baseline());
//! ```

pub mod config;
pub mod error;

pub use config::{
    BackendConfig, Config, ConfigOverrides, DriftConfig, DriftSettings, GenerateConfig,
    GithubWorkflows, ProviderConfig, S3Backend, AWS, CONFIG_FILE_NAME,
    DEFAULT_AWS_PROVIDER_VERSION, DEFAULT_BUCKET_NAME, DEFAULT_TEMPLATE_EXTENSION,
    DEFAULT_TERRAFORM_VERSION,
};
pub use error::{ConfigError, ConfigResult};
