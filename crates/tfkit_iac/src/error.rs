//! Error types for IaC scaffolding.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur during IaC operations.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Invalid {kind} name '{value}': {reason}")]
    InvalidName {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error(
        "Existing {0} has no provider.aws.account_mapping; add environment mappings before running init"
    )]
    MissingAccountMapping(PathBuf),

    #[error("Account mapping is required for environment '{0}' in your configuration")]
    UnknownEnvironment(String),

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] tfkit_core::ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] tfkit_templates::TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
