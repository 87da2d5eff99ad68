//! Error types for drift analysis.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for drift operations.
pub type DriftResult<T> = Result<T, DriftError>;

/// Errors that can occur during drift and plan analysis.
#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Failed to walk {path:?}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read plan file {path:?}: {source}")]
    PlanRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "plan file appears to be in binary format; convert it first with: terraform show -json {0} > plan.json"
    )]
    BinaryPlan(String),

    #[error("invalid plan format: {0}")]
    InvalidPlanFormat(String),

    #[error(
        "invalid plan file: missing format_version. This may not be a Terraform plan JSON file"
    )]
    NotAPlanFile,

    #[error("unsupported output format: {0} (expected one of: table, json, csv)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
