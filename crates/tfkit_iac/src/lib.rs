//! # tfkit_iac
//!
//! Terraform project scaffolding for tfkit.
//!
//! ## Features
//!
//! - `init`: root tooling files, starter `.tfkit.yaml`, per-environment directories
//! - `generate`: application directories rendered from templates
//! - Optional GitHub Actions workflows per application
//! - Metadata records that keep `versions.tf` and `backend.tf` in step with configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tfkit_core::{Config, ConfigOverrides};
//! use tfkit_iac::{AppGenerator, ProjectInitializer};
//!
//! let report = ProjectInitializer::new("infra").init().unwrap();
//! println!("created {} files", report.created.len());
//!
//! let config = Config::load(None, Path::new("infra"), &ConfigOverrides::default()).unwrap();
//! AppGenerator::new(&config, "infra")
//!     .generate("dev", "eu-central-1", "payments")
//!     .unwrap();
//! ```

pub mod error;
pub mod metadata;
pub mod region;
pub mod scaffold;

pub use error::{IacError, IacResult};
pub use metadata::{RecordKind, RecordState, SCHEMA_KEY, SCHEMA_VERSION};
pub use region::short_region;
pub use scaffold::{
    terraform_version_pin, AppGenerator, FileUpdate, InitPlan, ProjectInitializer,
    ScaffoldReport, DEFAULT_ENVIRONMENTS, DEFAULT_REGION, DEFAULT_TERRAFORM_PIN, ENVS_DIR,
    WORKFLOWS_DIR,
};
