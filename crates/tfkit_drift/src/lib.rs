//! # tfkit_drift
//!
//! Version drift detection and plan risk analysis for Terraform trees.
//!
//! ## Features
//!
//! - Extraction of `required_version` and `required_providers` from `.tf` files
//! - Constraint-aware comparison against a baseline (major/minor granularity)
//! - Plan JSON parsing with binary-plan detection
//! - Severity scoring of planned changes using a critical resource set
//! - Table, JSON and CSV rendering
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tfkit_drift::{Baseline, DriftAnalyzer, OutputFormat, ReportFormatter, VersionDetector};
//!
//! let records = VersionDetector::new("envs").scan().unwrap();
//! let baseline = Baseline::new("~> 1.13").with_provider("aws", "~> 6.0");
//! let report = DriftAnalyzer::new(baseline).analyze(Path::new("envs"), &records);
//!
//! ReportFormatter::new()
//!     .format_drift(&report, OutputFormat::Table, &mut std::io::stdout())
//!     .unwrap();
//! std::process::exit(report.exit_code());
//! ```

pub mod analyzer;
pub mod combined;
pub mod critical;
pub mod detector;
pub mod error;
pub mod format;
pub mod plan;
pub mod types;
pub mod version;

pub use analyzer::DriftAnalyzer;
pub use combined::{CombinedAnalysis, OverallStatus, VersionDriftSummary};
pub use critical::CriticalResources;
pub use detector::{parse_versions, VersionDetector, CANONICAL_VERSIONS_FILE};
pub use error::{DriftError, DriftResult};
pub use format::{OutputFormat, ReportFormatter, DEFAULT_TOP_N, DEFAULT_WIDTH};
pub use plan::{
    parse_plan_bytes, parse_plan_file, AnalyzedResource, ChangeAction, PlanAnalysis,
    PlanAnalyzer, PlanDocument, ResourceChange, Severity,
};
pub use types::{
    Baseline, DeclaredVersions, DriftRecord, DriftReport, DriftStatus, DriftSummary, FileError,
    ParseOutcome, ProviderDrift, ProviderVersion, VersionRecord,
};
pub use version::{compare_core, compare_provider};
