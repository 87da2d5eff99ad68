//! Version records, drift classifications and the aggregated drift report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source and version constraint declared for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVersion {
    pub source: String,
    pub version: String,
}

impl ProviderVersion {
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
        }
    }
}

/// Constraints declared in a file's `terraform` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredVersions {
    pub terraform_version: String,
    pub providers: BTreeMap<String, ProviderVersion>,
}

impl DeclaredVersions {
    /// True when neither a core constraint nor any provider was declared.
    pub fn is_empty(&self) -> bool {
        self.terraform_version.is_empty() && self.providers.is_empty()
    }
}

/// Result of parsing one file. A file either declares versions or fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Declared(DeclaredVersions),
    Failed(String),
}

/// One scanned file and what it declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Path relative to the scan root, always `/`-separated.
    pub file_path: String,
    pub outcome: ParseOutcome,
}

impl VersionRecord {
    pub fn declared(file_path: impl Into<String>, versions: DeclaredVersions) -> Self {
        Self {
            file_path: file_path.into(),
            outcome: ParseOutcome::Declared(versions),
        }
    }

    pub fn failed(file_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            outcome: ParseOutcome::Failed(message.into()),
        }
    }

    pub fn parse_error(&self) -> Option<&str> {
        match &self.outcome {
            ParseOutcome::Failed(message) => Some(message),
            ParseOutcome::Declared(_) => None,
        }
    }
}

/// Classification of one (expected, actual) constraint pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriftStatus {
    InSync,
    MinorDrift,
    MajorDrift,
    Missing,
    NotManaged,
}

impl DriftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftStatus::InSync => "in-sync",
            DriftStatus::MinorDrift => "minor-drift",
            DriftStatus::MajorDrift => "major-drift",
            DriftStatus::Missing => "missing",
            DriftStatus::NotManaged => "not-managed",
        }
    }

    /// Whether this status counts toward a record's drift.
    pub fn is_drift(&self) -> bool {
        !matches!(self, DriftStatus::InSync | DriftStatus::NotManaged)
    }

    /// Severity label used in row-oriented output.
    pub fn severity(&self) -> &'static str {
        match self {
            DriftStatus::MajorDrift => "major",
            DriftStatus::MinorDrift => "minor",
            DriftStatus::InSync | DriftStatus::Missing | DriftStatus::NotManaged => "none",
        }
    }

    /// Short label for table output.
    pub fn label(&self) -> &'static str {
        match self {
            DriftStatus::InSync => "OK",
            DriftStatus::MinorDrift => "minor drift",
            DriftStatus::MajorDrift => "major drift",
            DriftStatus::Missing => "missing",
            DriftStatus::NotManaged => "not managed",
        }
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drift of a single provider inside one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDrift {
    pub name: String,
    pub source: String,
    pub expected_version: String,
    pub actual_version: String,
    pub status: DriftStatus,
}

/// Drift classification for one successfully parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftRecord {
    pub file_path: String,
    pub expected_terraform: String,
    pub actual_terraform: String,
    pub terraform_status: DriftStatus,
    /// Ordered by provider name.
    pub providers: Vec<ProviderDrift>,
    pub has_drift: bool,
}

impl DriftRecord {
    /// True when the core constraint or any provider is a major drift.
    pub fn has_major_drift(&self) -> bool {
        self.terraform_status == DriftStatus::MajorDrift
            || self
                .providers
                .iter()
                .any(|p| p.status == DriftStatus::MajorDrift)
    }
}

/// A file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileError {
    pub file_path: String,
    pub message: String,
}

/// Per-bucket file counts and version distributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSummary {
    pub total_files: usize,
    pub files_in_sync: usize,
    pub files_with_minor_drift: usize,
    pub files_with_major_drift: usize,
    pub files_with_errors: usize,
    /// Core constraint -> number of files declaring it.
    pub terraform_versions: BTreeMap<String, usize>,
    /// Provider name -> constraint -> number of files declaring it.
    pub provider_versions: BTreeMap<String, BTreeMap<String, usize>>,
}

/// Result of one drift scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub scanned_at: DateTime<Utc>,
    pub scan_root: String,
    pub total_files: usize,
    pub files_with_drift: usize,
    pub records: Vec<DriftRecord>,
    #[serde(default)]
    pub errors: Vec<FileError>,
    pub summary: DriftSummary,
}

impl DriftReport {
    /// One-line human summary of the scan.
    pub fn summary_text(&self) -> String {
        if self.files_with_drift == 0 {
            return format!("All {} files are in sync", self.total_files);
        }

        let mut text = format!(
            "{} of {} files have drift (minor: {}, major: {})",
            self.files_with_drift,
            self.total_files,
            self.summary.files_with_minor_drift,
            self.summary.files_with_major_drift
        );
        if self.summary.files_with_errors > 0 {
            text.push_str(&format!(
                ", {} files with errors",
                self.summary.files_with_errors
            ));
        }
        text
    }

    /// 2 when any file failed to parse, 1 when any file drifted, else 0.
    pub fn exit_code(&self) -> i32 {
        if self.summary.files_with_errors > 0 {
            2
        } else if self.files_with_drift > 0 {
            1
        } else {
            0
        }
    }

    pub fn has_critical_drift(&self) -> bool {
        self.summary.files_with_major_drift > 0
    }

    pub fn has_drift(&self) -> bool {
        self.files_with_drift > 0
    }
}

/// Expected versions that scanned files are compared against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub terraform_version: String,
    /// Provider name -> expected constraint. Absent providers are not managed.
    pub providers: BTreeMap<String, String>,
}

impl Baseline {
    pub fn new(terraform_version: impl Into<String>) -> Self {
        Self {
            terraform_version: terraform_version.into(),
            providers: BTreeMap::new(),
        }
    }

    pub fn with_provider(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.providers.insert(name.into(), version.into());
        self
    }

    /// Expected constraint for a provider, empty when unmanaged.
    pub fn provider_version(&self, name: &str) -> &str {
        self.providers.get(name).map(String::as_str).unwrap_or("")
    }
}
