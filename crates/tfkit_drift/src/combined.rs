//! Combined version drift and plan analysis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::PlanAnalysis;
use crate::types::DriftReport;

/// Overall health of a combined run, ordered least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    #[default]
    Clean,
    Warning,
    Critical,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Clean => "clean",
            OverallStatus::Warning => "warning",
            OverallStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condensed view of a drift report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDriftSummary {
    pub total_files: usize,
    pub files_with_drift: usize,
    pub minor_drift: usize,
    pub major_drift: usize,
    pub files_with_errors: usize,
    pub has_drift: bool,
}

impl From<&DriftReport> for VersionDriftSummary {
    fn from(report: &DriftReport) -> Self {
        Self {
            total_files: report.total_files,
            files_with_drift: report.files_with_drift,
            minor_drift: report.summary.files_with_minor_drift,
            major_drift: report.summary.files_with_major_drift,
            files_with_errors: report.summary.files_with_errors,
            has_drift: report.has_drift(),
        }
    }
}

/// Results of running both analyses. Status only ever escalates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_drift: Option<VersionDriftSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_analysis: Option<PlanAnalysis>,
    pub overall_status: OverallStatus,
    pub has_issues: bool,
    #[serde(skip)]
    exit_code: i32,
}

impl CombinedAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a completed drift scan.
    pub fn record_versions(&mut self, report: &DriftReport) {
        let summary = VersionDriftSummary::from(report);
        if summary.has_drift {
            self.escalate(if summary.major_drift > 0 {
                OverallStatus::Critical
            } else {
                OverallStatus::Warning
            });
        }
        self.exit_code = self.exit_code.max(report.exit_code());
        self.version_drift = Some(summary);
    }

    /// Fold in a completed plan analysis.
    pub fn record_plan(&mut self, analysis: PlanAnalysis) {
        if analysis.has_changes {
            self.escalate(if analysis.has_critical_changes() {
                OverallStatus::Critical
            } else {
                OverallStatus::Warning
            });
        }
        self.exit_code = self.exit_code.max(analysis.exit_code());
        self.plan_analysis = Some(analysis);
    }

    /// Mark a sub-analysis that could not run.
    pub fn record_failure(&mut self) {
        self.escalate(OverallStatus::Critical);
        self.exit_code = self.exit_code.max(1);
    }

    /// Highest exit code of the recorded analyses.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    fn escalate(&mut self, status: OverallStatus) {
        self.has_issues = true;
        self.overall_status = self.overall_status.max(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriftSummary;
    use chrono::Utc;

    fn report(minor: usize, major: usize) -> DriftReport {
        DriftReport {
            scanned_at: Utc::now(),
            scan_root: ".".to_string(),
            total_files: 3,
            files_with_drift: minor + major,
            records: Vec::new(),
            errors: Vec::new(),
            summary: DriftSummary {
                total_files: 3,
                files_in_sync: 3 - minor - major,
                files_with_minor_drift: minor,
                files_with_major_drift: major,
                ..Default::default()
            },
        }
    }

    fn plan(additions: usize, deletions: usize) -> PlanAnalysis {
        PlanAnalysis {
            total_changes: additions + deletions,
            additions,
            deletions,
            has_changes: additions + deletions > 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_run() {
        let mut combined = CombinedAnalysis::new();
        combined.record_versions(&report(0, 0));
        combined.record_plan(plan(0, 0));

        assert_eq!(combined.overall_status, OverallStatus::Clean);
        assert!(!combined.has_issues);
        assert_eq!(combined.exit_code(), 0);
    }

    #[test]
    fn test_warning_never_downgrades_critical() {
        let mut combined = CombinedAnalysis::new();
        combined.record_versions(&report(0, 1));
        combined.record_plan(plan(2, 0));

        assert_eq!(combined.overall_status, OverallStatus::Critical);
        assert_eq!(combined.exit_code(), 1);
    }

    #[test]
    fn test_plan_deletion_is_critical_with_exit_two() {
        let mut combined = CombinedAnalysis::new();
        combined.record_versions(&report(1, 0));
        combined.record_plan(plan(0, 1));

        assert_eq!(combined.overall_status, OverallStatus::Critical);
        assert_eq!(combined.exit_code(), 2);
    }

    #[test]
    fn test_failure_marks_critical() {
        let mut combined = CombinedAnalysis::new();
        combined.record_failure();

        assert_eq!(combined.overall_status, OverallStatus::Critical);
        assert!(combined.has_issues);
        assert_eq!(combined.exit_code(), 1);
    }

    #[test]
    fn test_json_omits_skipped_sections() {
        let mut combined = CombinedAnalysis::new();
        combined.record_versions(&report(1, 0));

        let json = serde_json::to_value(&combined).unwrap();
        assert!(json.get("plan_analysis").is_none());
        assert_eq!(json["overall_status"], "warning");
        assert_eq!(json["version_drift"]["minor_drift"], 1);
    }
}
