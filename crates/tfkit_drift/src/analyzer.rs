//! Drift classification and report aggregation.

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use crate::types::{
    Baseline, DeclaredVersions, DriftRecord, DriftReport, DriftSummary, FileError, ParseOutcome,
    ProviderDrift, VersionRecord,
};
use crate::version::{compare_core, compare_provider};

/// Compares extracted version records against a baseline.
#[derive(Debug, Clone)]
pub struct DriftAnalyzer {
    baseline: Baseline,
}

impl DriftAnalyzer {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Classify every record and aggregate the results into a report.
    pub fn analyze(&self, scan_root: &Path, records: &[VersionRecord]) -> DriftReport {
        let mut summary = DriftSummary {
            total_files: records.len(),
            ..Default::default()
        };
        let mut drift_records = Vec::new();
        let mut errors = Vec::new();

        for record in records {
            let declared = match &record.outcome {
                ParseOutcome::Declared(declared) => declared,
                ParseOutcome::Failed(message) => {
                    summary.files_with_errors += 1;
                    errors.push(FileError {
                        file_path: record.file_path.clone(),
                        message: message.clone(),
                    });
                    continue;
                }
            };

            record_distribution(&mut summary, declared);

            let drift = self.classify(&record.file_path, declared);
            if !drift.has_drift {
                summary.files_in_sync += 1;
            } else if drift.has_major_drift() {
                summary.files_with_major_drift += 1;
            } else {
                summary.files_with_minor_drift += 1;
            }
            drift_records.push(drift);
        }

        let files_with_drift = summary.files_with_minor_drift + summary.files_with_major_drift;

        info!(
            "Analyzed {} files: {} in sync, {} with drift, {} with errors",
            summary.total_files, summary.files_in_sync, files_with_drift, summary.files_with_errors
        );

        DriftReport {
            scanned_at: Utc::now(),
            scan_root: scan_root.display().to_string(),
            total_files: summary.total_files,
            files_with_drift,
            records: drift_records,
            errors,
            summary,
        }
    }

    /// Classify one parsed file against the baseline.
    pub fn classify(&self, file_path: &str, declared: &DeclaredVersions) -> DriftRecord {
        let expected_terraform = self.baseline.terraform_version.clone();
        let terraform_status = compare_core(&expected_terraform, &declared.terraform_version);

        let providers: Vec<ProviderDrift> = declared
            .providers
            .iter()
            .map(|(name, declared)| {
                let expected = self.baseline.provider_version(name);
                ProviderDrift {
                    name: name.clone(),
                    source: declared.source.clone(),
                    expected_version: expected.to_string(),
                    actual_version: declared.version.clone(),
                    status: compare_provider(expected, &declared.version),
                }
            })
            .collect();

        let has_drift =
            terraform_status.is_drift() || providers.iter().any(|p| p.status.is_drift());

        debug!(
            "{}: terraform {} ({}), drift: {}",
            file_path, declared.terraform_version, terraform_status, has_drift
        );

        DriftRecord {
            file_path: file_path.to_string(),
            expected_terraform,
            actual_terraform: declared.terraform_version.clone(),
            terraform_status,
            providers,
            has_drift,
        }
    }
}

fn record_distribution(summary: &mut DriftSummary, declared: &DeclaredVersions) {
    if !declared.terraform_version.is_empty() {
        *summary
            .terraform_versions
            .entry(declared.terraform_version.clone())
            .or_default() += 1;
    }

    for (name, provider) in &declared.providers {
        *summary
            .provider_versions
            .entry(name.clone())
            .or_default()
            .entry(provider.version.clone())
            .or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DriftStatus, ProviderVersion};

    fn declared(terraform: &str, providers: &[(&str, &str)]) -> DeclaredVersions {
        DeclaredVersions {
            terraform_version: terraform.to_string(),
            providers: providers
                .iter()
                .map(|(name, version)| {
                    (
                        name.to_string(),
                        ProviderVersion::new(format!("hashicorp/{}", name), *version),
                    )
                })
                .collect(),
        }
    }

    fn analyzer() -> DriftAnalyzer {
        DriftAnalyzer::new(Baseline::new("~> 1.16").with_provider("aws", "~> 6.0"))
    }

    #[test]
    fn test_minor_core_drift() {
        let records = vec![VersionRecord::declared("versions.tf", declared("~> 1.15", &[]))];
        let report = analyzer().analyze(Path::new("."), &records);

        assert_eq!(report.records[0].terraform_status, DriftStatus::MinorDrift);
        assert_eq!(report.summary.files_with_minor_drift, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_major_provider_drift_buckets_file_as_major() {
        let records = vec![VersionRecord::declared(
            "versions.tf",
            declared("~> 1.16", &[("aws", "~> 4.0")]),
        )];
        let report = analyzer().analyze(Path::new("."), &records);

        assert_eq!(report.records[0].terraform_status, DriftStatus::InSync);
        assert_eq!(report.records[0].providers[0].status, DriftStatus::MajorDrift);
        assert_eq!(report.summary.files_with_major_drift, 1);
        assert_eq!(report.summary.files_with_minor_drift, 0);
        assert!(report.has_critical_drift());
    }

    #[test]
    fn test_mixed_minor_and_major_counts_once_as_major() {
        let baseline = Baseline::new("~> 1.16")
            .with_provider("aws", "~> 6.0")
            .with_provider("random", "~> 3.6");
        let records = vec![VersionRecord::declared(
            "a/versions.tf",
            declared("~> 1.16", &[("aws", "~> 5.0"), ("random", "~> 3.5")]),
        )];
        let report = DriftAnalyzer::new(baseline).analyze(Path::new("."), &records);

        assert_eq!(report.files_with_drift, 1);
        assert_eq!(report.summary.files_with_major_drift, 1);
        assert_eq!(report.summary.files_with_minor_drift, 0);
    }

    #[test]
    fn test_not_managed_provider_is_not_drift() {
        let records = vec![VersionRecord::declared(
            "versions.tf",
            declared("~> 1.16", &[("aws", "~> 6.0"), ("random", "~> 3.6")]),
        )];
        let report = analyzer().analyze(Path::new("."), &records);
        let record = &report.records[0];

        assert_eq!(record.providers[1].status, DriftStatus::NotManaged);
        assert!(!record.has_drift);
        assert_eq!(report.summary.files_in_sync, 1);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_missing_core_version_is_drift() {
        let records = vec![VersionRecord::declared(
            "versions.tf",
            declared("", &[("aws", "~> 6.0")]),
        )];
        let report = analyzer().analyze(Path::new("."), &records);

        assert_eq!(report.records[0].terraform_status, DriftStatus::Missing);
        assert!(report.records[0].has_drift);
        assert_eq!(report.summary.files_with_minor_drift, 1);
    }

    #[test]
    fn test_parse_errors_are_counted_not_recorded() {
        let records = vec![
            VersionRecord::declared("ok/versions.tf", declared("~> 1.16", &[])),
            VersionRecord::failed("bad/main.tf", "unexpected token"),
        ];
        let report = analyzer().analyze(Path::new("."), &records);

        assert_eq!(report.total_files, 2);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].file_path, "bad/main.tf");
        assert_eq!(report.summary.files_with_errors, 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_histograms() {
        let records = vec![
            VersionRecord::declared("a/versions.tf", declared("~> 1.16", &[("aws", "~> 6.0")])),
            VersionRecord::declared("b/versions.tf", declared("~> 1.16", &[("aws", "~> 5.0")])),
            VersionRecord::declared("c/versions.tf", declared("", &[("aws", "")])),
        ];
        let report = analyzer().analyze(Path::new("."), &records);

        assert_eq!(report.summary.terraform_versions.len(), 1);
        assert_eq!(report.summary.terraform_versions["~> 1.16"], 2);
        let aws = &report.summary.provider_versions["aws"];
        assert_eq!(aws["~> 6.0"], 1);
        assert_eq!(aws["~> 5.0"], 1);
        assert_eq!(aws[""], 1);
    }

    #[test]
    fn test_empty_input() {
        let report = analyzer().analyze(Path::new("."), &[]);
        assert_eq!(report.total_files, 0);
        assert_eq!(report.summary_text(), "All 0 files are in sync");
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_bucket_totals_hold() {
        let records = vec![
            VersionRecord::declared("a/versions.tf", declared("~> 1.16", &[("aws", "~> 6.0")])),
            VersionRecord::declared("b/versions.tf", declared("~> 1.15", &[("aws", "~> 6.0")])),
            VersionRecord::declared("c/versions.tf", declared("~> 0.14", &[])),
            VersionRecord::failed("d/main.tf", "bad"),
        ];
        let report = analyzer().analyze(Path::new("."), &records);
        let s = &report.summary;

        assert_eq!(
            report.total_files,
            s.files_in_sync
                + s.files_with_minor_drift
                + s.files_with_major_drift
                + s.files_with_errors
        );
        assert_eq!(
            report.files_with_drift,
            s.files_with_minor_drift + s.files_with_major_drift
        );
    }
}
