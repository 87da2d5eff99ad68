//! Rendering of version drift reports.

use std::io::Write;

use crate::error::DriftResult;
use crate::format::style::{center_columns_after_first, truncate_left, Palette, Tone};
use crate::types::{DriftRecord, DriftReport, DriftStatus};

const MAX_PATH_WIDTH: usize = 100;

const CSV_HEADER: [&str; 10] = [
    "Section",
    "File Path",
    "Component Type",
    "Component Name",
    "Expected Version",
    "Actual Version",
    "Drift Status",
    "Severity",
    "Count",
    "Detail",
];

pub(crate) fn write_json(report: &DriftReport, w: &mut dyn Write) -> DriftResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(w, "{}", json)?;
    Ok(())
}

/// Row groups, in order: drift detail by path, errors, core histogram, provider histogram.
pub(crate) fn write_csv(report: &DriftReport, w: &mut dyn Write) -> DriftResult<()> {
    let mut csv = csv::Writer::from_writer(&mut *w);
    csv.write_record(CSV_HEADER)?;

    let mut records: Vec<&DriftRecord> = report.records.iter().collect();
    records.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    for record in records {
        csv.write_record([
            "drift",
            record.file_path.as_str(),
            "terraform",
            "terraform",
            record.expected_terraform.as_str(),
            record.actual_terraform.as_str(),
            record.terraform_status.as_str(),
            record.terraform_status.severity(),
            "",
            "",
        ])?;
        for provider in &record.providers {
            csv.write_record([
                "drift",
                record.file_path.as_str(),
                "provider",
                provider.name.as_str(),
                provider.expected_version.as_str(),
                provider.actual_version.as_str(),
                provider.status.as_str(),
                provider.status.severity(),
                "",
                provider.source.as_str(),
            ])?;
        }
    }

    let mut errors: Vec<_> = report.errors.iter().collect();
    errors.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    for error in errors {
        csv.write_record([
            "error",
            error.file_path.as_str(),
            "file",
            "",
            "",
            "",
            "parse-error",
            "error",
            "",
            error.message.as_str(),
        ])?;
    }

    for (version, count) in &report.summary.terraform_versions {
        let count = count.to_string();
        csv.write_record([
            "terraform_version",
            "",
            "terraform",
            "terraform",
            "",
            version.as_str(),
            "",
            "",
            count.as_str(),
            "",
        ])?;
    }

    for (provider, versions) in &report.summary.provider_versions {
        for (version, count) in versions {
            let count = count.to_string();
            csv.write_record([
                "provider_version",
                "",
                "provider",
                provider.as_str(),
                "",
                version.as_str(),
                "",
                "",
                count.as_str(),
                "",
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}

pub(crate) fn write_table(
    report: &DriftReport,
    palette: &Palette,
    w: &mut dyn Write,
) -> DriftResult<()> {
    let mut out = String::new();

    out.push_str(&palette.title("━━━ Terraform Version Drift Report ━━━"));
    out.push('\n');
    out.push_str(&format!("{} {}\n", palette.muted("Scanned:"), report.scan_root));
    out.push_str(&format!(
        "{} {}\n",
        palette.muted("Time:"),
        report.scanned_at.format("%Y-%m-%d %H:%M:%S")
    ));

    push_section(&mut out, palette, "Quick Summary", &summary_table(report, palette));

    if !report.summary.terraform_versions.is_empty() {
        push_section(
            &mut out,
            palette,
            "Terraform Versions",
            &terraform_versions_table(report, palette),
        );
    }

    if !report.summary.provider_versions.is_empty() {
        out.push('\n');
        out.push_str(&palette.heading("Provider Versions"));
        out.push('\n');
        for (provider, versions) in &report.summary.provider_versions {
            let mut table = palette.table_with_header(&[provider.as_str(), "Count"]);
            for (version, count) in versions {
                let shown = if version.is_empty() { "(none)" } else { version.as_str() };
                table.add_row(vec![shown.to_string(), format!("{} files", count)]);
            }
            center_columns_after_first(&mut table);
            out.push_str(&format!("{}\n", table));
        }
    }

    let drifted: Vec<&DriftRecord> = {
        let mut drifted: Vec<&DriftRecord> =
            report.records.iter().filter(|r| r.has_drift).collect();
        drifted.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        drifted
    };
    if !drifted.is_empty() {
        let issues: usize = drifted.iter().map(|r| drift_item_count(r)).sum();
        push_section(
            &mut out,
            palette,
            &format!("Files with Drift ({} files, {} issues)", drifted.len(), issues),
            &drift_details_table(&drifted, palette),
        );
    }

    if !report.errors.is_empty() {
        out.push('\n');
        out.push_str(&palette.heading(&format!("Files with Errors ({})", report.errors.len())));
        out.push('\n');
        for error in &report.errors {
            out.push_str(&format!(
                "  {} {}\n",
                palette.tone(Tone::Bad, &truncate_left(&error.file_path, MAX_PATH_WIDTH)),
                palette.muted(&error.message)
            ));
        }
    }

    let tone = if report.has_critical_drift() || report.summary.files_with_errors > 0 {
        Tone::Bad
    } else if report.has_drift() {
        Tone::Warn
    } else {
        Tone::Good
    };
    out.push_str(&format!("\n{}\n\n", palette.tone(tone, &report.summary_text())));

    w.write_all(out.as_bytes())?;
    Ok(())
}

fn push_section(out: &mut String, palette: &Palette, heading: &str, table: &comfy_table::Table) {
    out.push('\n');
    out.push_str(&palette.heading(heading));
    out.push('\n');
    out.push_str(&format!("{}\n", table));
}

fn summary_table(report: &DriftReport, palette: &Palette) -> comfy_table::Table {
    let summary = &report.summary;
    let mut rows: Vec<(&str, usize, Tone)> = vec![
        ("Total Files Scanned", report.total_files, Tone::Plain),
        ("Files in Sync", summary.files_in_sync, Tone::Good),
        ("Files with Drift", report.files_with_drift, Tone::Plain),
    ];
    if summary.files_with_major_drift > 0 {
        rows.push(("  ↳ Major Drift", summary.files_with_major_drift, Tone::Bad));
    }
    if summary.files_with_minor_drift > 0 {
        rows.push(("  ↳ Minor Drift", summary.files_with_minor_drift, Tone::Warn));
    }
    if summary.files_with_errors > 0 {
        rows.push(("Files with Errors", summary.files_with_errors, Tone::Bad));
    }

    let mut table = palette.table();
    for (label, value, tone) in rows {
        table.add_row(vec![palette.cell(label, Tone::Plain), palette.cell(value, tone)]);
    }
    center_columns_after_first(&mut table);
    table
}

fn terraform_versions_table(report: &DriftReport, palette: &Palette) -> comfy_table::Table {
    let expected = report
        .records
        .first()
        .map(|r| r.expected_terraform.as_str())
        .unwrap_or("");

    let mut table = palette.table_with_header(&["Status", "Version", "Count"]);
    for (version, count) in &report.summary.terraform_versions {
        let (status, tone) = if version == expected {
            ("OK", Tone::Good)
        } else {
            ("DRIFT", Tone::Warn)
        };
        table.add_row(vec![
            palette.cell(status, tone),
            palette.cell(version, Tone::Plain),
            palette.cell(format!("{} files", count), Tone::Plain),
        ]);
    }
    center_columns_after_first(&mut table);
    table
}

fn drift_details_table(records: &[&DriftRecord], palette: &Palette) -> comfy_table::Table {
    let mut table = palette.table_with_header(&["File", "Type", "Expected", "Actual", "Status"]);

    for record in records {
        let path = truncate_left(&record.file_path, MAX_PATH_WIDTH);
        let core_drifted = record.terraform_status != DriftStatus::InSync;

        if core_drifted {
            table.add_row(vec![
                palette.cell(&path, Tone::Plain),
                palette.cell("Terraform", Tone::Plain),
                palette.cell(&record.expected_terraform, Tone::Plain),
                palette.cell(&record.actual_terraform, Tone::Plain),
                status_cell(record.terraform_status, palette),
            ]);
        }

        for provider in record.providers.iter().filter(|p| p.status.is_drift()) {
            let shown_path = if core_drifted {
                format!("  ↳ {}", path)
            } else {
                path.clone()
            };
            let expected = if provider.expected_version.is_empty() {
                "(not configured)"
            } else {
                provider.expected_version.as_str()
            };
            table.add_row(vec![
                palette.cell(shown_path, Tone::Plain),
                palette.cell(format!("Provider: {}", provider.name), Tone::Plain),
                palette.cell(expected, Tone::Plain),
                palette.cell(&provider.actual_version, Tone::Plain),
                status_cell(provider.status, palette),
            ]);
        }
    }
    table
}

fn status_cell(status: DriftStatus, palette: &Palette) -> comfy_table::Cell {
    let tone = match status {
        DriftStatus::InSync => Tone::Good,
        DriftStatus::MinorDrift => Tone::Warn,
        DriftStatus::MajorDrift | DriftStatus::Missing => Tone::Bad,
        DriftStatus::NotManaged => Tone::Plain,
    };
    palette.cell(status.label(), tone)
}

fn drift_item_count(record: &DriftRecord) -> usize {
    let core = usize::from(record.terraform_status != DriftStatus::InSync);
    core + record.providers.iter().filter(|p| p.status.is_drift()).count()
}
