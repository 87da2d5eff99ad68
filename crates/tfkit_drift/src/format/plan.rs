//! Rendering of plan analyses.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::DriftResult;
use crate::format::style::{center_columns_after_first, Palette, Tone};
use crate::plan::{AnalyzedResource, PlanAnalysis, Severity, ROOT_MODULE};

pub(crate) fn write_json(analysis: &PlanAnalysis, w: &mut dyn Write) -> DriftResult<()> {
    let json = serde_json::to_string_pretty(analysis)?;
    writeln!(w, "{}", json)?;
    Ok(())
}

/// Comment metadata lines followed by one row per analyzed resource, in analysis order.
pub(crate) fn write_csv(analysis: &PlanAnalysis, w: &mut dyn Write) -> DriftResult<()> {
    writeln!(w, "# Terraform Plan Analysis")?;
    writeln!(w, "# Terraform Version: {}", version_or_unknown(analysis))?;
    writeln!(w, "# Total Changes: {}", analysis.total_changes)?;
    writeln!(
        w,
        "# Additions: {}, Modifications: {}, Deletions: {}, Replacements: {}",
        analysis.additions, analysis.modifications, analysis.deletions, analysis.replacements
    )?;
    writeln!(w, "#")?;

    let mut csv = csv::Writer::from_writer(&mut *w);
    csv.write_record(["Address", "Type", "Name", "Provider", "Action", "Severity", "Module"])?;
    for resource in &analysis.resource_changes {
        csv.write_record([
            resource.address.as_str(),
            resource.kind.as_str(),
            resource.name.as_str(),
            resource.provider.as_str(),
            resource.action.as_str(),
            resource.severity.as_str(),
            resource.module_address.as_str(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub(crate) fn write_table(
    analysis: &PlanAnalysis,
    palette: &Palette,
    top_n: usize,
    w: &mut dyn Write,
) -> DriftResult<()> {
    let mut out = String::new();

    out.push_str(&palette.title("━━━ Terraform Plan Analysis ━━━"));
    out.push('\n');
    out.push_str(&format!(
        "{} {}\n",
        palette.muted("Terraform Version:"),
        version_or_unknown(analysis)
    ));

    let mut summary = palette.table();
    for (label, value, tone) in [
        ("Total Changes", analysis.total_changes, Tone::Plain),
        ("Additions", analysis.additions, Tone::Good),
        ("Modifications", analysis.modifications, Tone::Warn),
        ("Deletions", analysis.deletions, Tone::Bad),
        ("Replacements", analysis.replacements, Tone::Bad),
    ] {
        let tone = if value == 0 { Tone::Plain } else { tone };
        summary.add_row(vec![palette.cell(label, Tone::Plain), palette.cell(value, tone)]);
    }
    center_columns_after_first(&mut summary);
    push_block(&mut out, palette, "Summary", &summary.to_string());

    if analysis.resource_changes.is_empty() {
        out.push_str(&format!("\n{}\n\n", palette.tone(Tone::Good, "No changes detected")));
        w.write_all(out.as_bytes())?;
        return Ok(());
    }

    if !analysis.by_type.is_empty() {
        let rows = ranked(&analysis.by_type, top_n);
        push_block(&mut out, palette, "Changes by Resource Type", &group_table(&rows, palette));
    }

    // Only worth showing when something outside the root module changed.
    if analysis.by_module.len() > 1 {
        let rows = ranked(&analysis.by_module, top_n);
        push_block(&mut out, palette, "Changes by Module", &group_table(&rows, palette));
    }

    if !analysis.by_severity.is_empty() {
        let rows: Vec<(&str, usize)> = Severity::ALL
            .iter()
            .filter_map(|s| {
                analysis
                    .by_severity
                    .get(s.as_str())
                    .map(|count| (s.as_str(), *count))
            })
            .collect();
        push_block(&mut out, palette, "Changes by Severity", &group_table(&rows, palette));
    }

    if !analysis.by_action.is_empty() {
        let rows = ranked(&analysis.by_action, 0);
        push_block(&mut out, palette, "Changes by Action", &group_table(&rows, palette));
    }

    out.push('\n');
    out.push_str(&palette.heading("Resource Changes (detailed)"));
    out.push('\n');
    out.push_str(&palette.muted(&format!(
        "Showing {} resources",
        analysis.resource_changes.len()
    )));
    out.push('\n');

    let mut table = palette.table_with_header(&["Resource", "Type", "Action", "Severity"]);
    for resource in by_severity(&analysis.resource_changes) {
        table.add_row(vec![
            palette.cell(display_name(resource), Tone::Plain),
            palette.cell(&resource.kind, Tone::Plain),
            palette.cell(&resource.action, action_tone(&resource.action)),
            palette.cell(resource.severity, severity_tone(resource.severity)),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    w.write_all(out.as_bytes())?;
    Ok(())
}

/// Resources stably sorted worst severity first.
pub fn by_severity(resources: &[AnalyzedResource]) -> Vec<&AnalyzedResource> {
    let mut sorted: Vec<&AnalyzedResource> = resources.iter().collect();
    sorted.sort_by_key(|r| r.severity);
    sorted
}

/// Groups ordered by count descending then name, limited to `top_n` when non-zero.
fn ranked(groups: &BTreeMap<String, usize>, top_n: usize) -> Vec<(&str, usize)> {
    let mut rows: Vec<(&str, usize)> = groups.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if top_n > 0 {
        rows.truncate(top_n);
    }
    rows
}

fn group_table(rows: &[(&str, usize)], palette: &Palette) -> String {
    let mut table = palette.table_with_header(&["Name", "Count"]);
    for (name, count) in rows {
        table.add_row(vec![name.to_string(), count.to_string()]);
    }
    center_columns_after_first(&mut table);
    table.to_string()
}

fn push_block(out: &mut String, palette: &Palette, heading: &str, body: &str) {
    out.push('\n');
    out.push_str(&palette.heading(heading));
    out.push('\n');
    out.push_str(body);
    out.push('\n');
}

fn version_or_unknown(analysis: &PlanAnalysis) -> &str {
    if analysis.terraform_version.is_empty() {
        "unknown"
    } else {
        &analysis.terraform_version
    }
}

/// Resource name prefixed with a compact module path.
///
/// `module.vpc.module.subnets` becomes `vpc.subnets`; deeper paths keep only
/// the first and last module names.
fn display_name(resource: &AnalyzedResource) -> String {
    if resource.module_address.is_empty() {
        return resource.name.clone();
    }
    format!("{}.{}", compact_module(&resource.module_address), resource.name)
}

pub(crate) fn compact_module(address: &str) -> String {
    let parts: Vec<&str> = address
        .split('.')
        .filter(|p| !p.is_empty() && *p != "module")
        .collect();
    match parts.as_slice() {
        [] => ROOT_MODULE.to_string(),
        [first, .., last] if parts.len() > 2 => format!("{}...{}", first, last),
        _ => parts.join("."),
    }
}

fn action_tone(action: &str) -> Tone {
    match action {
        "create" => Tone::Good,
        "delete" => Tone::Bad,
        "replace" => Tone::Warn,
        "update" | "read" => Tone::Info,
        _ => Tone::Plain,
    }
}

fn severity_tone(severity: Severity) -> Tone {
    match severity {
        Severity::Critical | Severity::High => Tone::Bad,
        Severity::Medium => Tone::Warn,
        Severity::Low => Tone::Good,
    }
}
