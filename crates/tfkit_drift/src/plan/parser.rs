//! Plan JSON parsing with binary-plan detection.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{DriftError, DriftResult};
use crate::plan::models::PlanDocument;

const HEADER_PEEK_BYTES: usize = 128;
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Read and parse a plan JSON file.
pub fn parse_plan_file(path: &Path) -> DriftResult<PlanDocument> {
    debug!("Reading plan file {:?}", path);

    let bytes = fs::read(path).map_err(|source| DriftError::PlanRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_plan_bytes(&bytes, &path.display().to_string())
}

/// Parse plan JSON from memory. `source_name` is used in the binary-format hint.
pub fn parse_plan_bytes(bytes: &[u8], source_name: &str) -> DriftResult<PlanDocument> {
    if looks_binary(bytes) {
        return Err(DriftError::BinaryPlan(source_name.to_string()));
    }

    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let plan: PlanDocument = serde_json::from_slice(body).map_err(|e| {
        DriftError::InvalidPlanFormat(format!(
            "{}. Ensure the file is valid Terraform plan JSON",
            e
        ))
    })?;

    match plan.format_version.as_deref() {
        Some(version) if !version.is_empty() => {
            debug!(
                "Parsed plan (format {}) with {} resource changes",
                version,
                plan.resource_changes.len()
            );
            Ok(plan)
        }
        _ => Err(DriftError::NotAPlanFile),
    }
}

/// True when the first non-whitespace byte of the header is not `{`.
///
/// Only the first 128 bytes are inspected, after an optional UTF-8 BOM.
/// Empty or all-whitespace input is left for the JSON parser to reject.
fn looks_binary(bytes: &[u8]) -> bool {
    let header = &bytes[..bytes.len().min(HEADER_PEEK_BYTES)];
    let header = header.strip_prefix(UTF8_BOM).unwrap_or(header);

    header
        .iter()
        .find(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
        .is_some_and(|b| *b != b'{')
}
