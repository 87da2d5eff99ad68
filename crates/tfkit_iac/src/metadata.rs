//! Metadata records embedded in generated Terraform files.
//!
//! A record is a single comment line such as
//!
//! ```text
//! ## tfkit-metadata: {"aws_provider_ver":"~> 6.0","schema":"1","tf_ver":"~> 1.13"}
//! ```
//!
//! holding a flat string map. The reserved `schema` key versions the record;
//! files written before it existed carry no `schema` key and are read as
//! version 1. Anything that cannot be read with certainty means the file is
//! regenerated.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::IacResult;

/// Reserved key carrying the record schema version.
pub const SCHEMA_KEY: &str = "schema";

/// Schema version written by this release.
pub const SCHEMA_VERSION: &str = "1";

pub const TF_VERSION_KEY: &str = "tf_ver";
pub const AWS_PROVIDER_VERSION_KEY: &str = "aws_provider_ver";
pub const BUCKET_KEY: &str = "bucket";

/// Which record a line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Metadata,
    Tags,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Metadata => "metadata",
            RecordKind::Tags => "tags",
        }
    }

    /// Line prefix, without the trailing space.
    pub fn marker(&self) -> String {
        format!("## tfkit-{}:", self.as_str())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking for a record in file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    /// Values without the `schema` key.
    Found(BTreeMap<String, String>),
    Missing,
    Corrupt(String),
    SchemaMismatch(String),
}

impl RecordState {
    /// True when the file must be regenerated regardless of configuration.
    pub fn forces_regeneration(&self) -> bool {
        !matches!(self, RecordState::Found(_))
    }

    /// Human readable reason for regeneration, if any.
    pub fn regeneration_reason(&self, kind: RecordKind) -> Option<String> {
        match self {
            RecordState::Found(_) => None,
            RecordState::Missing => Some(format!("{} record missing", kind)),
            RecordState::Corrupt(err) => Some(format!("{} record unreadable ({})", kind, err)),
            RecordState::SchemaMismatch(found) => Some(format!(
                "{} record schema {} unsupported (expected {})",
                kind, found, SCHEMA_VERSION
            )),
        }
    }
}

/// Serialize values plus the current schema version as compact JSON.
pub fn encode(values: &BTreeMap<String, String>) -> IacResult<String> {
    let mut record = values.clone();
    record.insert(SCHEMA_KEY.to_string(), SCHEMA_VERSION.to_string());
    Ok(serde_json::to_string(&record)?)
}

/// Find and decode the first record of `kind` in `content`.
pub fn extract(content: &str, kind: RecordKind) -> RecordState {
    let marker = kind.marker();
    let Some(payload) = content
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(marker.as_str()))
    else {
        return RecordState::Missing;
    };

    let mut values: BTreeMap<String, String> = match serde_json::from_str(payload.trim()) {
        Ok(values) => values,
        Err(err) => return RecordState::Corrupt(err.to_string()),
    };

    match values.remove(SCHEMA_KEY) {
        Some(schema) if schema != SCHEMA_VERSION => RecordState::SchemaMismatch(schema),
        _ => RecordState::Found(values),
    }
}

/// Differences between recorded and configured values.
///
/// Additions and changes come first in key order, then removals.
pub fn diff(
    recorded: &BTreeMap<String, String>,
    expected: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut changes = Vec::new();
    for (key, value) in expected {
        match recorded.get(key) {
            None => changes.push(format!("{} added: {}", key, value)),
            Some(old) if old != value => {
                changes.push(format!("{} changed: {} -> {}", key, old, value))
            }
            Some(_) => {}
        }
    }
    for (key, old) in recorded {
        if !expected.contains_key(key) {
            changes.push(format!("{} removed (was: {})", key, old));
        }
    }
    changes
}

/// Values recorded in `versions.tf`.
pub fn versions_record(
    terraform_version: &str,
    aws_provider_version: &str,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TF_VERSION_KEY.to_string(), terraform_version.to_string()),
        (AWS_PROVIDER_VERSION_KEY.to_string(), aws_provider_version.to_string()),
    ])
}

/// Values recorded in `backend.tf`.
pub fn backend_record(bucket: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(BUCKET_KEY.to_string(), bucket.to_string())])
}

/// Changes needed to bring `versions.tf` content in line with configuration.
///
/// An empty result means the file is current. A missing tags record is
/// compared as an empty map so files predating tag tracking pick up new tags.
pub fn versions_changes(
    content: &str,
    expected: &BTreeMap<String, String>,
    expected_tags: &BTreeMap<String, String>,
) -> Vec<String> {
    let metadata = extract(content, RecordKind::Metadata);
    if let Some(reason) = metadata.regeneration_reason(RecordKind::Metadata) {
        return vec![reason];
    }

    let mut changes = match &metadata {
        RecordState::Found(values) => diff(values, expected),
        _ => Vec::new(),
    };

    match extract(content, RecordKind::Tags) {
        RecordState::Found(tags) => changes.extend(diff(&tags, expected_tags)),
        RecordState::Missing => changes.extend(diff(&BTreeMap::new(), expected_tags)),
        other => changes.extend(other.regeneration_reason(RecordKind::Tags)),
    }
    changes
}

/// Changes needed to bring `backend.tf` content in line with configuration.
pub fn backend_changes(content: &str, expected: &BTreeMap<String, String>) -> Vec<String> {
    match extract(content, RecordKind::Metadata) {
        RecordState::Found(values) => diff(&values, expected),
        other => other
            .regeneration_reason(RecordKind::Metadata)
            .into_iter()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_encode_adds_schema() {
        let json = encode(&map(&[("bucket", "b")])).unwrap();
        assert_eq!(json, r#"{"bucket":"b","schema":"1"}"#);
    }

    #[test]
    fn test_extract_found() {
        let content = "## tfkit-metadata: {\"bucket\":\"b\",\"schema\":\"1\"}\nterraform {}\n";
        assert_eq!(
            extract(content, RecordKind::Metadata),
            RecordState::Found(map(&[("bucket", "b")]))
        );
    }

    #[test]
    fn test_extract_legacy_without_schema() {
        let content = "## tfkit-metadata: {\"bucket\":\"b\"}\n";
        assert_eq!(
            extract(content, RecordKind::Metadata),
            RecordState::Found(map(&[("bucket", "b")]))
        );
    }

    #[test]
    fn test_extract_states() {
        assert_eq!(extract("terraform {}\n", RecordKind::Metadata), RecordState::Missing);
        assert!(matches!(
            extract("## tfkit-metadata: {broken\n", RecordKind::Metadata),
            RecordState::Corrupt(_)
        ));
        assert_eq!(
            extract("## tfkit-tags: {\"schema\":\"2\"}\n", RecordKind::Tags),
            RecordState::SchemaMismatch("2".to_string())
        );
        assert!(RecordState::Missing.forces_regeneration());
        assert!(!RecordState::Found(BTreeMap::new()).forces_regeneration());
    }

    #[test]
    fn test_extract_distinguishes_kinds() {
        let content = "## tfkit-tags: {\"team\":\"x\"}\n";
        assert_eq!(extract(content, RecordKind::Metadata), RecordState::Missing);
        assert_eq!(
            extract(content, RecordKind::Tags),
            RecordState::Found(map(&[("team", "x")]))
        );
    }

    #[test]
    fn test_diff_messages() {
        let recorded = map(&[("a", "1"), ("b", "2"), ("gone", "old")]);
        let expected = map(&[("a", "1"), ("b", "3"), ("c", "new")]);

        assert_eq!(
            diff(&recorded, &expected),
            vec!["b changed: 2 -> 3", "c added: new", "gone removed (was: old)"]
        );
        assert!(diff(&expected, &expected).is_empty());
    }

    #[test]
    fn test_versions_changes() {
        let expected = versions_record("~> 1.13", "~> 6.0");
        let content = format!(
            "## tfkit-metadata: {}\n## tfkit-tags: {}\n",
            encode(&versions_record("~> 1.12", "~> 6.0")).unwrap(),
            encode(&map(&[("team", "x")])).unwrap()
        );

        let changes = versions_changes(&content, &expected, &map(&[("team", "y")]));
        assert_eq!(changes, vec!["tf_ver changed: ~> 1.12 -> ~> 1.13", "team changed: x -> y"]);
    }

    #[test]
    fn test_versions_changes_missing_tags_record() {
        let expected = versions_record("~> 1.13", "~> 6.0");
        let content = format!("## tfkit-metadata: {}\n", encode(&expected).unwrap());

        assert!(versions_changes(&content, &expected, &BTreeMap::new()).is_empty());
        assert_eq!(
            versions_changes(&content, &expected, &map(&[("owner", "me")])),
            vec!["owner added: me"]
        );
    }

    #[test]
    fn test_backend_changes_without_record() {
        let changes = backend_changes("terraform {}\n", &backend_record("b"));
        assert_eq!(changes, vec!["metadata record missing"]);
    }
}
