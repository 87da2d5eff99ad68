//! Plan document model and analysis results.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One action in a resource change's action list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeAction {
    Create,
    Read,
    Update,
    Delete,
    NoOp,
    Other(String),
}

impl ChangeAction {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeAction::Create => "create",
            ChangeAction::Read => "read",
            ChangeAction::Update => "update",
            ChangeAction::Delete => "delete",
            ChangeAction::NoOp => "no-op",
            ChangeAction::Other(other) => other,
        }
    }
}

impl From<String> for ChangeAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "create" => ChangeAction::Create,
            "read" => ChangeAction::Read,
            "update" => ChangeAction::Update,
            "delete" => ChangeAction::Delete,
            "no-op" => ChangeAction::NoOp,
            _ => ChangeAction::Other(value),
        }
    }
}

impl From<&str> for ChangeAction {
    fn from(value: &str) -> Self {
        ChangeAction::from(value.to_string())
    }
}

impl From<ChangeAction> for String {
    fn from(value: ChangeAction) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level JSON plan document as produced by `terraform show -json`.
///
/// Only the fields the analyzer needs are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub format_version: Option<String>,
    #[serde(default)]
    pub terraform_version: Option<String>,
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

/// A single proposed resource change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    pub address: String,
    /// Empty for the root module.
    #[serde(default)]
    pub module_address: String,
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub change: ChangeDetail,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_reason: Option<String>,
}

impl ResourceChange {
    pub fn is_data_source(&self) -> bool {
        self.mode == "data"
    }
}

/// Change details. `before`/`after` payloads are intentionally not modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    #[serde(default)]
    pub actions: Vec<ChangeAction>,
}

/// Risk level of a change, ordered worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource change after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedResource {
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub provider: String,
    pub actions: Vec<ChangeAction>,
    /// Rendered label: create, update, delete, replace, read, or the raw list.
    pub action: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub module_address: String,
}

/// Aggregated result of analyzing one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanAnalysis {
    pub terraform_version: String,
    pub total_changes: usize,
    pub additions: usize,
    pub modifications: usize,
    pub deletions: usize,
    pub replacements: usize,
    pub has_changes: bool,
    pub resource_changes: Vec<AnalyzedResource>,
    pub by_type: BTreeMap<String, usize>,
    pub by_module: BTreeMap<String, usize>,
    pub by_severity: BTreeMap<String, usize>,
    pub by_action: BTreeMap<String, usize>,
}

impl PlanAnalysis {
    /// 2 for any deletion or replacement, 1 for other changes, 0 for none.
    pub fn exit_code(&self) -> i32 {
        if self.deletions > 0 || self.replacements > 0 {
            2
        } else if self.total_changes > 0 {
            1
        } else {
            0
        }
    }

    pub fn has_critical_changes(&self) -> bool {
        self.deletions > 0 || self.replacements > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_action_round_trip() {
        let actions: Vec<ChangeAction> =
            serde_json::from_str(r#"["delete","create","no-op","forget"]"#).unwrap();
        assert_eq!(
            actions,
            vec![
                ChangeAction::Delete,
                ChangeAction::Create,
                ChangeAction::NoOp,
                ChangeAction::Other("forget".to_string()),
            ]
        );
        let json = serde_json::to_string(&actions).unwrap();
        assert_eq!(json, r#"["delete","create","no-op","forget"]"#);
    }

    #[test]
    fn test_severity_order_is_worst_first() {
        let mut severities =
            vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        severities.sort();
        assert_eq!(severities, Severity::ALL.to_vec());
    }

    #[test]
    fn test_exit_codes() {
        let mut analysis = PlanAnalysis::default();
        assert_eq!(analysis.exit_code(), 0);

        analysis.total_changes = 5;
        analysis.additions = 5;
        assert_eq!(analysis.exit_code(), 1);

        analysis.total_changes = 6;
        analysis.replacements = 1;
        assert_eq!(analysis.exit_code(), 2);
    }
}
