//! Severity classification and aggregation of plan changes.

use tracing::{debug, info};

use crate::critical::CriticalResources;
use crate::plan::models::{AnalyzedResource, ChangeAction, PlanAnalysis, PlanDocument, Severity};

/// Module name used when a change belongs to the root module.
pub const ROOT_MODULE: &str = "root";

/// Classifies plan changes by risk using a critical resource set.
#[derive(Debug, Clone, Default)]
pub struct PlanAnalyzer {
    critical: CriticalResources,
}

impl PlanAnalyzer {
    pub fn new(critical: CriticalResources) -> Self {
        Self { critical }
    }

    pub fn critical_resources(&self) -> &CriticalResources {
        &self.critical
    }

    /// Analyze every managed, non-no-op change in the plan.
    pub fn analyze(&self, plan: &PlanDocument) -> PlanAnalysis {
        let mut analysis = PlanAnalysis {
            terraform_version: plan.terraform_version.clone().unwrap_or_default(),
            ..Default::default()
        };

        for change in &plan.resource_changes {
            let actions = &change.change.actions;
            if change.is_data_source() || actions.is_empty() || is_no_op(actions) {
                continue;
            }

            let severity = self.severity(actions, &change.kind);
            let label = action_label(actions);
            let module = if change.module_address.is_empty() {
                ROOT_MODULE
            } else {
                change.module_address.as_str()
            };

            debug!("{}: {} ({})", change.address, label, severity);

            analysis.total_changes += 1;
            count_action(&mut analysis, actions);
            *analysis.by_type.entry(change.kind.clone()).or_default() += 1;
            *analysis.by_module.entry(module.to_string()).or_default() += 1;
            *analysis
                .by_severity
                .entry(severity.as_str().to_string())
                .or_default() += 1;
            *analysis.by_action.entry(label.clone()).or_default() += 1;

            analysis.resource_changes.push(AnalyzedResource {
                address: change.address.clone(),
                kind: change.kind.clone(),
                name: change.name.clone(),
                provider: change.provider_name.clone(),
                actions: actions.clone(),
                action: label,
                severity,
                module_address: change.module_address.clone(),
            });
        }

        analysis.has_changes = analysis.total_changes > 0;

        info!(
            "Plan analysis: {} changes ({} to add, {} to change, {} to destroy, {} to replace)",
            analysis.total_changes,
            analysis.additions,
            analysis.modifications,
            analysis.deletions,
            analysis.replacements
        );

        analysis
    }

    /// Severity by strict priority: delete, critical update, update, anything else.
    pub fn severity(&self, actions: &[ChangeAction], kind: &str) -> Severity {
        let updates = actions.contains(&ChangeAction::Update);

        if actions.contains(&ChangeAction::Delete) {
            Severity::Critical
        } else if updates && self.critical.contains(kind) {
            Severity::High
        } else if updates {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Render an action list as a single label.
pub fn action_label(actions: &[ChangeAction]) -> String {
    match actions {
        [] => ChangeAction::NoOp.to_string(),
        [single] => single.to_string(),
        _ if actions.contains(&ChangeAction::Delete) && actions.contains(&ChangeAction::Create) => {
            "replace".to_string()
        }
        _ => {
            let names: Vec<&str> = actions.iter().map(ChangeAction::as_str).collect();
            format!("[{}]", names.join(" "))
        }
    }
}

fn is_no_op(actions: &[ChangeAction]) -> bool {
    matches!(actions, [ChangeAction::NoOp])
}

// Pure reads match no arm and only count toward the total.
fn count_action(analysis: &mut PlanAnalysis, actions: &[ChangeAction]) {
    let creates = actions.contains(&ChangeAction::Create);
    let deletes = actions.contains(&ChangeAction::Delete);

    if creates && !deletes {
        analysis.additions += 1;
    } else if creates && deletes {
        analysis.replacements += 1;
    } else if deletes {
        analysis.deletions += 1;
    } else if actions.contains(&ChangeAction::Update) {
        analysis.modifications += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::models::{ChangeDetail, ResourceChange};

    fn change(address: &str, kind: &str, module: &str, actions: &[&str]) -> ResourceChange {
        ResourceChange {
            address: address.to_string(),
            module_address: module.to_string(),
            mode: "managed".to_string(),
            kind: kind.to_string(),
            name: address.rsplit('.').next().unwrap_or_default().to_string(),
            provider_name: "registry.terraform.io/hashicorp/aws".to_string(),
            change: ChangeDetail {
                actions: actions.iter().map(|a| ChangeAction::from(*a)).collect(),
            },
            action_reason: None,
        }
    }

    fn plan(changes: Vec<ResourceChange>) -> PlanDocument {
        PlanDocument {
            format_version: Some("1.2".to_string()),
            terraform_version: Some("1.13.1".to_string()),
            resource_changes: changes,
        }
    }

    #[test]
    fn test_delete_on_non_critical_kind_is_critical() {
        let analysis = PlanAnalyzer::default()
            .analyze(&plan(vec![change("aws_instance.web", "aws_instance", "", &["delete"])]));

        assert_eq!(analysis.deletions, 1);
        assert_eq!(analysis.resource_changes[0].severity, Severity::Critical);
        assert_eq!(analysis.exit_code(), 2);
    }

    #[test]
    fn test_update_on_critical_kind_is_high() {
        let analysis = PlanAnalyzer::default().analyze(&plan(vec![change(
            "aws_db_instance.main",
            "aws_db_instance",
            "",
            &["update"],
        )]));

        assert_eq!(analysis.modifications, 1);
        assert_eq!(analysis.resource_changes[0].severity, Severity::High);
        assert_eq!(analysis.exit_code(), 1);
    }

    #[test]
    fn test_update_on_regular_kind_is_medium() {
        let analyzer = PlanAnalyzer::default();
        assert_eq!(
            analyzer.severity(&[ChangeAction::Update], "aws_instance"),
            Severity::Medium
        );
        assert_eq!(
            analyzer.severity(&[ChangeAction::Create], "aws_db_instance"),
            Severity::Low
        );
    }

    #[test]
    fn test_user_critical_kind() {
        let analyzer = PlanAnalyzer::new(CriticalResources::merged(["aws_lambda_function"]));
        assert_eq!(
            analyzer.severity(&[ChangeAction::Update], "aws_lambda_function"),
            Severity::High
        );
    }

    #[test]
    fn test_replace_in_any_order() {
        let analysis = PlanAnalyzer::default().analyze(&plan(vec![
            change("aws_instance.a", "aws_instance", "", &["delete", "create"]),
            change("aws_instance.b", "aws_instance", "", &["create", "delete"]),
        ]));

        assert_eq!(analysis.replacements, 2);
        assert_eq!(analysis.by_action["replace"], 2);
        assert!(analysis
            .resource_changes
            .iter()
            .all(|r| r.severity == Severity::Critical));
    }

    #[test]
    fn test_skips_data_sources_and_no_ops() {
        let mut data = change("data.aws_ami.ubuntu", "aws_ami", "", &["read"]);
        data.mode = "data".to_string();

        let analysis = PlanAnalyzer::default().analyze(&plan(vec![
            data,
            change("aws_instance.a", "aws_instance", "", &["no-op"]),
            change("aws_instance.b", "aws_instance", "", &[]),
        ]));

        assert_eq!(analysis.total_changes, 0);
        assert!(!analysis.has_changes);
        assert_eq!(analysis.exit_code(), 0);
    }

    #[test]
    fn test_pure_read_counts_toward_total_only() {
        let analysis = PlanAnalyzer::default().analyze(&plan(vec![
            change("aws_instance.a", "aws_instance", "", &["read"]),
            change("aws_instance.b", "aws_instance", "", &["create"]),
        ]));

        assert_eq!(analysis.total_changes, 2);
        assert_eq!(
            analysis.additions
                + analysis.modifications
                + analysis.deletions
                + analysis.replacements,
            1
        );
        assert_eq!(analysis.resource_changes[0].action, "read");
        assert_eq!(analysis.resource_changes[0].severity, Severity::Low);
    }

    #[test]
    fn test_groupings() {
        let analysis = PlanAnalyzer::default().analyze(&plan(vec![
            change("aws_instance.a", "aws_instance", "", &["create"]),
            change("module.net.aws_vpc.main", "aws_vpc", "module.net", &["update"]),
            change("module.net.aws_subnet.a", "aws_subnet", "module.net", &["delete"]),
        ]));

        assert_eq!(analysis.by_module["root"], 1);
        assert_eq!(analysis.by_module["module.net"], 2);
        assert_eq!(analysis.by_type["aws_instance"], 1);
        assert_eq!(analysis.by_severity["high"], 1);
        assert_eq!(analysis.by_severity["critical"], 1);
        assert_eq!(analysis.by_severity["low"], 1);
        assert_eq!(analysis.by_action["update"], 1);
    }

    #[test]
    fn test_action_label_fallback() {
        assert_eq!(
            action_label(&[ChangeAction::Read, ChangeAction::Update]),
            "[read update]"
        );
        assert_eq!(action_label(&[ChangeAction::Create]), "create");
        assert_eq!(action_label(&[]), "no-op");
    }

    #[test]
    fn test_missing_terraform_version_is_empty() {
        let mut doc = plan(vec![]);
        doc.terraform_version = None;
        assert_eq!(PlanAnalyzer::default().analyze(&doc).terraform_version, "");
    }
}
