//! Resource kinds whose updates are treated as high risk.

use std::collections::HashSet;

/// Built-in critical AWS resource kinds.
const DEFAULT_CRITICAL_RESOURCES: &[&str] = &[
    // Databases
    "aws_db_instance",
    "aws_db_cluster",
    "aws_rds_cluster",
    "aws_rds_cluster_instance",
    "aws_rds_global_cluster",
    "aws_db_subnet_group",
    "aws_db_parameter_group",
    "aws_rds_cluster_parameter_group",
    "aws_dynamodb_table",
    "aws_dynamodb_global_table",
    "aws_elasticache_cluster",
    "aws_elasticache_replication_group",
    "aws_redshift_cluster",
    "aws_neptune_cluster",
    "aws_neptune_cluster_instance",
    "aws_docdb_cluster",
    "aws_docdb_cluster_instance",
    // Storage
    "aws_s3_bucket",
    "aws_s3_bucket_policy",
    "aws_s3_bucket_public_access_block",
    "aws_efs_file_system",
    "aws_efs_access_point",
    "aws_backup_vault",
    "aws_backup_plan",
    // Networking
    "aws_vpc",
    "aws_subnet",
    "aws_route_table",
    "aws_route_table_association",
    "aws_internet_gateway",
    "aws_nat_gateway",
    "aws_vpc_peering_connection",
    "aws_vpn_gateway",
    "aws_vpn_connection",
    "aws_customer_gateway",
    "aws_transit_gateway",
    "aws_transit_gateway_route_table",
    "aws_vpc_endpoint",
    "aws_vpc_endpoint_service",
    // Security and identity
    "aws_security_group",
    "aws_security_group_rule",
    "aws_network_acl",
    "aws_network_acl_rule",
    "aws_iam_role",
    "aws_iam_role_policy",
    "aws_iam_role_policy_attachment",
    "aws_iam_policy",
    "aws_iam_user",
    "aws_iam_user_policy",
    "aws_iam_user_policy_attachment",
    "aws_iam_group",
    "aws_iam_group_policy",
    "aws_iam_group_policy_attachment",
    "aws_kms_key",
    "aws_kms_alias",
    "aws_secretsmanager_secret",
    "aws_secretsmanager_secret_version",
    // WAF and Shield
    "aws_waf_web_acl",
    "aws_waf_rule",
    "aws_waf_rule_group",
    "aws_wafv2_web_acl",
    "aws_wafv2_rule_group",
    "aws_wafv2_ip_set",
    "aws_wafv2_regex_pattern_set",
    "aws_waf_rate_based_rule",
    "aws_shield_protection",
    "aws_shield_protection_group",
];

/// Immutable set of critical resource kinds.
///
/// Built once per analysis from the defaults plus any user-supplied kinds.
#[derive(Debug, Clone)]
pub struct CriticalResources {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl Default for CriticalResources {
    fn default() -> Self {
        Self::defaults()
    }
}

impl CriticalResources {
    /// The built-in list only.
    pub fn defaults() -> Self {
        Self::merged(std::iter::empty::<&str>())
    }

    /// Defaults first, then user kinds. Duplicates and empty entries are dropped.
    pub fn merged<I, S>(user: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ordered = Vec::with_capacity(DEFAULT_CRITICAL_RESOURCES.len());
        let mut lookup = HashSet::with_capacity(DEFAULT_CRITICAL_RESOURCES.len());

        let defaults = DEFAULT_CRITICAL_RESOURCES.iter().map(|s| s.to_string());
        let user = user.into_iter().map(|s| s.as_ref().trim().to_string());

        for kind in defaults.chain(user) {
            if kind.is_empty() || lookup.contains(&kind) {
                continue;
            }
            lookup.insert(kind.clone());
            ordered.push(kind);
        }

        Self { ordered, lookup }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.lookup.contains(kind)
    }

    /// Kinds in merge order.
    pub fn kinds(&self) -> &[String] {
        &self.ordered
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
