//! Values available to templates.

use std::collections::BTreeMap;

/// Data a template is rendered with.
///
/// Every field is exposed under its own name (`{{ app_dir }}`, `{{ region }}`, ...).
/// `default_tags` is additionally exposed pre-rendered as an HCL object under
/// `default_tags_hcl`. Extra variables override built-in ones on name clashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    pub env: String,
    pub region: String,
    pub app_dir: String,
    pub account_id: String,
    pub short_region: String,
    pub s3_bucket_name: String,
    pub terraform_version: String,
    pub aws_provider_version: String,
    pub aws_role_arn: String,
    pub workflow_file_name: String,
    pub default_tags: BTreeMap<String, String>,
    pub extra: BTreeMap<String, String>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terraform_version(mut self, version: impl Into<String>) -> Self {
        self.terraform_version = version.into();
        self
    }

    /// Add or replace a free-form variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(name.into(), value.into());
    }

    /// Flatten into the variable map used for substitution.
    pub fn variables(&self) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        for (name, value) in [
            ("env", &self.env),
            ("region", &self.region),
            ("app_dir", &self.app_dir),
            ("account_id", &self.account_id),
            ("short_region", &self.short_region),
            ("s3_bucket_name", &self.s3_bucket_name),
            ("terraform_version", &self.terraform_version),
            ("aws_provider_version", &self.aws_provider_version),
            ("aws_role_arn", &self.aws_role_arn),
            ("workflow_file_name", &self.workflow_file_name),
        ] {
            vars.insert(name.to_string(), value.clone());
        }
        vars.insert("default_tags_hcl".to_string(), self.default_tags_hcl());
        vars.extend(self.extra.clone());
        vars
    }

    /// Default tags as an HCL object literal indented for a provider block.
    pub fn default_tags_hcl(&self) -> String {
        if self.default_tags.is_empty() {
            return "{}".to_string();
        }
        let mut out = String::from("{\n");
        for (key, value) in &self.default_tags {
            out.push_str(&format!("      {:?} = {:?}\n", key, value));
        }
        out.push_str("    }");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_include_fields() {
        let data = TemplateData {
            env: "dev".to_string(),
            region: "eu-west-1".to_string(),
            ..Default::default()
        };
        let vars = data.variables();
        assert_eq!(vars["env"], "dev");
        assert_eq!(vars["region"], "eu-west-1");
        assert_eq!(vars["account_id"], "");
        assert_eq!(vars["default_tags_hcl"], "{}");
    }

    #[test]
    fn test_extra_overrides_builtin() {
        let data = TemplateData::new()
            .with_terraform_version("1.9.0")
            .with_var("terraform_version", "override")
            .with_var("custom", "x");
        let vars = data.variables();
        assert_eq!(vars["terraform_version"], "override");
        assert_eq!(vars["custom"], "x");
    }

    #[test]
    fn test_default_tags_hcl() {
        let mut data = TemplateData::new();
        data.default_tags.insert("team".to_string(), "platform".to_string());
        data.default_tags.insert("managed_by".to_string(), "terraform".to_string());

        assert_eq!(
            data.default_tags_hcl(),
            "{\n      \"managed_by\" = \"terraform\"\n      \"team\" = \"platform\"\n    }"
        );
    }
}
