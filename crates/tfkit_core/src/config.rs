//! Project configuration (`.tfkit.yaml`).
//!
//! Loading happens in three passes: the YAML file is deserialized as-is,
//! command-line overrides are layered on top, and finally defaults fill
//! anything still empty.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tfkit_drift::{Baseline, CriticalResources, DEFAULT_TOP_N};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".tfkit.yaml";

pub const DEFAULT_TERRAFORM_VERSION: &str = "~> 1.13";
pub const DEFAULT_AWS_PROVIDER_VERSION: &str = "~> 6.0";
pub const DEFAULT_BUCKET_NAME: &str = "CHANGE_ME_WITH_YOUR_GLOBALLY_UNIQUE_S3_BUCKET_NAME";

/// Template extension that is always accepted from a custom templates directory.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "tf.tmpl";

/// Provider key for AWS.
pub const AWS: &str = "aws";

const STARTER_HEADER: &str = "\
# tfkit configuration file
# Default settings for Terraform project scaffolding and drift analysis.
#
# Required: update provider.aws.account_mapping with your AWS account IDs
# Required: update backend.s3.bucket_name with the S3 bucket holding Terraform state
# Optional: customize terraform_version, provider versions, regions and default_tags

";

/// Settings for one provider block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Expected version constraint, used as the drift baseline.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Environment name -> account id.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub account_mapping: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub default_tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Backend {
    pub bucket_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub s3: S3Backend,
}

/// GitHub Actions workflow generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubWorkflows {
    pub create: bool,
    /// Prefix for generated workflow file names; `{{var}}` placeholders allowed.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name_template: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aws_role_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aws_role_arn: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub github_workflows: GithubWorkflows,
}

/// Drift analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Extra resource kinds treated as critical, merged after the built-in list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub critical_resources: Vec<String>,
    /// Rows shown in ranked group tables. Zero shows everything.
    pub top_n_count: usize,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            critical_resources: Vec::new(),
            top_n_count: DEFAULT_TOP_N,
        }
    }
}

/// Drift settings derived from configuration.
#[derive(Debug, Clone)]
pub struct DriftSettings {
    pub critical_resources: CriticalResources,
    pub top_n: usize,
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub templates_dir: Option<PathBuf>,
    pub s3_bucket_name: Option<String>,
    pub extra_template_extensions: Option<Vec<String>>,
    pub create_github_workflows: Option<bool>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub terraform_version: String,
    pub provider: BTreeMap<String, ProviderConfig>,
    pub backend: BackendConfig,
    pub generate: GenerateConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_template_extensions: Vec<String>,
    pub drift: DriftConfig,
}

impl Config {
    /// Resolve, read and finalize configuration.
    ///
    /// An explicit path must exist. Without one, `.tfkit.yaml` in `cwd` is used
    /// when present and defaults otherwise.
    pub fn load(
        explicit: Option<&Path>,
        cwd: &Path,
        overrides: &ConfigOverrides,
    ) -> ConfigResult<Self> {
        let mut config = match Self::resolve_path(explicit, cwd)? {
            Some(path) => {
                info!("Using config file: {}", path.display());
                Self::read_raw(&path)?
            }
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Self::default()
            }
        };
        config.finalize(overrides);
        Ok(config)
    }

    /// Read a config file and apply defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let mut config = Self::read_raw(path.as_ref())?;
        config.finalize(&ConfigOverrides::default());
        Ok(config)
    }

    /// Parse YAML and apply defaults.
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let mut config = Self::parse_raw(content)?;
        config.finalize(&ConfigOverrides::default());
        Ok(config)
    }

    /// Which file `load` would read, if any.
    pub fn resolve_path(explicit: Option<&Path>, cwd: &Path) -> ConfigResult<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let candidate = cwd.join(CONFIG_FILE_NAME);
        Ok(candidate.is_file().then_some(candidate))
    }

    /// Read a config file without applying defaults.
    pub fn read_raw(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_raw(&content).map_err(|e| match e {
            ConfigError::Yaml(source) => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse YAML without applying defaults. Empty and comment-only documents
    /// produce an empty configuration.
    pub fn parse_raw(content: &str) -> ConfigResult<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Apply overrides, then defaults, then normalize extensions.
    pub fn finalize(&mut self, overrides: &ConfigOverrides) {
        self.apply_overrides(overrides);
        self.apply_defaults();
        self.normalize_template_extensions();
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(dir) = &overrides.templates_dir {
            self.templates_dir = Some(dir.clone());
        }
        if let Some(bucket) = &overrides.s3_bucket_name {
            self.backend.s3.bucket_name = bucket.clone();
        }
        if let Some(extensions) = &overrides.extra_template_extensions {
            self.extra_template_extensions = extensions.clone();
        }
        if let Some(create) = overrides.create_github_workflows {
            self.generate.github_workflows.create = create;
        }
    }

    pub fn apply_defaults(&mut self) {
        if self.terraform_version.is_empty() {
            self.terraform_version = DEFAULT_TERRAFORM_VERSION.to_string();
        }
        let aws = self.provider.entry(AWS.to_string()).or_default();
        if aws.version.is_empty() {
            aws.version = DEFAULT_AWS_PROVIDER_VERSION.to_string();
        }
        if self.backend.s3.bucket_name.is_empty() {
            self.backend.s3.bucket_name = DEFAULT_BUCKET_NAME.to_string();
        }
    }

    /// `tf.tmpl` first, then configured extensions in order, without duplicates.
    pub fn normalize_template_extensions(&mut self) {
        let mut normalized = vec![DEFAULT_TEMPLATE_EXTENSION.to_string()];
        for ext in &self.extra_template_extensions {
            let ext = ext.trim();
            if !ext.is_empty() && !normalized.iter().any(|e| e == ext) {
                normalized.push(ext.to_string());
            }
        }
        self.extra_template_extensions = normalized;
    }

    /// Checks required before generating application code.
    ///
    /// The `aws` provider entry always exists after loading, so only its
    /// account mapping needs checking.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.environments().is_empty() {
            return Err(ConfigError::AccountMappingRequired);
        }
        Ok(())
    }

    pub fn aws(&self) -> Option<&ProviderConfig> {
        self.provider.get(AWS)
    }

    pub fn aws_provider_version(&self) -> &str {
        self.aws().map(|p| p.version.as_str()).unwrap_or(DEFAULT_AWS_PROVIDER_VERSION)
    }

    /// Account id mapped to an environment.
    pub fn account_id(&self, env: &str) -> Option<&str> {
        self.aws()
            .and_then(|aws| aws.account_mapping.get(env))
            .map(String::as_str)
    }

    /// Environments from the account mapping, sorted.
    pub fn environments(&self) -> Vec<String> {
        self.aws()
            .map(|aws| aws.account_mapping.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn regions(&self) -> &[String] {
        self.aws().map(|aws| aws.regions.as_slice()).unwrap_or(&[])
    }

    pub fn default_tags(&self) -> BTreeMap<String, String> {
        self.aws().map(|aws| aws.default_tags.clone()).unwrap_or_default()
    }

    pub fn bucket_name(&self) -> &str {
        &self.backend.s3.bucket_name
    }

    pub fn github_workflows(&self) -> &GithubWorkflows {
        &self.generate.github_workflows
    }

    /// Drift baseline: the core constraint plus every provider with a version.
    pub fn baseline(&self) -> Baseline {
        self.provider
            .iter()
            .filter(|(_, p)| !p.version.trim().is_empty())
            .fold(Baseline::new(&self.terraform_version), |baseline, (name, p)| {
                baseline.with_provider(name, &p.version)
            })
    }

    pub fn drift_settings(&self) -> DriftSettings {
        DriftSettings {
            critical_resources: CriticalResources::merged(&self.drift.critical_resources),
            top_n: self.drift.top_n_count,
        }
    }

    /// Configuration written by `init` for a fresh project.
    pub fn starter() -> Self {
        let mut aws = ProviderConfig {
            version: DEFAULT_AWS_PROVIDER_VERSION.to_string(),
            regions: vec!["eu-central-1".to_string()],
            ..Default::default()
        };
        for env in ["dev", "stg", "prd"] {
            aws.account_mapping.insert(
                env.to_string(),
                format!("REPLACE_WITH_YOUR_{}_ACCOUNT_ID", env.to_uppercase()),
            );
        }
        aws.default_tags
            .insert("managed_by".to_string(), "terraform".to_string());

        let mut config = Self {
            terraform_version: DEFAULT_TERRAFORM_VERSION.to_string(),
            ..Default::default()
        };
        config.provider.insert(AWS.to_string(), aws);
        config.backend.s3.bucket_name = DEFAULT_BUCKET_NAME.to_string();
        config
    }

    /// Starter configuration as commented YAML.
    pub fn starter_yaml() -> ConfigResult<String> {
        let body = serde_yaml::to_string(&Self::starter())?;
        Ok(format!("{}{}", STARTER_HEADER, body))
    }
}
