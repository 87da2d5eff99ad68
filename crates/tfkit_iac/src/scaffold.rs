//! Project and application scaffolding.
//!
//! Layout produced:
//!
//! ```text
//! <root>/
//!   .gitignore .pre-commit-config.yaml .tflint.hcl trivy.yaml .tfkit.yaml
//!   envs/<env>/.terraform-version
//!   envs/<env>/<region>/<app>/*.tf
//!   .github/workflows/<app>-<env>-<short region>-<type>.yaml
//! ```
//!
//! Existing files are never overwritten, with one exception: `versions.tf`
//! and `backend.tf` are re-rendered when their embedded metadata no longer
//! matches configuration.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tfkit_core::{Config, CONFIG_FILE_NAME};
use tfkit_templates::{output_file_name, TemplateCategory, TemplateData, TemplateSet};
use tracing::{debug, info, warn};

use crate::error::{IacError, IacResult};
use crate::metadata;
use crate::region::short_region;

pub const ENVS_DIR: &str = "envs";
pub const WORKFLOWS_DIR: &str = ".github/workflows";
pub const DEFAULT_ENVIRONMENTS: [&str; 3] = ["dev", "stg", "prd"];
pub const DEFAULT_REGION: &str = "eu-central-1";

/// Version written to `.terraform-version` when no configuration exists.
pub const DEFAULT_TERRAFORM_PIN: &str = "1.13.1";

const TERRAFORM_VERSION_TEMPLATE: &str = "root/.terraform-version.tmpl";
const VERSIONS_TEMPLATE: &str = "tf/versions.tf.tmpl";
const BACKEND_TEMPLATE: &str = "tf/backend.tf.tmpl";
const ROLE_PLACEHOLDER: &str = "REPLACE_WITH_ROLE_TO_ASSUME";
const REUSABLE_PREFIX: &str = "reusable-";

/// A file re-rendered because its metadata was out of date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdate {
    pub path: PathBuf,
    pub changes: Vec<String>,
}

/// What a scaffold operation did. Paths are relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub created_dirs: Vec<PathBuf>,
    pub created: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub updated: Vec<FileUpdate>,
}

impl ScaffoldReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing was written.
    pub fn is_unchanged(&self) -> bool {
        self.created_dirs.is_empty() && self.created.is_empty() && self.updated.is_empty()
    }

    fn was_updated(&self, path: &Path) -> bool {
        self.updated.iter().any(|u| u.path == path)
    }
}

/// Environments, regions and Terraform pin used by `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitPlan {
    pub environments: Vec<String>,
    pub regions: Vec<String>,
    pub terraform_version: String,
}

impl Default for InitPlan {
    fn default() -> Self {
        Self {
            environments: DEFAULT_ENVIRONMENTS.iter().map(|e| e.to_string()).collect(),
            regions: vec![DEFAULT_REGION.to_string()],
            terraform_version: DEFAULT_TERRAFORM_PIN.to_string(),
        }
    }
}

impl InitPlan {
    /// Derive the plan from an existing configuration file's raw values.
    pub fn from_config(config: &Config, path: &Path) -> IacResult<Self> {
        let environments = config.environments();
        if environments.is_empty() {
            return Err(IacError::MissingAccountMapping(path.to_path_buf()));
        }
        info!(
            "Using {} environment(s) from config account_mapping: {:?}",
            environments.len(),
            environments
        );

        let terraform_version = if config.terraform_version.trim().is_empty() {
            DEFAULT_TERRAFORM_PIN.to_string()
        } else {
            terraform_version_pin(&config.terraform_version)
        };

        let regions = if config.regions().is_empty() {
            warn!("No regions specified in config, using default: {}", DEFAULT_REGION);
            vec![DEFAULT_REGION.to_string()]
        } else {
            config.regions().to_vec()
        };

        Ok(Self {
            environments,
            regions,
            terraform_version,
        })
    }
}

/// Concrete version for `.terraform-version` from a constraint: `~> 1.13` becomes `1.13.0`.
pub fn terraform_version_pin(constraint: &str) -> String {
    let mut version = constraint.trim();
    for op in ["~>", ">=", "<=", ">", "<", "="] {
        version = version.strip_prefix(op).unwrap_or(version);
    }
    let version = version.trim();
    if version.matches('.').count() == 1 {
        format!("{}.0", version)
    } else {
        version.to_string()
    }
}

/// Creates the top-level project layout.
pub struct ProjectInitializer {
    root: PathBuf,
    templates: TemplateSet,
}

impl ProjectInitializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            templates: TemplateSet::embedded(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decide what to create from the target's `.tfkit.yaml`, or defaults without one.
    ///
    /// An unreadable file falls back to defaults; a readable one without an
    /// account mapping is an error.
    pub fn plan(&self) -> IacResult<InitPlan> {
        let path = self.root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!("No {} in target, using default environments", CONFIG_FILE_NAME);
            return Ok(InitPlan::default());
        }

        match Config::read_raw(&path) {
            Ok(config) => InitPlan::from_config(&config, &path),
            Err(e) => {
                warn!("Failed to read existing {}: {}, using defaults", CONFIG_FILE_NAME, e);
                Ok(InitPlan::default())
            }
        }
    }

    pub fn init(&self) -> IacResult<ScaffoldReport> {
        let plan = self.plan()?;
        self.init_with(&plan)
    }

    pub fn init_with(&self, plan: &InitPlan) -> IacResult<ScaffoldReport> {
        info!("Initializing project structure in {}", self.root.display());
        let mut report = ScaffoldReport::new();
        fs::create_dir_all(&self.root)?;

        let empty = TemplateData::new();
        for name in self.templates.names_in(TemplateCategory::Root) {
            if name == TERRAFORM_VERSION_TEMPLATE {
                continue;
            }
            let content = self.templates.render(name, &empty)?;
            write_new(&self.root, Path::new(output_file_name(name)), &content, &mut report)?;
        }

        let starter = Config::starter_yaml()?;
        write_new(&self.root, Path::new(CONFIG_FILE_NAME), &starter, &mut report)?;

        let pin = TemplateData::new().with_terraform_version(&plan.terraform_version);
        let pin_content = self.templates.render(TERRAFORM_VERSION_TEMPLATE, &pin)?;
        for env in &plan.environments {
            let env_dir = Path::new(ENVS_DIR).join(env);
            write_new(&self.root, &env_dir.join(".terraform-version"), &pin_content, &mut report)?;
            for region in &plan.regions {
                ensure_dir(&self.root, &env_dir.join(region), &mut report)?;
            }
        }

        Ok(report)
    }
}

/// Generates one application directory from templates.
pub struct AppGenerator<'a> {
    config: &'a Config,
    root: PathBuf,
}

impl<'a> AppGenerator<'a> {
    pub fn new(config: &'a Config, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
        }
    }

    /// Relative directory an application is generated into.
    pub fn app_path(env: &str, region: &str, app: &str) -> PathBuf {
        Path::new(ENVS_DIR).join(env).join(region).join(app)
    }

    pub fn generate(&self, env: &str, region: &str, app: &str) -> IacResult<ScaffoldReport> {
        validate_name("environment", env)?;
        validate_name("region", region)?;
        validate_name("application", app)?;

        self.config.validate()?;
        let account_id = self
            .config
            .account_id(env)
            .ok_or_else(|| IacError::UnknownEnvironment(env.to_string()))?;

        let templates = self.template_set()?;
        let data = self.template_data(&templates, env, region, app, account_id)?;

        let mut report = ScaffoldReport::new();
        let app_rel = Self::app_path(env, region, app);
        ensure_dir(&self.root, &app_rel, &mut report)?;
        info!("Generating files in {}", app_rel.display());

        self.refresh_backend(&templates, &data, &app_rel, &mut report)?;
        self.refresh_versions(&templates, &data, &app_rel, &mut report)?;

        for name in templates.names() {
            let Some((rel, file_data)) = self.destination(name, &app_rel, &data, &templates) else {
                continue;
            };
            if report.was_updated(&rel) {
                continue;
            }
            if self.root.join(&rel).exists() {
                debug!("{} already exists, skipping", rel.display());
                report.skipped.push(rel);
                continue;
            }
            let content = templates.render(name, &file_data)?;
            write_new(&self.root, &rel, &content, &mut report)?;
            debug!("Rendered {} from {}", rel.display(), templates.source(name).unwrap_or(name));
        }

        Ok(report)
    }

    fn template_set(&self) -> IacResult<TemplateSet> {
        let templates = TemplateSet::embedded();
        match &self.config.templates_dir {
            Some(dir) => {
                info!("Using custom templates from {}", dir.display());
                Ok(templates.with_custom_dir(dir, &self.config.extra_template_extensions)?)
            }
            None => Ok(templates),
        }
    }

    /// Values shared by every template for this application.
    pub fn template_data(
        &self,
        templates: &TemplateSet,
        env: &str,
        region: &str,
        app: &str,
        account_id: &str,
    ) -> IacResult<TemplateData> {
        let mut data = TemplateData {
            env: env.to_string(),
            region: region.to_string(),
            app_dir: app.to_string(),
            account_id: account_id.to_string(),
            short_region: short_region(region),
            s3_bucket_name: self.config.bucket_name().to_string(),
            terraform_version: self.config.terraform_version.clone(),
            aws_provider_version: self.config.aws_provider_version().to_string(),
            aws_role_arn: self.role_arn(account_id),
            workflow_file_name: String::new(),
            default_tags: self.config.default_tags(),
            extra: BTreeMap::new(),
        };

        if data.s3_bucket_name.contains("{{") {
            data.s3_bucket_name = templates.render_str(&data.s3_bucket_name, &data)?;
        }

        let versions =
            metadata::versions_record(&data.terraform_version, &data.aws_provider_version);
        data.set_var("versions_metadata", metadata::encode(&versions)?);
        data.set_var("tags_metadata", metadata::encode(&data.default_tags)?);
        data.set_var(
            "backend_metadata",
            metadata::encode(&metadata::backend_record(&data.s3_bucket_name))?,
        );
        Ok(data)
    }

    /// Explicit ARN, else one built from the role name, else a placeholder.
    pub fn role_arn(&self, account_id: &str) -> String {
        let workflows = self.config.github_workflows();
        if !workflows.aws_role_arn.is_empty() {
            return workflows.aws_role_arn.clone();
        }
        let role = if workflows.aws_role_name.is_empty() {
            ROLE_PLACEHOLDER
        } else {
            workflows.aws_role_name.as_str()
        };
        format!("arn:aws:iam::{}:role/{}", account_id, role)
    }

    /// File name for a non-reusable workflow template output such as `terraform.yaml`.
    pub fn workflow_file_name(
        &self,
        templates: &TemplateSet,
        file: &str,
        data: &TemplateData,
    ) -> String {
        let kind = file.strip_suffix(".yaml").unwrap_or(file);
        let name_template = &self.config.github_workflows().name_template;
        if !name_template.is_empty() {
            match templates.render_str(name_template, data) {
                Ok(prefix) => return format!("{}-{}.yaml", prefix, kind),
                Err(e) => warn!("Failed to render name_template, using default naming: {}", e),
            }
        }
        format!("{}-{}-{}-{}.yaml", data.app_dir, data.env, data.short_region, kind)
    }

    /// Output path and data for a template, or `None` when it is not generated here.
    fn destination(
        &self,
        name: &str,
        app_rel: &Path,
        data: &TemplateData,
        templates: &TemplateSet,
    ) -> Option<(PathBuf, TemplateData)> {
        let file = output_file_name(name);
        match TemplateCategory::of(name) {
            Some(TemplateCategory::Tf) => Some((app_rel.join(file), data.clone())),
            Some(TemplateCategory::Github) => {
                if !self.config.github_workflows().create {
                    debug!("Skipping {}: workflow generation disabled", name);
                    return None;
                }
                if file.starts_with(REUSABLE_PREFIX) {
                    return Some((Path::new(WORKFLOWS_DIR).join(file), data.clone()));
                }
                let mut data = data.clone();
                data.workflow_file_name = self.workflow_file_name(templates, file, &data);
                Some((Path::new(WORKFLOWS_DIR).join(&data.workflow_file_name), data))
            }
            Some(TemplateCategory::Root) => {
                debug!("Skipping {}: root templates are written by init", name);
                None
            }
            None => {
                debug!("Skipping {}: unknown template category", name);
                None
            }
        }
    }

    fn refresh_versions(
        &self,
        templates: &TemplateSet,
        data: &TemplateData,
        app_rel: &Path,
        report: &mut ScaffoldReport,
    ) -> IacResult<()> {
        let expected =
            metadata::versions_record(&data.terraform_version, &data.aws_provider_version);
        let rel = app_rel.join("versions.tf");
        self.refresh(templates, data, &rel, VERSIONS_TEMPLATE, report, |content| {
            metadata::versions_changes(content, &expected, &data.default_tags)
        })
    }

    fn refresh_backend(
        &self,
        templates: &TemplateSet,
        data: &TemplateData,
        app_rel: &Path,
        report: &mut ScaffoldReport,
    ) -> IacResult<()> {
        let expected = metadata::backend_record(&data.s3_bucket_name);
        let rel = app_rel.join("backend.tf");
        self.refresh(templates, data, &rel, BACKEND_TEMPLATE, report, |content| {
            metadata::backend_changes(content, &expected)
        })
    }

    fn refresh<F>(
        &self,
        templates: &TemplateSet,
        data: &TemplateData,
        rel: &Path,
        template: &str,
        report: &mut ScaffoldReport,
        changes_for: F,
    ) -> IacResult<()>
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        let path = self.root.join(rel);
        if !path.is_file() {
            return Ok(());
        }

        let content = fs::read_to_string(&path)?;
        let changes = changes_for(&content);
        if changes.is_empty() {
            debug!("{} is up to date", rel.display());
            return Ok(());
        }

        let rendered = templates.render(template, data)?;
        write_file(&path, &rendered)?;
        for change in &changes {
            info!("Updated {} - {}", rel.display(), change);
        }
        report.updated.push(FileUpdate {
            path: rel.to_path_buf(),
            changes,
        });
        Ok(())
    }
}

/// Reject names that would escape or collapse the directory layout.
fn validate_name(kind: &'static str, value: &str) -> IacResult<()> {
    let reason = if value.trim().is_empty() {
        Some("must not be empty")
    } else if value.contains('/') || value.contains('\\') {
        Some("must not contain path separators")
    } else if value == "." || value == ".." {
        Some("must not be a relative path component")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(IacError::InvalidName {
            kind,
            value: value.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn ensure_dir(root: &Path, rel: &Path, report: &mut ScaffoldReport) -> IacResult<()> {
    let path = root.join(rel);
    if path.is_dir() {
        debug!("Directory {}/ already exists", rel.display());
        return Ok(());
    }
    fs::create_dir_all(&path)?;
    info!("Created directory {}/", rel.display());
    report.created_dirs.push(rel.to_path_buf());
    Ok(())
}

/// Write `content` unless the file already exists.
fn write_new(root: &Path, rel: &Path, content: &str, report: &mut ScaffoldReport) -> IacResult<()> {
    let path = root.join(rel);
    if path.exists() {
        info!("{} already exists, skipping", rel.display());
        report.skipped.push(rel.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_file(&path, content)?;
    info!("Created {}", rel.display());
    report.created.push(rel.to_path_buf());
    Ok(())
}

fn write_file(path: &Path, content: &str) -> IacResult<()> {
    fs::write(path, content).map_err(|source| IacError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
