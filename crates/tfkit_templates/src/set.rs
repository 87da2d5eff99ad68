//! Named template collections.
//!
//! Templates are keyed by `<category>/<file name>.tmpl`. The category decides
//! where the rendered file lands: `root/` at the project root during `init`,
//! `tf/` inside the application directory, `github/` under `.github/workflows`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::data::TemplateData;
use crate::error::{TemplateError, TemplateResult};
use crate::renderer::TemplateRenderer;

/// Suffix carried by every embedded template name.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

const EMBEDDED: &[(&str, &str)] = &[
    ("root/.gitignore.tmpl", include_str!("../templates/root/.gitignore.tmpl")),
    (
        "root/.pre-commit-config.yaml.tmpl",
        include_str!("../templates/root/.pre-commit-config.yaml.tmpl"),
    ),
    ("root/.tflint.hcl.tmpl", include_str!("../templates/root/.tflint.hcl.tmpl")),
    ("root/trivy.yaml.tmpl", include_str!("../templates/root/trivy.yaml.tmpl")),
    (
        "root/.terraform-version.tmpl",
        include_str!("../templates/root/.terraform-version.tmpl"),
    ),
    ("tf/backend.tf.tmpl", include_str!("../templates/tf/backend.tf.tmpl")),
    ("tf/versions.tf.tmpl", include_str!("../templates/tf/versions.tf.tmpl")),
    ("tf/providers.tf.tmpl", include_str!("../templates/tf/providers.tf.tmpl")),
    ("tf/main.tf.tmpl", include_str!("../templates/tf/main.tf.tmpl")),
    ("tf/variables.tf.tmpl", include_str!("../templates/tf/variables.tf.tmpl")),
    ("tf/outputs.tf.tmpl", include_str!("../templates/tf/outputs.tf.tmpl")),
    (
        "github/terraform.yaml.tmpl",
        include_str!("../templates/github/terraform.yaml.tmpl"),
    ),
    (
        "github/reusable-terraform.yaml.tmpl",
        include_str!("../templates/github/reusable-terraform.yaml.tmpl"),
    ),
];

/// Where a template's output belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateCategory {
    Root,
    Tf,
    Github,
}

impl TemplateCategory {
    /// Category of a template name, if it has a known prefix.
    pub fn of(name: &str) -> Option<Self> {
        match name.split_once('/')?.0 {
            "root" => Some(TemplateCategory::Root),
            "tf" => Some(TemplateCategory::Tf),
            "github" => Some(TemplateCategory::Github),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Root => "root",
            TemplateCategory::Tf => "tf",
            TemplateCategory::Github => "github",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Entry {
    content: String,
    source: String,
}

/// A set of named templates plus the renderer used for them.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates: BTreeMap<String, Entry>,
    renderer: TemplateRenderer,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::embedded()
    }
}

impl TemplateSet {
    /// Templates compiled into the binary.
    pub fn embedded() -> Self {
        let templates = EMBEDDED
            .iter()
            .map(|(name, content)| {
                let entry = Entry {
                    content: content.to_string(),
                    source: format!("embedded:{}", name),
                };
                (name.to_string(), entry)
            })
            .collect();
        Self {
            templates,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Overlay files from `dir` whose names end with `.<ext>` for one of `extensions`.
    ///
    /// Each file is registered as `tf/<file name>`, replacing an embedded
    /// template of the same name.
    pub fn with_custom_dir(
        mut self,
        dir: impl AsRef<Path>,
        extensions: &[String],
    ) -> TemplateResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TemplateError::CustomDirNotFound(dir.to_path_buf()));
        }
        info!("Loading custom templates from {:?}", dir);

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !extensions
                .iter()
                .any(|ext| file_name.ends_with(&format!(".{}", ext)))
            {
                debug!("Ignoring {:?}: extension not allowed", entry.path());
                continue;
            }

            let content =
                fs::read_to_string(entry.path()).map_err(|source| TemplateError::ReadTemplate {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
            let name = format!("tf/{}", file_name);
            debug!("Custom template {} from {:?}", name, entry.path());
            self.templates.insert(
                name,
                Entry {
                    content,
                    source: entry.path().display().to_string(),
                },
            );
        }

        Ok(self)
    }

    /// All template names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// Template names in one category, sorted.
    pub fn names_in(&self, category: TemplateCategory) -> Vec<&str> {
        self.templates
            .keys()
            .filter(|name| TemplateCategory::of(name) == Some(category))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Raw template text.
    pub fn content(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|e| e.content.as_str())
    }

    /// Where a template was loaded from (`embedded:<name>` or a file path).
    pub fn source(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|e| e.source.as_str())
    }

    pub fn render(&self, name: &str, data: &TemplateData) -> TemplateResult<String> {
        let entry = self
            .templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        self.renderer.render_content(&entry.content, &data.variables())
    }

    /// Render an ad-hoc string with the same variables and filters.
    pub fn render_str(&self, content: &str, data: &TemplateData) -> TemplateResult<String> {
        self.renderer.render_content(content, &data.variables())
    }
}

/// File name a template renders to: the last path segment without `.tmpl`.
pub fn output_file_name(name: &str) -> &str {
    let file = name.rsplit('/').next().unwrap_or(name);
    file.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_templates_present() {
        let set = TemplateSet::embedded();
        assert!(set.contains("tf/versions.tf.tmpl"));
        assert!(set.contains("tf/backend.tf.tmpl"));
        assert!(set.contains("root/.gitignore.tmpl"));
        assert_eq!(set.source("tf/main.tf.tmpl"), Some("embedded:tf/main.tf.tmpl"));
        assert!(set.names().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_names_in_category() {
        let set = TemplateSet::embedded();
        let github = set.names_in(TemplateCategory::Github);
        assert_eq!(
            github,
            vec!["github/reusable-terraform.yaml.tmpl", "github/terraform.yaml.tmpl"]
        );
        assert!(set
            .names_in(TemplateCategory::Root)
            .contains(&"root/.terraform-version.tmpl"));
    }

    #[test]
    fn test_category_of() {
        assert_eq!(TemplateCategory::of("tf/a.tf.tmpl"), Some(TemplateCategory::Tf));
        assert_eq!(TemplateCategory::of("other/a"), None);
        assert_eq!(TemplateCategory::of("plain"), None);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("tf/versions.tf.tmpl"), "versions.tf");
        assert_eq!(output_file_name("root/.gitignore.tmpl"), ".gitignore");
        assert_eq!(output_file_name("tf/custom.hcl"), "custom.hcl");
    }

    #[test]
    fn test_render_unknown_template() {
        let set = TemplateSet::embedded();
        let err = set.render("tf/nope.tf.tmpl", &TemplateData::new()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_render_terraform_version_file() {
        let set = TemplateSet::embedded();
        let data = TemplateData::new().with_terraform_version("1.13.0");
        let out = set.render("root/.terraform-version.tmpl", &data).unwrap();
        assert_eq!(out, "1.13.0\n");
    }
}
