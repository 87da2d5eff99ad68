//! Version constraint extraction from Terraform files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use hcl::expr::{Expression, ObjectKey};
use hcl::Body;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{DriftError, DriftResult};
use crate::types::{DeclaredVersions, ProviderVersion, VersionRecord};

/// File name that, when present, is the only version source for its directory.
pub const CANONICAL_VERSIONS_FILE: &str = "versions.tf";

const TERRAFORM_EXTENSION: &str = "tf";

/// Walks a directory tree and extracts declared Terraform and provider constraints.
#[derive(Debug, Clone)]
pub struct VersionDetector {
    root: PathBuf,
}

impl VersionDetector {
    /// Create a detector rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the tree and return one record per file that declares versions or fails to parse.
    ///
    /// Records are ordered by traversal (file names sorted within each directory).
    /// Hidden directories below the root are skipped. Walk and read failures
    /// abort the scan; undecodable or unparseable files become failed records.
    pub fn scan(&self) -> DriftResult<Vec<VersionRecord>> {
        info!("Scanning {:?} for version constraints", self.root);

        let mut records = Vec::new();
        let mut claimed_dirs: HashSet<PathBuf> = HashSet::new();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e));

        for entry in walker {
            let entry = entry.map_err(|e| DriftError::Traversal {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone()),
                message: e.to_string(),
            })?;

            if !entry.file_type().is_file() || !is_terraform_file(entry.path()) {
                continue;
            }

            let path = entry.path();
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let is_canonical = entry.file_name() == CANONICAL_VERSIONS_FILE;

            if !is_canonical
                && (claimed_dirs.contains(&dir) || dir.join(CANONICAL_VERSIONS_FILE).is_file())
            {
                debug!("Skipping {:?}, directory already has a version source", path);
                continue;
            }

            let relative = self.relative_path(path);
            let bytes = fs::read(path).map_err(|source| DriftError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
            let parsed = String::from_utf8(bytes)
                .map_err(|e| format!("invalid UTF-8: {}", e))
                .and_then(|content| parse_versions(&content));

            match parsed {
                Ok(declared) if declared.is_empty() => {
                    debug!("No version constraints in {}", relative);
                }
                Ok(declared) => {
                    debug!("Found version constraints in {}", relative);
                    claimed_dirs.insert(dir);
                    records.push(VersionRecord::declared(relative, declared));
                }
                Err(message) => {
                    debug!("Failed to parse {}: {}", relative, message);
                    records.push(VersionRecord::failed(relative, message));
                }
            }
        }

        info!("Found {} files with version information", records.len());
        Ok(records)
    }

    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Parse HCL source and extract the `terraform` block's constraints.
///
/// A leading byte order mark is ignored. A parse failure yields no partial data.
pub fn parse_versions(content: &str) -> Result<DeclaredVersions, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let body: Body = hcl::parse(content).map_err(|e| e.to_string())?;
    Ok(extract_declared(&body))
}

fn extract_declared(body: &Body) -> DeclaredVersions {
    let mut declared = DeclaredVersions::default();

    for block in body.blocks().filter(|b| b.identifier() == "terraform") {
        for attr in block.body().attributes() {
            if attr.key() == "required_version" {
                if let Expression::String(version) = attr.expr() {
                    declared.terraform_version = version.clone();
                }
            }
        }

        for inner in block
            .body()
            .blocks()
            .filter(|b| b.identifier() == "required_providers")
        {
            for attr in inner.body().attributes() {
                let Some(provider) = provider_from_expr(attr.expr()) else {
                    continue;
                };
                if !provider.source.is_empty() || !provider.version.is_empty() {
                    declared.providers.insert(attr.key().to_string(), provider);
                }
            }
        }
    }

    declared
}

fn provider_from_expr(expr: &Expression) -> Option<ProviderVersion> {
    match expr {
        Expression::Object(object) => {
            let mut provider = ProviderVersion::default();
            for (key, value) in object.iter() {
                let Expression::String(value) = value else {
                    continue;
                };
                match object_key_name(key) {
                    Some("source") => provider.source = value.clone(),
                    Some("version") => provider.version = value.clone(),
                    _ => {}
                }
            }
            Some(provider)
        }
        // Pre-0.13 shorthand: `aws = "~> 2.0"`
        Expression::String(version) => Some(ProviderVersion::new("", version.clone())),
        _ => None,
    }
}

fn object_key_name(key: &ObjectKey) -> Option<&str> {
    match key {
        ObjectKey::Identifier(ident) => Some(ident.as_str()),
        ObjectKey::Expression(Expression::String(s)) => Some(s.as_str()),
        _ => None,
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_terraform_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TERRAFORM_EXTENSION)
}
