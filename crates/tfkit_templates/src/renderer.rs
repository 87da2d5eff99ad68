//! Variable substitution.
//!
//! Placeholders take the form `{{ name }}` or `{{ name | filter }}`. Only plain
//! identifiers are recognised, so expressions such as GitHub Actions'
//! `${{ secrets.TOKEN }}` pass through untouched.

use std::collections::BTreeMap;

use regex::{Captures, Regex};

use crate::error::{TemplateError, TemplateResult};

/// Filters accepted after a `|` in a placeholder.
pub const FILTERS: [&str; 4] = ["strip_constraint", "lower", "upper", "trim"];

/// Template renderer for substituting variables into content.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        Self {
            variable_pattern: Regex::new(
                r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*(?:\|\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*)?\}\}",
            )
            .expect("variable pattern is a valid regex"),
        }
    }

    /// Render content by replacing variables. Unknown variables are left as written.
    pub fn render_content(
        &self,
        content: &str,
        variables: &BTreeMap<String, String>,
    ) -> TemplateResult<String> {
        let mut out = String::with_capacity(content.len());
        let mut last = 0;

        for caps in self.variable_pattern.captures_iter(content) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&content[last..whole.start()]);
            out.push_str(&self.substitute(&caps, variables)?);
            last = whole.end();
        }
        out.push_str(&content[last..]);
        Ok(out)
    }

    /// Names of all variables referenced by `content`, in order of appearance.
    pub fn referenced_variables(&self, content: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.variable_pattern.captures_iter(content) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn substitute(
        &self,
        caps: &Captures<'_>,
        variables: &BTreeMap<String, String>,
    ) -> TemplateResult<String> {
        let name = &caps[1];
        let Some(value) = variables.get(name) else {
            return Ok(caps[0].to_string());
        };
        match caps.get(2) {
            Some(filter) => apply_filter(name, filter.as_str(), value),
            None => Ok(value.clone()),
        }
    }
}

fn apply_filter(variable: &str, filter: &str, value: &str) -> TemplateResult<String> {
    match filter {
        "strip_constraint" => Ok(strip_constraint(value)),
        "lower" => Ok(value.to_lowercase()),
        "upper" => Ok(value.to_uppercase()),
        "trim" => Ok(value.trim().to_string()),
        _ => Err(TemplateError::UnknownFilter {
            variable: variable.to_string(),
            filter: filter.to_string(),
        }),
    }
}

/// Remove version constraint operators: `~> 1.13` becomes `1.13`.
pub fn strip_constraint(version: &str) -> String {
    ["~>", ">=", "<=", ">", "<", "="]
        .iter()
        .fold(version.to_string(), |acc, op| acc.replace(op, ""))
        .trim()
        .to_string()
}
