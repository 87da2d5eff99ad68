//! # tfkit_templates
//!
//! Terraform project templates for tfkit.
//!
//! Templates ship embedded in the binary and can be overridden per project
//! from a custom directory. Rendering substitutes `{{ name }}` placeholders,
//! optionally through a filter such as `{{ terraform_version | strip_constraint }}`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tfkit_templates::{TemplateData, TemplateSet};
//!
//! let set = TemplateSet::embedded();
//! let data = TemplateData::new().with_terraform_version("~> 1.13");
//! let versions = set.render("tf/versions.tf.tmpl", &data).unwrap();
//! println!("{}", versions);
//! ```

pub mod data;
pub mod error;
pub mod renderer;
pub mod set;

pub use data::TemplateData;
pub use error::{TemplateError, TemplateResult};
pub use renderer::{strip_constraint, TemplateRenderer, FILTERS};
pub use set::{output_file_name, TemplateCategory, TemplateSet, TEMPLATE_SUFFIX};
