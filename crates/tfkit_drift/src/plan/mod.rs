//! Terraform plan parsing and risk analysis.

pub mod analyzer;
pub mod models;
pub mod parser;

pub use analyzer::{action_label, PlanAnalyzer, ROOT_MODULE};
pub use models::{
    AnalyzedResource, ChangeAction, ChangeDetail, PlanAnalysis, PlanDocument, ResourceChange,
    Severity,
};
pub use parser::{parse_plan_bytes, parse_plan_file};
