//! Generate command - Render an application directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfkit_core::ConfigOverrides;
use tfkit_iac::AppGenerator;

use super::init::print_report;

#[derive(Args)]
pub struct GenerateArgs {
    /// Application name
    pub app: String,

    /// Target environment (must have an account mapping)
    #[arg(short, long)]
    pub env: String,

    /// Target AWS region
    #[arg(short, long)]
    pub region: String,

    /// Directory with custom templates overriding the built-in ones
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// S3 bucket for Terraform state (may use {{ env }} and {{ short_region }})
    #[arg(long)]
    pub s3_bucket_name: Option<String>,

    /// Additional custom template extensions, comma separated
    #[arg(long, value_delimiter = ',')]
    pub extra_template_extensions: Vec<String>,

    /// Also generate GitHub Actions workflows
    #[arg(long)]
    pub create_github_workflows: bool,
}

impl GenerateArgs {
    /// Command line values that take precedence over the configuration file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            templates_dir: self.templates_dir.as_deref().map(super::expand_home),
            s3_bucket_name: self.s3_bucket_name.clone(),
            extra_template_extensions: (!self.extra_template_extensions.is_empty())
                .then(|| self.extra_template_extensions.clone()),
            create_github_workflows: self.create_github_workflows.then_some(true),
        }
    }
}

pub fn execute(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, &args.overrides())?;
    let root = std::env::current_dir().context("Failed to determine current directory")?;

    info!(
        "Generating {} for {} in {}",
        args.app, args.env, args.region
    );
    let report = AppGenerator::new(&config, &root)
        .generate(&args.env, &args.region, &args.app)
        .with_context(|| format!("Failed to generate application '{}'", args.app))?;

    let app_dir = AppGenerator::app_path(&args.env, &args.region, &args.app);
    if report.is_unchanged() {
        println!("✅ {} is up to date", app_dir.display());
        return Ok(());
    }

    println!("✅ Generated {}", app_dir.display());
    print_report(&report);

    Ok(())
}
