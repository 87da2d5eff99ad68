//! CLI command definitions.
//!
//! `init` and `generate` scaffold a Terraform tree; the `drift` family
//! inspects one.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use tfkit_core::{Config, ConfigOverrides};
use tfkit_drift::{OutputFormat, DEFAULT_WIDTH};

pub mod drift;
pub mod generate;
pub mod init;

/// tfkit - Terraform project scaffolding and drift analysis
#[derive(Parser)]
#[command(name = "tfkit")]
#[command(version, about = "tfkit - Terraform project scaffolding and drift analysis")]
#[command(long_about = r#"
tfkit scaffolds multi-environment Terraform projects and reports version
drift and risky plan changes across them.

COMMANDS:
  init            → Create root tooling files, .tfkit.yaml and envs/
  generate        → Render an application directory from templates
  drift version   → Compare declared versions against the configured baseline
  drift plan      → Score a `terraform show -json` plan
  drift all       → Both analyses with a combined status

EXIT CODES:
  0 - Success, nothing to report
  1 - Drift or non-critical changes, or a command error
  2 - Parse errors, or planned deletions/replacements
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./.tfkit.yaml when present)
    #[arg(short, long, global = true, env = "TFKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a Terraform project
    Init(init::InitArgs),

    /// Generate an application directory
    Generate(generate::GenerateArgs),

    /// Analyze version drift and plan risk
    Drift(DriftArgs),
}

#[derive(Args)]
pub struct DriftArgs {
    #[command(subcommand)]
    pub command: DriftCommand,
}

#[derive(Subcommand)]
pub enum DriftCommand {
    /// Detect Terraform and provider version drift
    Version(drift::VersionArgs),

    /// Analyze a Terraform plan JSON file
    Plan(drift::PlanArgs),

    /// Run version and plan analysis together
    All(drift::AllArgs),
}

/// Report rendering options shared by the drift commands.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: table, json or csv
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Disable colored table output
    #[arg(long)]
    pub no_color: bool,
}

impl OutputArgs {
    /// Colors only when writing a table to a terminal and NO_COLOR is unset.
    pub fn use_color(&self) -> bool {
        !self.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stdout().is_terminal()
    }
}

/// Load configuration relative to the current directory.
pub fn load_config(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Config::load(explicit, &cwd, overrides).context("Failed to load configuration")
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Expand and check a directory argument.
pub fn resolve_scan_path(path: &Path) -> Result<PathBuf> {
    let path = expand_home(path);
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }
    Ok(path)
}

/// Table width from `COLUMNS`, falling back to the formatter default.
pub fn terminal_width() -> u16 {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|width| *width > 0)
        .unwrap_or(DEFAULT_WIDTH)
}
