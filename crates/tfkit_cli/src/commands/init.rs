//! Init command - Create the project skeleton.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tfkit_iac::{ProjectInitializer, ScaffoldReport};

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

pub fn execute(args: InitArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let root = match args.dir {
        Some(dir) => cwd.join(super::expand_home(&dir)),
        None => cwd,
    };
    info!("Initializing Terraform project at {}", root.display());

    let report = ProjectInitializer::new(&root)
        .init()
        .with_context(|| format!("Failed to initialize {}", root.display()))?;

    if report.is_unchanged() {
        println!("✅ Project at {} is already initialized", root.display());
        return Ok(());
    }

    println!("✅ Project initialized at {}", root.display());
    print_report(&report);
    println!();
    println!("Next steps:");
    println!("  1. Replace the placeholder account IDs in .tfkit.yaml");
    println!("  2. tfkit generate <app> --env dev --region eu-central-1");

    Ok(())
}

pub(crate) fn print_report(report: &ScaffoldReport) {
    if !report.created_dirs.is_empty() {
        println!();
        println!("Directories:");
        for dir in &report.created_dirs {
            println!("  📁 {}", dir.display());
        }
    }
    if !report.created.is_empty() {
        println!();
        println!("Created:");
        for file in &report.created {
            println!("  📄 {}", file.display());
        }
    }
    if !report.updated.is_empty() {
        println!();
        println!("Updated:");
        for update in &report.updated {
            println!("  🔄 {}", update.path.display());
            for change in &update.changes {
                println!("     - {}", change);
            }
        }
    }
    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} existing file(s)", report.skipped.len());
    }
}
