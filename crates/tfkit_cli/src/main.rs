//! tfkit CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success, no drift, no planned changes
//! - 1: Drift or non-critical changes detected, or a command error
//! - 2: Files that failed to parse, or planned deletions/replacements

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, DriftCommand};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let result: anyhow::Result<i32> = match cli.command {
        Commands::Init(args) => {
            commands::init::execute(args).map(|()| i32::from(ExitCodes::SUCCESS))
        }
        Commands::Generate(args) => {
            commands::generate::execute(args, config_path).map(|()| i32::from(ExitCodes::SUCCESS))
        }
        Commands::Drift(drift) => match drift.command {
            DriftCommand::Version(args) => commands::drift::execute_version(args, config_path),
            DriftCommand::Plan(args) => commands::drift::execute_plan(args, config_path),
            DriftCommand::All(args) => commands::drift::execute_all(args, config_path),
        },
    };

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(ExitCodes::GENERAL_ERROR)),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(ExitCodes::GENERAL_ERROR)
        }
    }
}

/// Logs go to stderr so report output on stdout stays parseable.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    let directives = std::iter::once("warn".to_string()).chain(
        ["tfkit", "tfkit_core", "tfkit_drift", "tfkit_iac", "tfkit_templates"]
            .iter()
            .map(|target| format!("{}={}", target, level)),
    );
    for directive in directives {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
