//! phoobe CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or missing file
//! - 3: Invalid environment description
//! - 4: Synthesis failure
//! - 5: Environment cache error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use phoobe_cli::{CacheError, SettingsError};
use phoobe_env::EnvError;
use phoobe_template::TemplateError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const ENVIRONMENT_ERROR: u8 = 3;
    pub const SYNTHESIS_ERROR: u8 = 4;
    pub const CACHE_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = cli.settings().and_then(|settings| match cli.command {
        Commands::GenerateTemplate(args) => commands::generate_template::execute(args, &settings),
        Commands::Validate(args) => commands::validate::execute(args, &settings),
        Commands::ListEnvironments => commands::list_environments::execute(&settings),
        Commands::Register(args) => commands::register::execute(args, &settings),
        Commands::Forget => commands::forget::execute(&settings),
        Commands::Addresses(args) => commands::addresses::execute(args, &settings),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<EnvError>() {
        return match err {
            EnvError::ConfigNotFound(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::ENVIRONMENT_ERROR,
        };
    }

    match e.downcast_ref::<TemplateError>() {
        Some(TemplateError::Env(EnvError::ConfigNotFound(_))) => return ExitCodes::INVALID_ARGS,
        Some(TemplateError::Env(_)) => return ExitCodes::ENVIRONMENT_ERROR,
        Some(_) => return ExitCodes::SYNTHESIS_ERROR,
        None => {}
    }

    if e.downcast_ref::<CacheError>().is_some() {
        ExitCodes::CACHE_ERROR
    } else if e.downcast_ref::<SettingsError>().is_some() {
        ExitCodes::INVALID_ARGS
    } else if e.downcast_ref::<std::io::Error>().is_some() {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
