//! CLI command definitions.
//!
//! Each subcommand lives in its own module exposing an `execute` function.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use phoobe_cli::settings::{Settings, DEFAULT_SETTINGS_FILE};

pub mod addresses;
pub mod forget;
pub mod generate_template;
pub mod list_environments;
pub mod register;
pub mod validate;

/// phoobe - Heat template synthesizer for small lab environments
#[derive(Parser)]
#[command(name = "phoobe")]
#[command(version, about = "phoobe - Heat template synthesizer for small lab environments")]
#[command(long_about = r#"
phoobe reads a declarative environment description (networks, instances,
provisioners) and synthesizes a Heat orchestration template from it.

COMMANDS:
  generate-template → Write the Heat template for the environment
  validate          → Check that the environment synthesizes cleanly
  list-environments → Show environments recorded as created
  register          → Record the stack id an environment was created as
  forget            → Drop an environment's record
  addresses         → Show public addresses from a stack's outputs

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or missing file
  3 - Invalid environment description
  4 - Synthesis failure
  5 - Environment cache error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file
    #[arg(long, global = true, env = "PHOOBE_CONFIGURATION_FILE", default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// Environment description file
    #[arg(short = 'f', long, global = true, env = "PHOOBE_ENVIRONMENT_FILE")]
    pub environment_file: Option<PathBuf>,

    /// Environment name
    #[arg(short = 'n', long, global = true, env = "PHOOBE_ENVIRONMENT_NAME")]
    pub environment_name: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings file contents with command line overrides applied.
    pub fn settings(&self) -> Result<Settings> {
        let settings = Settings::load(&self.config)?
            .with_environment_file(self.environment_file.clone())
            .with_environment_name(self.environment_name.clone());
        Ok(settings)
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the Heat template for the environment
    #[command(name = "generate-template")]
    GenerateTemplate(generate_template::GenerateTemplateArgs),

    /// Check that the environment synthesizes cleanly
    Validate(validate::ValidateArgs),

    /// Show environments recorded as created
    #[command(name = "list-environments")]
    ListEnvironments,

    /// Record the stack id the environment was created as
    Register(register::RegisterArgs),

    /// Drop the environment's record
    Forget,

    /// Show public addresses from a stack's outputs
    Addresses(addresses::AddressesArgs),
}
