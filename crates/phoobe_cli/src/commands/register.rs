//! Register command - Record the stack an environment was created as.

use anyhow::Result;
use clap::Args;

use phoobe_cli::cache::{EnvironmentCache, EnvironmentRecord};
use phoobe_cli::settings::Settings;

#[derive(Args)]
pub struct RegisterArgs {
    /// Stack id returned by the orchestration service
    #[arg(long)]
    stack_id: String,
}

pub fn execute(args: RegisterArgs, settings: &Settings) -> Result<()> {
    let mut cache = EnvironmentCache::load(&settings.cache_file)?;
    cache.insert(EnvironmentRecord::new(
        &settings.environment_name,
        &args.stack_id,
        &settings.environment_file,
    ))?;
    cache.save()?;

    println!(
        "✅ Registered '{}' as stack {}",
        settings.environment_name, args.stack_id
    );
    Ok(())
}
