//! Addresses command - Show public addresses from a stack's outputs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use phoobe_cli::cache::EnvironmentCache;
use phoobe_cli::settings::Settings;
use phoobe_template::{StackOutput, StackOutputs};

#[derive(Args)]
pub struct AddressesArgs {
    /// Instance to show; all instances when omitted
    instance: Option<String>,

    /// Stack output listing as JSON (`openstack stack output show --all -f json`)
    #[arg(long, value_name = "FILE")]
    outputs: PathBuf,

    /// Write the generated private key to this file
    #[arg(long, value_name = "PATH")]
    save_key: Option<PathBuf>,
}

pub fn execute(args: AddressesArgs, settings: &Settings) -> Result<()> {
    let cache = EnvironmentCache::load(&settings.cache_file)?;
    let record = cache.require(&settings.environment_name)?;
    info!("Reading outputs of stack {}", record.id);

    let content = fs::read_to_string(&args.outputs)
        .with_context(|| format!("Failed to read {:?}", args.outputs))?;
    let listing: Vec<StackOutput> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid stack output listing {:?}", args.outputs))?;
    let outputs = StackOutputs::from_outputs(&listing);

    match args.instance.as_deref() {
        Some(instance) => println!("{}", outputs.address(instance)?),
        None => {
            for (instance, address) in outputs.addresses() {
                println!("{:<20} {}", instance, address);
            }
        }
    }

    if let Some(path) = args.save_key.as_deref() {
        let key = outputs
            .private_key()
            .context("Stack outputs carry no private key")?;
        write_private_key(path, key)?;
        println!("🔑 Private key written to {}", path.display());
    }

    Ok(())
}

fn write_private_key(path: &Path, key: &str) -> Result<()> {
    fs::write(path, key).with_context(|| format!("Failed to write {:?}", path))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
