//! Forget command - Drop an environment's record.

use anyhow::Result;

use phoobe_cli::cache::EnvironmentCache;
use phoobe_cli::settings::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let mut cache = EnvironmentCache::load(&settings.cache_file)?;
    let record = cache.remove(&settings.environment_name)?;
    cache.save()?;

    println!("✅ Forgot '{}' (stack {})", record.name, record.id);
    Ok(())
}
