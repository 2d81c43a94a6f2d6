//! List-environments command - Show environments recorded as created.

use anyhow::Result;

use phoobe_cli::cache::EnvironmentCache;
use phoobe_cli::settings::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let cache = EnvironmentCache::load(&settings.cache_file)?;

    if cache.is_empty() {
        println!("No environments created");
        return Ok(());
    }

    println!("{:<20} {:<38} {:<30} CREATED", "NAME", "ID", "FILENAME");
    for record in cache.records() {
        println!(
            "{:<20} {:<38} {:<30} {}",
            record.name,
            record.id,
            record.filename.display(),
            record.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
