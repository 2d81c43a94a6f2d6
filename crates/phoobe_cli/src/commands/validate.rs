//! Validate command - Check that an environment synthesizes cleanly.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use phoobe_cli::settings::Settings;
use phoobe_env::Environment;
use phoobe_template::{SynthesisOptions, TemplateSynthesizer};

#[derive(Args)]
pub struct ValidateArgs {
    /// Also check that shell provisioner scripts are readable
    #[arg(long)]
    use_software_config: bool,
}

pub fn execute(args: ValidateArgs, settings: &Settings) -> Result<()> {
    info!("Validating environment: {:?}", settings.environment_file);

    println!("📋 Loading {}...", settings.environment_file.display());
    let environment = Environment::load(&settings.environment_file, &settings.environment_name)
        .with_context(|| format!("Failed to load {:?}", settings.environment_file))?;
    println!(
        "   ✅ {} networks, {} instances, {} provisioners",
        environment.networks().len(),
        environment.instances().len(),
        environment.provisioners().len()
    );

    println!("🏗️  Synthesizing template...");
    let options = SynthesisOptions::default()
        .use_software_config(args.use_software_config || settings.use_software_config);
    let template = TemplateSynthesizer::new(&environment, options).synthesize()?;

    let dangling = template.dangling_references();
    let undeclared = template.undeclared_parameters();
    if !dangling.is_empty() || !undeclared.is_empty() {
        println!("   ❌ Template is not self-contained:");
        for name in &dangling {
            println!("      - unknown resource '{}'", name);
        }
        for name in &undeclared {
            println!("      - unknown parameter '{}'", name);
        }
        anyhow::bail!("Template validation failed");
    }

    println!(
        "   ✅ {} resources, {} parameters, {} outputs",
        template.resources().len(),
        template.parameters().len(),
        template.outputs().len()
    );

    println!();
    println!("✅ Environment '{}' is valid", environment.name());
    Ok(())
}
