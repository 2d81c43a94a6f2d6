//! Generate-template command - Write the Heat template for an environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use phoobe_cli::settings::Settings;
use phoobe_env::Environment;
use phoobe_template::{
    DocumentFormat, NetworkLookup, StaticNetworkLookup, SynthesisOptions, TemplateRenderer,
    TemplateSynthesizer,
};

#[derive(Args)]
pub struct GenerateTemplateArgs {
    /// Output file
    #[arg(short, long, default_value = "environment.hot.yaml")]
    output: PathBuf,

    /// Resolve the external network now instead of leaving a parameter
    #[arg(long)]
    standalone: bool,

    /// Embed shell provisioners as software config
    #[arg(long)]
    use_software_config: bool,

    /// YAML file mapping network names to ids (standalone mode)
    #[arg(long, value_name = "FILE", env = "PHOOBE_NETWORK_IDS")]
    network_ids: Option<PathBuf>,

    /// Document format (yaml, json)
    #[arg(long, default_value = "yaml", value_parser = parse_format)]
    format: DocumentFormat,
}

fn parse_format(s: &str) -> Result<DocumentFormat, String> {
    DocumentFormat::from_str(s).ok_or_else(|| format!("unsupported format '{}'", s))
}

pub fn execute(args: GenerateTemplateArgs, settings: &Settings) -> Result<()> {
    info!(
        "Generating template for '{}' from {:?}",
        settings.environment_name, settings.environment_file
    );

    let environment = Environment::load(&settings.environment_file, &settings.environment_name)
        .with_context(|| format!("Failed to load {:?}", settings.environment_file))?;

    let options = SynthesisOptions::default()
        .standalone(args.standalone)
        .use_software_config(args.use_software_config || settings.use_software_config);

    let lookup = match args.network_ids.as_ref().or(settings.network_ids.as_ref()) {
        Some(path) if args.standalone => Some(
            StaticNetworkLookup::from_file(path)
                .with_context(|| format!("Failed to read network ids from {:?}", path))?,
        ),
        _ => None,
    };

    let mut synthesizer = TemplateSynthesizer::new(&environment, options);
    if let Some(lookup) = lookup.as_ref() {
        synthesizer = synthesizer.with_lookup(lookup as &dyn NetworkLookup);
    }
    let template = synthesizer.synthesize()?;

    TemplateRenderer::new(args.format).render_to_file(&template, &args.output)?;

    println!(
        "✅ Wrote {} resources to {}",
        template.resources().len(),
        args.output.display()
    );
    if !template.parameters().is_empty() {
        let names: Vec<_> = template.parameters().keys().map(String::as_str).collect();
        println!("   Parameters to supply: {}", names.join(", "));
    }

    Ok(())
}
