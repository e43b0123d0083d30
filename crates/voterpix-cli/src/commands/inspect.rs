//! Inspect command - dry run over one document.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input PDF file
    input: PathBuf,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

pub async fn run(args: &InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let (config, _) = super::resolve_config(config_path)?;
    let report = voterpix_core::inspect(&config, &args.input)?;
    debug!(
        "Planned {} page(s), {} image(s) matched",
        report.pages.len(),
        report.images_matched()
    );

    let json = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };

    match &args.output {
        Some(output) => std::fs::write(output, json)?,
        None => println!("{}", json),
    }

    Ok(())
}
