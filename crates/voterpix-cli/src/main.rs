//! CLI application for extracting voter photos from electoral-roll PDFs.

mod commands;
mod logging;

use clap::{Parser, Subcommand};

use commands::{config, extract, inspect};

/// Voter-roll photo extraction - save each voter photo under its identifier
#[derive(Parser)]
#[command(name = "voterpix")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and name the photos of one or more PDF documents
    Extract(extract::ExtractArgs),

    /// Show identifiers and image names for a document without writing
    Inspect(inspect::InspectArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Extract(args) => {
            // Inputs are checked before the run leaves anything behind
            let files = args.validated_inputs()?;
            logging::init(cli.verbose, args.wants_log_file())?;
            extract::run(args, files, config_path).await
        }
        Commands::Inspect(args) => {
            logging::init(cli.verbose, false)?;
            inspect::run(args, config_path).await
        }
        Commands::Config(args) => {
            logging::init(cli.verbose, false)?;
            config::run(args, config_path).await
        }
    }
}
