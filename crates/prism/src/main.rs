//! Prism CLI - batch text-to-image generation.
//!
//! Each prompt gets its own model and size and is generated as an
//! independent job; results are written as JSON records on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Two prompts, default model and size
//! prism generate "a lighthouse at dusk" "a fox in fresh snow"
//!
//! # Prompts from a CSV file, saved locally
//! prism generate --csv prompts.csv --model fal-ai/flux/schnell --download
//!
//! # Store the fal.ai API key
//! prism key set
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Prism - batch text-to-image generation.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate one image per prompt
    Generate(cli::generate::GenerateArgs),

    /// List available models and image sizes
    Models(cli::models::ModelsArgs),

    /// Manage the fal.ai API key
    Key(cli::key::KeyArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't up yet, so config warnings go straight to stderr.
    let config = match prism_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prism config path`."
            );
            prism_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Commands::Generate(args) => cli::generate::execute(args).await,
        Commands::Models(args) => cli::models::execute(args).await,
        Commands::Key(args) => cli::key::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
