//! Pixmorph CLI - on-the-fly image transformations from the command line.
//!
//! Drives the same submit-transformation flow a server would: rate limit,
//! validate, look up, fetch, decode, transform, encode.
//!
//! # Usage
//!
//! ```bash
//! # Transform a local file
//! pixmorph transform --location photo.png --resize 800x600 --sepia -f webp -o out.webp
//!
//! # Transform a catalogued image with a JSON request
//! pixmorph transform --image img-1 --request request.json > out.jpg
//!
//! # View configuration
//! pixmorph config show
//! ```

use clap::{Parser, Subcommand};
use pixmorph_core::Config;
use std::path::PathBuf;

mod cli;
mod logging;

/// Pixmorph - on-the-fly image transformations.
#[derive(Parser, Debug)]
#[command(name = "pixmorph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "PIXMORPH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Transform one image and write the encoded result
    Transform(cli::transform::TransformArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let (config, config_path) = match &cli.config {
        Some(path) => {
            let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            // A missing file is fine: `config init` is about to create it.
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            (config, path)
        }
        None => {
            let config = Config::load().unwrap_or_else(|e| {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `pixmorph config path`."
                );
                Config::default()
            });
            (config, Config::default_path())
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Pixmorph v{}", pixmorph_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Transform(args) => cli::transform::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path).await,
    }
}
