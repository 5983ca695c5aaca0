//! Tarjama CLI - translate chat screenshots to Arabic.
//!
//! Screenshots go to OpenAI or Google Gemini, one at a time, and come back
//! as right-to-left Arabic text paired with the original image.
//!
//! # Usage
//!
//! ```bash
//! # Translate screenshots in the terminal
//! tarjama translate chat1.png chat2.jpg --provider gemini
//!
//! # Write an HTML page with image/translation pairs
//! tarjama translate ./screenshots/ -f html -o results.html
//!
//! # Run the web form
//! tarjama serve --bind 127.0.0.1:8501
//!
//! # View configuration
//! tarjama config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// Tarjama - translate chat screenshots to Arabic.
#[derive(Parser, Debug)]
#[command(name = "tarjama")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate screenshots and print or save the results
    Translate(cli::translate::TranslateArgs),

    /// Serve the upload form over HTTP
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config {
        Some(path) => tarjama_core::Config::load_from(path),
        None => tarjama_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tarjama config path`."
            );
            tarjama_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Tarjama v{}", tarjama_core::VERSION);

    match cli.command {
        Commands::Translate(args) => cli::translate::execute(args, &config).await,
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}
