//! The `tarjama serve` command for running the web form.

use clap::Args;
use tarjama_core::Config;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address (defaults to `[server].bind`)
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    crate::server::run_server(config, &bind).await
}
