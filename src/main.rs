use tracing_subscriber::EnvFilter;

use clyjin::{Boot, ClyjinError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Boot::new().start(None).await {
        Ok(()) => Ok(()),
        // Usage and help errors carry clap's own exit semantics.
        Err(ClyjinError::Cli(cli_err)) => cli_err.exit(),
        Err(err) => Err(err.into()),
    }
}
