use clap::Parser;
use tracing_subscriber::EnvFilter;

use arriva::cli::{Cli, Commands};
use arriva::config::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            arriva::cli::serve::execute(host.as_deref(), port).await?;
        }
        Commands::Config => {
            let config = RelayConfig::load()?;
            println!("{}", config.redacted());
        }
    }

    Ok(())
}
