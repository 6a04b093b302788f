pub mod serve;

use clap::{Parser, Subcommand};

/// Arriva - voice travel assistant relay
#[derive(Debug, Parser)]
#[command(name = "arriva", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the relay server
    Serve {
        /// Host address to bind to (default from config: 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config: 5001)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the effective configuration with secrets masked
    Config,
}
