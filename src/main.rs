//! Anthropic API relay (v1)
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!   Browser              │                 anthropic-relay               │
//!   ─────────────────────┼─▶ OPTIONS *            → preflight (200, CORS)│
//!                        │   POST /api/anthropic  → relay ──────────────┼──▶ api.anthropic.com
//!                        │   anything else        → static files        │     /v1/messages
//!   ◀────────────────────┼── response + CORS  ◀── relay ◀───────────────┼───
//!                        └───────────────────────────────────────────────┘
//! ```
//!
//! `serve` runs the standalone server (default). `invoke` handles a single
//! function event read from stdin and prints the result to stdout.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use anthropic_relay::config::{load_config_for, Deployment, RelayConfig};
use anthropic_relay::function::{FunctionEvent, FunctionHandler};
use anthropic_relay::lifecycle::startup;
use anthropic_relay::observability::logging;

#[derive(Parser)]
#[command(name = "anthropic-relay")]
#[command(about = "CORS relay for the Anthropic messages API", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standalone server
    Serve {
        /// Override listener.bind_address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Handle one function event from stdin
    Invoke,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve { bind: None });

    let deployment = match &command {
        Commands::Serve { .. } => Deployment::Server,
        Commands::Invoke => Deployment::Function,
    };
    let mut config = match &cli.config {
        Some(path) => load_config_for(path, deployment)?,
        None => deployment.defaults(),
    };

    logging::init(&config.observability);
    tracing::info!("anthropic-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }
            startup::run_server(config).await
        }
        Commands::Invoke => invoke(&config).await,
    }
}

async fn invoke(config: &RelayConfig) -> Result<(), Box<dyn Error>> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let event: FunctionEvent = serde_json::from_str(&input)?;

    let handler = FunctionHandler::from_config(config)?;
    let result = handler.invoke(event).await;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
