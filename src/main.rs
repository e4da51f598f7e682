//! Chatpad - terminal chat client
//!
#![doc = "Chatpad - terminal chat client"]
#![doc = "Main entry point for the Chatpad application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatpad::cli::{Cli, Commands};
use chatpad::commands;
use chatpad::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { new, session } => {
            if new {
                tracing::debug!("Starting in a new session");
            }
            if let Some(s) = &session {
                tracing::debug!("Resuming session: {}", s);
            }

            commands::chat::run_chat(config, new, session).await?;
            Ok(())
        }
        Commands::Send { text, new } => {
            tracing::info!("Sending one message");
            commands::send::run_send(config, text, new).await?;
            Ok(())
        }
        Commands::Sessions { command } => {
            tracing::info!("Starting sessions command");
            commands::handle_sessions(&config, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` raises the crate level
/// to debug.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chatpad=debug" } else { "chatpad=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
