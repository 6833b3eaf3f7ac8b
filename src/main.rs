use anyhow::Context;
use clap::Parser;
use govrag::cli::handle_ask;
use govrag::cli::handle_chat;
use govrag::cli::handle_config;
use govrag::cli::handle_serve;
use govrag::cli::handle_status;
use govrag::cli::Cli;
use govrag::cli::Commands;
use govrag::config::AppConfig;
use govrag::logging;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };

    let level = cli.verbose.then_some("debug");

    match cli.command {
        Commands::Serve { host, port, cors } => {
            // Keep the guard alive so the file writer flushes on exit
            let _guard = logging::init_logging_with_config(&config.logging, level)?;
            info!("Configuration loaded successfully");
            handle_serve(&config, host, port, cors).await?;
        }
        Commands::Ask {
            question,
            show_sources,
        } => {
            logging::init_simple_logging(level.or(Some("warn")))?;
            handle_ask(&config, question, show_sources).await?;
        }
        Commands::Chat { url } => {
            logging::init_simple_logging(level.or(Some("warn")))?;
            handle_chat(&config, url).await?;
        }
        Commands::Status { url } => {
            logging::init_simple_logging(level.or(Some("warn")))?;
            handle_status(&config, url).await?;
        }
        Commands::Config => handle_config(&config),
    }

    Ok(())
}
