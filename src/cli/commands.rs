//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "govrag")]
#[command(about = "Governance policy assistant: RAG chat service and client")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat service
    Serve {
        /// Host to bind to (default: server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Answer one question in-process, without the HTTP service
    Ask {
        /// The question
        question: String,
        /// Print the retrieved source names
        #[arg(long)]
        show_sources: bool,
    },
    /// Interactive chat against a running service
    Chat {
        /// Chat endpoint URL (default: client.service_url)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show readiness of a running service
    Status {
        /// Chat endpoint URL (default: client.service_url)
        #[arg(long)]
        url: Option<String>,
    },
    /// Show current configuration
    Config,
}
