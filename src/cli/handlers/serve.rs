//! API server handlers

use crate::api::serve_api;
use crate::AppConfig;
use crate::Result;

pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    // CLI arguments take priority over config
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.cors;

    println!("🚀 Starting GovRAG Chat Service");
    println!("===============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🏷️  Environment: {}", config.server.environment);
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!("📚 Index: {}", config.index_dir().display());
    println!();

    serve_api(config, host, port, cors).await
}
