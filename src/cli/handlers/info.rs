//! Information display handlers

use crate::cli::output::print_config;
use crate::cli::output::print_error;
use crate::cli::output::print_health;
use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::AppConfig;
use crate::Result;

pub async fn handle_status(config: &AppConfig, url: Option<String>) -> Result<()> {
    let client_config = ClientConfig {
        service_url: url.unwrap_or_else(|| config.client.service_url.clone()),
        ..config.client.clone()
    };
    let client = ChatClient::new(&client_config)?;

    match client.health().await {
        Ok(health) => print_health(&health),
        Err(e) => print_error(&e.user_message()),
    }
    Ok(())
}

pub fn handle_config(config: &AppConfig) {
    print_config(config);
}
