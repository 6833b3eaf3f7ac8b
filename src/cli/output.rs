//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `govrag` CLI

use crate::api::types::HealthResponse;
use crate::AppConfig;

/// Print configuration, credentials masked
pub fn print_config(config: &AppConfig) {
    let config = config.redacted();
    println!("📋 GovRAG Configuration:");
    println!("  Server:");
    println!("    Bind: {}", config.bind_address());
    println!("    Environment: {}", config.server.environment);
    println!("    CORS: {}", config.server.cors);
    println!("  Logging:");
    println!("    Level: {}", config.logging.level);
    println!("    File output: {} ({})", config.logging.file_output, config.logging.dir);
    println!("  Embeddings:");
    println!("    Provider: {}", config.embeddings.provider);
    println!("    Model: {}", config.embeddings.model);
    println!("    Endpoint: {}", config.embeddings.endpoint);
    println!("    Dimension: {}", config.embeddings.dimension);
    println!(
        "    API key: {}",
        config.embeddings.api_key.as_deref().unwrap_or("(none)")
    );
    println!("  Index:");
    println!("    Directory: {}", config.index_dir().display());
    println!("    Top k: {}", config.top_k());
    println!("  Language model:");
    println!("    Provider: {}", config.llm.provider);
    println!("    Local: {} @ {}", config.llm.local_model, config.llm.local_endpoint);
    println!(
        "    Hosted inference: {} @ {} (token: {})",
        config.llm.inference_model,
        config.llm.inference_endpoint,
        config.llm.inference_token.as_deref().unwrap_or("(none)")
    );
    println!(
        "    Chat completion: {} @ {} (key: {})",
        config.llm.chat_model,
        config.llm.chat_endpoint,
        config.llm.chat_api_key.as_deref().unwrap_or("(none)")
    );
    println!(
        "    Sampling: temperature {}, max_new_tokens {}, top_p {}, repetition_penalty {}",
        config.llm.temperature,
        config.llm.max_new_tokens,
        config.llm.top_p,
        config.llm.repetition_penalty
    );
    println!("  Client:");
    println!("    Service URL: {}", config.client.service_url);
    if let Some(legacy) = &config.client.legacy_url {
        println!("    Legacy URL: {legacy}");
    }
    println!("    Timeout: {}s", config.client.timeout_secs);
    println!("  Sessions:");
    println!("    Idle timeout: {}s", config.session.idle_timeout_secs);
    println!("    Max messages: {}", config.session.max_messages);
    println!("    Max sessions: {}", config.session.max_sessions);
}

/// Print a health report
pub fn print_health(health: &HealthResponse) {
    let icon = if health.ready { "✅" } else if health.error.is_some() { "❌" } else { "⏳" };
    println!("{icon} Service {} ({})", health.status, health.state);
    println!("  Environment: {}", health.environment);
    if let Some(backend) = &health.backend {
        println!("  Backend: {backend}");
    }
    if let Some(error) = &health.error {
        println!("  Error: {error}");
    }
    println!("  Active sessions: {}", health.active_sessions);
    println!("  Version: {}", health.version);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ Error: {message}");
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {message}");
}
