//! HTTP server implementation

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::api::session::SessionManager;
use crate::config::AppConfig;
use crate::rag::RagService;
use crate::Result;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Router with middleware layers applied
pub fn build_app(state: AppState, enable_cors: bool) -> Router {
    let mut app = routes::chat_routes(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server.
///
/// The listener accepts requests immediately while the pipeline initializes in
/// the background; until then `/chat` answers 503.
pub async fn serve_api(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting governance RAG API server...");

    let rag = Arc::new(RagService::new(config));
    let session_manager = Arc::new(
        SessionManager::new(config.session.idle_timeout_secs, config.session.max_messages)
            .with_max_sessions(config.session.max_sessions),
    );

    let state = AppState {
        rag: rag.clone(),
        session_manager,
        environment: config.server.environment.clone(),
    };

    tokio::spawn(async move {
        if let Err(e) = rag.initialize().await {
            error!("Service will report unhealthy: {}", e);
        }
    });

    let app = build_app(state, enable_cors);

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("🏷️  Environment: {}", config.server.environment);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /             - Readiness and health");
    info!("  GET  /health       - Readiness and health");
    info!("  POST /chat         - Ask a question");
    info!("  POST /chat-legacy  - Ask a question (lenient request parsing)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
