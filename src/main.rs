use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use persona_chat::adapters::access::InMemoryAccessCodeRegistry;
use persona_chat::adapters::ai::{GeminiConfig, GeminiProvider, KeyRotatingProvider};
use persona_chat::adapters::http::{app_router, AccessHandlers, ChatHandlers};
use persona_chat::application::{StreamChatConfig, StreamChatHandler, ValidateAccessCodeHandler};
use persona_chat::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    tracing::info!(
        environment = ?config.server.environment,
        model = %config.ai.model,
        search = config.ai.enable_search,
        "Starting persona chat backend"
    );

    if !config.ai.has_api_keys() {
        tracing::warn!("No API keys configured; every chat request will fail until PERSONA_CHAT__AI__API_KEYS is set");
    }

    let gemini = GeminiProvider::new(
        GeminiConfig::new()
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout()),
    )?;
    let rotating = KeyRotatingProvider::new(Arc::new(gemini), config.ai.api_keys.clone());
    let chat_handler = StreamChatHandler::new(
        Arc::new(rotating),
        StreamChatConfig {
            utc_offset_minutes: config.persona.utc_offset_minutes,
            enable_search: config.ai.enable_search,
        },
    );

    let registry = match &config.access.codes_json {
        Some(json) => InMemoryAccessCodeRegistry::from_json(json)?,
        None => InMemoryAccessCodeRegistry::new(),
    };
    tracing::info!(codes = registry.len(), "Access code registry loaded");
    let access_handler = ValidateAccessCodeHandler::new(Arc::new(registry));

    let app = app_router(
        ChatHandlers::new(Arc::new(chat_handler)),
        AccessHandlers::new(Arc::new(access_handler)),
    )
    .layer(cors_layer(&config.server))
    .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
