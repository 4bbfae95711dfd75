use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use lumiere_core::config::{AppConfig, LoadOptions};
use lumiere_server::{bootstrap, chat, health};
use tower_http::cors::{AllowOrigin, CorsLayer};

fn init_logging(config: &AppConfig) {
    use lumiere_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let application = bootstrap::bootstrap_with_config(config)?;
    let config = &application.config;

    let app = axum::Router::new()
        .merge(chat::router(application.runtime.clone()))
        .merge(health::router(config))
        .layer(cors_layer(&config.server.allowed_origins)?);

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        llm_model = %config.llm.model,
        "chat server listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(event_name = "system.server.stopping", "chat server stopping");
    Ok(())
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("invalid origin in server.allowed_origins")?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
