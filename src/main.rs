use anyhow::{Context, Result};
use lnurlp_receiver::{app::create_app, config::Config, handlers::AppState, logging};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration; LOG_DIR is needed before tracing starts
    let config = Config::from_env()?;

    // Flushes buffered file logs when dropped at the end of main
    let _log_guard = logging::init(&config.log_dir)?;

    tracing::info!("Starting LNURLp receiver v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Configuration loaded (storage: {}, logs: {}, whitelist enabled: {})",
        config.storage_dir.display(),
        config.log_dir.display(),
        config.whitelist.enabled
    );

    tokio::fs::create_dir_all(&config.storage_dir)
        .await
        .with_context(|| format!("Failed to create storage dir {}", config.storage_dir.display()))?;

    if config.whitelist.enabled {
        tracing::info!("IP whitelist enabled: {:?}", config.whitelist.addresses);
    }

    let state = AppState::new(&config.storage_dir);
    let app = create_app(state, config.whitelist.clone());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Webhook endpoint: http://{}/webhook", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
