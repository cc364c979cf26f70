/**
 * Task Social Server Entry Point
 *
 * Loads configuration, starts the Axum server with the WebSocket route and
 * the background tasks, and closes every live connection on Ctrl-C.
 */

use std::net::SocketAddr;
use std::sync::Arc;

use task_social::backend::realtime::WsRegistry;
use task_social::backend::server::create_app;
use task_social::shared::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,task_social=debug".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[STARTUP] Server initialization started");

    let config = AppConfig::from_env()?;
    let port = config.port;

    let (app, state, tasks) = create_app(config).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[STARTUP] Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&state.registry)))
        .await?;

    tasks.abort();
    tracing::info!("[SHUTDOWN] Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C after closing every live connection
async fn shutdown_signal(registry: Arc<WsRegistry>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    let closed = registry.close_all();
    tracing::info!(closed, "[SHUTDOWN] Ctrl-C received, connections closed");
}
