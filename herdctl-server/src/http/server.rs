//! Axum server setup
//!
//! Server skeleton with:
//! - Permissive CORS (the bundled web page may be served from anywhere)
//! - Tracing middleware
//! - Static files for any path the API does not claim
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::StorageDriver;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Directory served for non-API paths (`None` disables static files)
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: Some(PathBuf::from(".")),
        }
    }
}

/// Shared application state
pub struct AppState {
    driver: Arc<dyn StorageDriver>,
}

impl AppState {
    pub fn new(driver: Arc<dyn StorageDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &dyn StorageDriver {
        self.driver.as_ref()
    }
}

/// Build the application router with all routes
pub fn build_router(driver: Arc<dyn StorageDriver>, config: &ServerConfig) -> Router {
    let router = Router::new()
        .merge(routes::health::router())
        .merge(routes::animals::router())
        .merge(routes::breeding::router());

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(AppState::new(driver)))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// The schema must already be initialized. The caller owns the driver and
/// closes it after this returns.
///
/// # Example
///
/// ```ignore
/// let driver = connect(&DatabaseConfig::from_env()?).await?;
/// schema::init(driver.as_ref()).await?;
/// run_server(driver.clone(), ServerConfig::default()).await?;
/// driver.close().await;
/// ```
pub async fn run_server(
    driver: Arc<dyn StorageDriver>,
    config: ServerConfig,
) -> Result<(), ServerError> {
    if let Some(dir) = &config.static_dir {
        tracing::info!(static_dir = %dir.display(), "Serving static files");
    }
    let app = build_router(driver, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
