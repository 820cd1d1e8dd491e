//! HTTP server command
//!
//! Connects the configured backend, ensures the schema, then serves the
//! animal and breeding API until shutdown.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use herdctl_core::DatabaseConfig;
use herdctl_server::db::{connect_with_options, schema, DEFAULT_MAX_CONNECTIONS};
use herdctl_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory served for paths outside the API
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// Pool size for PostgreSQL/MySQL (SQLite always uses one connection)
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let database = DatabaseConfig::from_env().context("Invalid database configuration")?;

    let driver = connect_with_options(&database, args.max_connections)
        .await
        .with_context(|| format!("Failed to connect to {}", database.describe()))?;

    schema::init(driver.as_ref())
        .await
        .context("Failed to initialize schema")?;

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.host, args.port),
        static_dir: Some(args.static_dir),
    };

    tracing::info!("Starting herdctl server on {}", config.bind_addr);

    // Run server (blocks until shutdown), then release the pool either way
    let served = run_server(driver.clone(), config).await.context("Server error");
    driver.close().await;
    tracing::info!("database closed");

    served
}
