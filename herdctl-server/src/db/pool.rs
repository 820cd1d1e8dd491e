//! Driver construction from configuration
//!
//! The backend is chosen once here; nothing downstream branches on it.

use std::sync::Arc;

use herdctl_core::DatabaseConfig;

use super::driver::{StorageDriver, StorageError};
use super::mysql::MySqlDriver;
use super::postgres::PostgresDriver;
use super::sqlite::SqliteDriver;

/// Default maximum connections for server backends.
/// Kept low for a single-farm deployment.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open the configured backend.
///
/// # Errors
///
/// Returns an error if a server backend is unreachable or the SQLite file
/// cannot be created.
///
/// # Example
///
/// ```ignore
/// let driver = connect(&DatabaseConfig::from_env()?).await?;
/// ```
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn StorageDriver>, StorageError> {
    connect_with_options(config, DEFAULT_MAX_CONNECTIONS).await
}

/// Open the configured backend with a custom pool size.
///
/// SQLite always uses a single connection and ignores `max_connections`.
pub async fn connect_with_options(
    config: &DatabaseConfig,
    max_connections: u32,
) -> Result<Arc<dyn StorageDriver>, StorageError> {
    tracing::info!(target = %config.describe(), "Connecting to database");

    let driver: Arc<dyn StorageDriver> = match config {
        DatabaseConfig::Sqlite { path } => Arc::new(SqliteDriver::open(path).await?),
        DatabaseConfig::Postgres { url } => {
            Arc::new(PostgresDriver::connect(url, max_connections).await?)
        }
        DatabaseConfig::MySql(mysql) => Arc::new(MySqlDriver::connect(mysql, max_connections).await?),
    };

    Ok(driver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use herdctl_core::Backend;

    #[tokio::test]
    async fn connects_in_memory_sqlite() {
        let driver = connect(&DatabaseConfig::in_memory()).await.unwrap();
        assert_eq!(driver.backend(), Backend::Sqlite);
        driver.init_schema().await.unwrap();
        driver.close().await;
    }
}
