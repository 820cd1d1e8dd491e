//! Schema initialization without serving

use anyhow::{Context, Result};
use clap::Parser;

use herdctl_core::DatabaseConfig;
use herdctl_server::db::{connect, schema};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {}

/// Create any missing tables on the configured backend, then exit
pub async fn run_migrate(_args: MigrateArgs) -> Result<()> {
    let database = DatabaseConfig::from_env().context("Invalid database configuration")?;

    let driver = connect(&database)
        .await
        .with_context(|| format!("Failed to connect to {}", database.describe()))?;

    let result = schema::init(driver.as_ref())
        .await
        .context("Failed to initialize schema");
    driver.close().await;
    result?;

    println!("Schema ready on {}", database.describe());
    Ok(())
}
