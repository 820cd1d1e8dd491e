//! Report which backend the environment selects

use anyhow::{Context, Result};
use clap::Parser;

use herdctl_core::DatabaseConfig;

/// Arguments for the backend command
#[derive(Parser, Debug)]
pub struct BackendArgs {
    /// Print only the backend name (sqlite, postgres or mysql)
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Print the selected backend without connecting to it
pub fn run_backend(args: BackendArgs) -> Result<()> {
    let database = DatabaseConfig::from_env().context("Invalid database configuration")?;

    if args.quiet {
        println!("{}", database.backend());
    } else {
        println!("{}: {}", database.backend(), database.describe());
    }
    Ok(())
}
