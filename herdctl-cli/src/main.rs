//! herdctl CLI - livestock records service
//!
//! Entry point for the `herdctl` binary:
//! - `serve`: HTTP API for animals and breeding records
//! - `migrate`: create missing tables on the configured backend
//! - `backend`: show which storage backend the environment selects
//! - `completions`: shell completion scripts
//!
//! The backend comes from the environment (and `.env` in the working
//! directory): MySQL when `MYSQL_HOST`/`MYSQL_USER`/`MYSQL_DATABASE` are set,
//! PostgreSQL when `DATABASE_URL` is set, SQLite at `SQLITE_PATH` otherwise.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "herdctl",
    author,
    version,
    about = "Animal and breeding records over SQLite, PostgreSQL or MySQL",
    long_about = "Keep a herd register and breeding log behind a small JSON API. \
                  The storage backend is chosen from the environment at startup."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create missing tables on the configured backend and exit
    Migrate(commands::migrate::MigrateArgs),
    /// Show which storage backend the environment selects
    Backend(commands::backend::BackendArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Migrate(args) => commands::run_migrate(args).await?,
        Commands::Backend(args) => commands::run_backend(args)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
