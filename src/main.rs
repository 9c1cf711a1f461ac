mod commands;
mod output;

use clap::Parser;
use sqlmem::{Config, Error, MemoryStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use commands::Commands;
use output::{ErrorResponse, print_json};

/// sqlmem - Collection-oriented memory entries stored in SQLite
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Override the database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config, Error> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    match &cli.database {
        Some(path) => config.with_database_path(path),
        None => Ok(config),
    }
}

async fn run(cli: &Cli) -> Result<ExitCode, Error> {
    if let Commands::Version = cli.command {
        return commands::handle_version(cli.json);
    }

    let config = load_config(cli)?;
    let store = MemoryStore::connect_sqlite(&config).await?;
    let result = commands::execute(&cli.command, &store, &config, cli.json).await;
    let closed = store.close();
    let code = result?;
    closed?;
    Ok(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                    kind: format!("{:?}", e.kind()),
                });
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
