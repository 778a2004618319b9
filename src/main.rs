/// Main entry point for the habit tracker core
///
/// Sets up logging, resolves the database location, opens the service
/// and reports connectivity. The web collaborator embeds the library
/// directly; this binary exists for local inspection and smoke checks.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_tracker_core::{default_database_path, Config, HabitTrackerService};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };
    let log_filter = format!("habit_tracker_core={}", log_level);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter.clone())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting habit tracker core");

    let database_path = match args.database {
        Some(path) => path,
        None => default_database_path()?,
    };
    info!("Using database at: {}", database_path.display());

    let config = Config::new(database_path, log_filter);
    let service = HabitTrackerService::new(&config).await?;
    service.report_counts()?;

    Ok(())
}
