/// Runtime configuration
///
/// Resolved once at startup from command line flags; the rest of the
/// system only ever sees the finished `Config`.

use std::path::PathBuf;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Tracing filter directive, e.g. `habit_tracker_core=debug`
    pub log_filter: String,
}

impl Config {
    pub fn new(database_path: PathBuf, log_filter: impl Into<String>) -> Self {
        Self {
            database_path,
            log_filter: log_filter.into(),
        }
    }
}

/// Pick a writable default database path
///
/// Tries the user's home directory, then the platform data and config
/// directories, then the working directory, and proves writability by
/// actually writing a probe file before committing to a location.
pub fn default_database_path() -> Result<PathBuf, std::io::Error> {
    let candidates = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_tracker");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_tracker");
            p
        }),
    ];

    for dir in candidates.iter().flatten() {
        if std::fs::create_dir_all(dir).is_ok() {
            let probe = dir.join(".write_probe");
            if std::fs::write(&probe, "probe").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return Ok(dir.join("habits.db"));
            }
        }
    }

    // Last resort: the temp directory
    let mut temp = std::env::temp_dir();
    temp.push("habit_tracker");
    std::fs::create_dir_all(&temp)?;
    temp.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp.display());
    Ok(temp)
}
