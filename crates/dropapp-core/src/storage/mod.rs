mod config;
pub mod database;

pub use config::{AlertsConfig, Config, TimerConfig};
pub use database::{Database, DrinkRecord, Stats};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `DROPAPP_DATA_DIR` overrides the location outright, which is what the
/// test suites use. Otherwise the directory is `~/.config/dropapp/`, or
/// `~/.config/dropapp-dev/` when `DROPAPP_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var("DROPAPP_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DROPAPP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dropapp-dev")
            } else {
                base_dir.join("dropapp")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
