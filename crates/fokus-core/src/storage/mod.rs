mod config;
pub mod database;

pub use config::{Config, TimerConfig};
pub use database::{Database, PersistedTimer};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the Fokus data directory.
///
/// `FOKUS_DATA_DIR` wins when set. Otherwise `~/.config/fokus[-dev]/`,
/// with the `-dev` suffix selected by `FOKUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("FOKUS_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOKUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("fokus-dev")
            } else {
                base_dir.join("fokus")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
