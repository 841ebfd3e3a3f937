mod config;
pub mod database;
pub mod repository;

pub use config::{Config, GaugeConfig, HistoryConfig, WritingConfig};
pub use database::Database;
pub use repository::{MemoryRepository, SessionRepository};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `INKWELL_DATA_DIR` wins when set; otherwise `~/.config/inkwell[-dev]/`
/// based on `INKWELL_ENV` (set `INKWELL_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("INKWELL_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("INKWELL_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("inkwell-dev")
            } else {
                base_dir.join("inkwell")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
