mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DatabaseConfig, GatewayConfig, LoggingConfig, PmsConfig};
pub use database::StayDb;

use std::path::PathBuf;

/// Returns `~/.config/staysync[-dev]/` based on STAYSYNC_ENV.
///
/// Set STAYSYNC_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STAYSYNC_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("staysync-dev")
    } else {
        base_dir.join("staysync")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
