mod config;
pub mod database;
mod memory;

pub use config::{
    Config, LoggingConfig, ProgramConfig, StatusConfig, StorageConfig, Thresholds, STORAGE_KEY,
};
pub use database::Database;
pub use memory::MemoryStorage;

use std::path::PathBuf;

use crate::error::StorageError;

/// Persistence backend for the serialized state blob.
///
/// Same get/set/remove contract whether the blob lands in SQLite or in a
/// process-local map.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Whether writes outlive the process.
    fn is_durable(&self) -> bool {
        true
    }
}

/// Returns `~/.config/phoenix[-dev]/`.
///
/// `PHOENIX_DATA_DIR` overrides the location entirely; otherwise
/// `PHOENIX_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("PHOENIX_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PHOENIX_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("phoenix-dev")
            } else {
                base_dir.join("phoenix")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
