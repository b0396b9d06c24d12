//! Error types for toolpulse-core
//!
//! Internal operations return these errors; the store's public boundary turns
//! them into outcome values so a single failure never escapes as a panic.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised inside the event store
#[derive(Error, Debug)]
pub enum StoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file: {path}")]
    FileRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory: {path}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize partition {date}")]
    Serialize {
        date: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Lock Errors
    // ===================
    #[error("Lock acquisition timeout after {}ms: {path}", timeout.as_millis())]
    LockTimeout { path: PathBuf, timeout: Duration },

    #[error("Failed to acquire lock {path}")]
    LockIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// True when the failure is "file does not exist" (treated as empty data)
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::FileRead { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {message}")]
    Parse {
        path: PathBuf,
        message: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
