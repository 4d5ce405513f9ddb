//! Configuration for pnwal
//!
//! Centralized writer configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, WalError};

/// Main configuration for a log writer
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Path of the log file. The writer creates it and refuses to reuse an
    /// existing file.
    pub wal_path: PathBuf,

    /// Size of the in-process write buffer in front of the file (in bytes)
    pub write_buffer_size: usize,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// When false, `open_writer` hands out a writer that persists nothing
    pub logging_enabled: bool,

    /// Sync strategy: how often appended frames are forced to disk
    pub sync_strategy: SyncStrategy,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every frame (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced frames (balanced durability/performance)
    EveryNEntries { count: usize },

    /// Only sync when the caller asks for it
    Manual,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("./document.wal"),
            write_buffer_size: 64 * 1024, // 64 KB
            logging_enabled: true,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the writer cannot honour
    pub fn validate(&self) -> Result<()> {
        if let SyncStrategy::EveryNEntries { count: 0 } = self.sync_strategy {
            return Err(WalError::Config(
                "EveryNEntries sync strategy needs a count above zero".to_string(),
            ));
        }
        if self.write_buffer_size == 0 {
            return Err(WalError::Config("write buffer size must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn wal_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wal_path = path.into();
        self
    }

    /// Set the write buffer size (in bytes)
    pub fn write_buffer_size(mut self, size: usize) -> Self {
        self.config.write_buffer_size = size;
        self
    }

    /// Enable or disable durable logging
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.config.logging_enabled = enabled;
        self
    }

    /// Set the WAL sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
