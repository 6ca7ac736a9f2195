//! Configuration for recstore
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, StoreError};
use crate::layout::{DEFAULT_PAGE_SIZE, STACK_PAGE_SIZE};

/// Main configuration for an engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the index and data files.
    /// `None` keeps everything in memory and discards it on close.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── index.rsx      (index region)
    ///     └── data.rsd       (data region)
    pub data_dir: Option<PathBuf>,

    /// Size of one address-space page (in bytes)
    pub page_size: usize,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// What `commit` does with the backing files
    pub commit_sync: CommitSync,
}

/// Commit sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSync {
    /// fsync both regions on every commit
    Fsync,

    /// hand pending writes to the OS and return
    OsBuffered,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            commit_sync: CommitSync::Fsync,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// True when no backing directory is configured
    pub fn is_ephemeral(&self) -> bool {
        self.data_dir.is_none()
    }

    /// Check the config before an engine is built from it
    pub fn validate(&self) -> Result<()> {
        if self.page_size % 8 != 0 {
            return Err(StoreError::Config(format!(
                "page size {} is not a multiple of 8",
                self.page_size
            )));
        }
        if (self.page_size as u64) < STACK_PAGE_SIZE {
            return Err(StoreError::Config(format!(
                "page size {} is smaller than a stack page ({} bytes)",
                self.page_size, STACK_PAGE_SIZE
            )));
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
    /// Set the data directory (file-backed mode)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(path.into());
        self
    }

    /// Drop any data directory (in-memory mode)
    pub fn ephemeral(mut self) -> Self {
        self.config.data_dir = None;
        self
    }

    /// Set the address-space page size (in bytes)
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the commit sync strategy
    pub fn commit_sync(mut self, sync: CommitSync) -> Self {
        self.config.commit_sync = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
