//! Engine Module
//!
//! The public record engine: a [`RecordStore`] behind a reader/writer lock,
//! with typed access through codecs.
//!
//! ## Responsibilities
//! - Open the backing medium (directory or memory)
//! - Serialize mutations, let reads run concurrently
//! - Encode/decode values at the API boundary
//! - Track the Open → Closed lifecycle

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::codec::Codec;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::store::{RecordStore, StoreStats};

/// The main record engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/update/delete/commit/close): exclusive hold on `state`
///   for the whole operation, including free-list pushes/pops and growth
/// - **Reads** (get/contains/stats): shared hold, many at once
///
/// Encoding and decoding happen outside the lock.
///
/// ## Lifecycle
/// `state` is `Some` while open. `close` flushes and sets it to `None`;
/// every later call fails with [`StoreError::Closed`].
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The store, `None` once closed
    state: RwLock<Option<RecordStore>>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const INDEX_FILENAME: &'static str = "index.rsx";
    const DATA_FILENAME: &'static str = "data.rsd";

    /// Open or create an engine with the given config
    ///
    /// Reopening a directory resolves every previously flushed recid to the
    /// same bytes.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let store = match &config.data_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let index_path = dir.join(Self::INDEX_FILENAME);
                let data_path = dir.join(Self::DATA_FILENAME);
                RecordStore::with_files(&index_path, &data_path, config.page_size)?
            }
            None => RecordStore::ephemeral(config.page_size)?,
        };

        tracing::info!(
            "Opened {} engine: {} index slots, data end {}",
            if config.is_ephemeral() { "in-memory" } else { "file-backed" },
            store.index().size(),
            store.data_end()?
        );

        Ok(Self {
            config,
            state: RwLock::new(Some(store)),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Open an in-memory engine with default settings
    pub fn ephemeral() -> Result<Self> {
        Self::open(Config::default())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Store `value` as a new record and return its recid
    pub fn put<T, C: Codec<T>>(&self, value: &T, codec: &C) -> Result<u64> {
        let bytes = codec.encode(value)?;
        self.write(|store| store.put(&bytes))
    }

    /// Read and decode the record at `recid`
    pub fn get<T, C: Codec<T>>(&self, recid: u64, codec: &C) -> Result<T> {
        let bytes = self.read(|store| store.get(recid))?;
        codec.decode(&bytes)
    }

    /// Replace the value of an existing record
    pub fn update<T, C: Codec<T>>(&self, recid: u64, value: &T, codec: &C) -> Result<()> {
        let bytes = codec.encode(value)?;
        self.write(|store| store.update(recid, &bytes))
    }

    /// Delete a record; its recid and space become reusable
    pub fn delete(&self, recid: u64) -> Result<()> {
        self.write(|store| store.delete(recid))
    }

    /// Check whether `recid` names a live record
    pub fn contains(&self, recid: u64) -> Result<bool> {
        self.read(|store| store.contains(recid))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flush pending writes to the backing medium
    ///
    /// No atomicity: a crash mid-commit may leave a mix of old and new state.
    pub fn commit(&self) -> Result<()> {
        let sync = self.config.commit_sync;
        self.write(|store| {
            store.flush(sync)?;
            tracing::debug!("Committed (data end {})", store.data_end()?);
            Ok(())
        })
    }

    /// Flush and release the store
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();
        let store = state.as_mut().ok_or(StoreError::Closed)?;

        store.flush(self.config.commit_sync)?;
        *state = None;
        tracing::info!("Engine closed");
        Ok(())
    }

    /// True after `close`
    pub fn is_closed(&self) -> bool {
        self.state.read().is_none()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Raw index word at `recid`, reserved slots included
    pub fn index_word(&self, recid: u64) -> Result<u64> {
        self.read(|store| store.index().get(recid))
    }

    /// Live user recids in ascending order
    pub fn live_recids(&self) -> Result<Vec<u64>> {
        self.read(|store| store.live_recids())
    }

    /// Current counters
    pub fn stats(&self) -> Result<StoreStats> {
        self.read(|store| store.stats())
    }

    /// Get the data directory path, `None` when in-memory
    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.config.data_dir.as_ref()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read<R>(&self, f: impl FnOnce(&RecordStore) -> Result<R>) -> Result<R> {
        let state = self.state.read();
        let store = state.as_ref().ok_or(StoreError::Closed)?;
        f(store)
    }

    fn write<R>(&self, f: impl FnOnce(&mut RecordStore) -> Result<R>) -> Result<R> {
        let mut state = self.state.write();
        let store = state.as_mut().ok_or(StoreError::Closed)?;
        f(store)
    }
}
