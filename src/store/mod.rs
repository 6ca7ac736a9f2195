//! Record Store
//!
//! The unlocked core of the engine: an index table plus a data region, and
//! the allocation algorithms that tie them together.
//!
//! ## Responsibilities
//! - Persistent LIFO stacks (free recids, free spans) in the data region
//! - Size-bucketed reuse of freed spans
//! - Record put/get/update/delete at the byte level
//!
//! ## Concurrency
//! Nothing here locks. Mutating methods take `&mut self`; the
//! [`Engine`](crate::Engine) wraps the store in a RwLock and holds the
//! exclusive side for every mutation.
//!
//! ## Data Region
//! ```text
//! 0      8
//! ┌──────┬─────────┬──────────┬─────────┬─────────────┬──────────►
//! │ null │ payload │ stk page │ payload │ payload ... │  append
//! └──────┴─────────┴──────────┴─────────┴─────────────┴──────────►
//! ```
//! Payloads may straddle address-space pages; stack pages never do.

mod buckets;
mod records;
mod stack;

use std::path::Path;

pub use buckets::size_to_bucket;
pub use records::StoreStats;

use crate::config::CommitSync;
use crate::error::{Result, StoreError};
use crate::index::IndexTable;
use crate::layout::{DATA_START, RECID_DATA_END, STACK_PAGE_SIZE};
use crate::storage::AddressSpace;

/// Index table + data region with no locking of its own
pub struct RecordStore {
    /// recid → packed (size, offset)
    index: IndexTable,

    /// Payloads and stack pages, append-only
    data: AddressSpace,
}

impl RecordStore {
    /// Build a store over the two regions, initializing them when empty
    pub fn open(index: AddressSpace, data: AddressSpace) -> Result<Self> {
        if data.page_size() < STACK_PAGE_SIZE {
            return Err(StoreError::Config(format!(
                "data page size {} cannot hold a {} byte stack page",
                data.page_size(),
                STACK_PAGE_SIZE
            )));
        }

        let mut index = IndexTable::open(index)?;

        if index.get(RECID_DATA_END)? == 0 {
            index.set(RECID_DATA_END, DATA_START)?;
        }

        Ok(Self { index, data })
    }

    /// Store whose regions live in memory only
    pub fn ephemeral(page_size: usize) -> Result<Self> {
        Self::open(AddressSpace::memory(page_size), AddressSpace::memory(page_size))
    }

    /// Store over two files, created if missing
    pub fn with_files(index_path: &Path, data_path: &Path, page_size: usize) -> Result<Self> {
        Self::open(
            AddressSpace::file(index_path, page_size)?,
            AddressSpace::file(data_path, page_size)?,
        )
    }

    /// Borrow the index table
    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Borrow the data region
    pub fn data(&self) -> &AddressSpace {
        &self.data
    }

    /// Next append offset in the data region
    pub fn data_end(&self) -> Result<u64> {
        self.index.get(RECID_DATA_END)
    }

    /// Flush both regions
    pub fn flush(&mut self, sync: CommitSync) -> Result<()> {
        self.index.flush(sync)?;
        self.data.flush(sync)
    }

    // =========================================================================
    // Data Region Growth
    // =========================================================================

    /// Reserve `len` fresh bytes at the end of the data region
    fn append_span(&mut self, len: usize) -> Result<u64> {
        let offset = self.data_end()?;
        self.extend_to(offset + len as u64)?;
        Ok(offset)
    }

    /// Reserve a stack page at the end of the data region
    ///
    /// A page that would cross an address-space page boundary starts at the
    /// next boundary instead; the skipped tail is never used.
    fn append_stack_page(&mut self) -> Result<u64> {
        let mut offset = self.data_end()?;
        let page_size = self.data.page_size();

        if offset % page_size + STACK_PAGE_SIZE > page_size {
            offset = (offset / page_size + 1) * page_size;
        }

        self.extend_to(offset + STACK_PAGE_SIZE)?;
        tracing::debug!("Allocated stack page at data offset {}", offset);
        Ok(offset)
    }

    fn extend_to(&mut self, end: u64) -> Result<()> {
        self.data.ensure_capacity(end)?;
        self.index.set(RECID_DATA_END, end)
    }
}
