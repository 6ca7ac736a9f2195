//! Storage Module
//!
//! Paged address space: a logical, byte-addressable region backed by an
//! array of fixed-size pages.
//!
//! ## Responsibilities
//! - Translate a logical offset into (page index, offset inside page)
//! - Grow by appending zeroed pages on first write past the end
//! - Read and write ranges that may straddle page boundaries
//! - Flush pending writes to the backing medium
//!
//! ## Addressing
//! ```text
//!  logical offset ──► page = offset / page_size
//!                     in_page = offset % page_size
//!
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │  page 0  │  page 1  │  page 2  │   ...    │
//! └──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! Two backings implement [`PageStore`]: [`FileStore`] (persisted,
//! reopenable) and [`MemoryStore`] (ephemeral, discarded on drop).

mod file;
mod memory;

use std::path::Path;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::CommitSync;
use crate::error::Result;

/// Backing medium for an [`AddressSpace`]
///
/// Offsets passed to `read_at`/`write_at` never cross a page boundary;
/// [`AddressSpace`] splits requests before they reach the store.
pub trait PageStore: Send + Sync {
    /// Size of every page in bytes
    fn page_size(&self) -> usize;

    /// Number of allocated pages
    fn page_count(&self) -> u64;

    /// Fill `buf` from `page` starting at `in_page`
    fn read_at(&self, page: u64, in_page: usize, buf: &mut [u8]) -> Result<()>;

    /// Copy `data` into `page` starting at `in_page`
    fn write_at(&mut self, page: u64, in_page: usize, data: &[u8]) -> Result<()>;

    /// Append one zeroed page
    fn append_page(&mut self) -> Result<()>;

    /// Push pending writes to the backing medium
    fn flush(&mut self, sync: CommitSync) -> Result<()>;
}

/// Logical byte-addressable space over a [`PageStore`]
pub struct AddressSpace {
    store: Box<dyn PageStore>,
    page_size: u64,
}

impl AddressSpace {
    /// Wrap an existing page store
    pub fn new(store: Box<dyn PageStore>) -> Self {
        let page_size = store.page_size() as u64;
        Self { store, page_size }
    }

    /// In-memory address space
    pub fn memory(page_size: usize) -> Self {
        Self::new(Box::new(MemoryStore::new(page_size)))
    }

    /// File-backed address space at `path`, created if missing
    pub fn file(path: &Path, page_size: usize) -> Result<Self> {
        Ok(Self::new(Box::new(FileStore::open(path, page_size)?)))
    }

    /// Size of one page in bytes
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of allocated pages
    pub fn page_count(&self) -> u64 {
        self.store.page_count()
    }

    /// Bytes currently addressable without growing
    pub fn capacity(&self) -> u64 {
        self.store.page_count() * self.page_size
    }

    /// Split a logical offset into (page index, offset inside page)
    pub fn locate(&self, offset: u64) -> (u64, usize) {
        (offset / self.page_size, (offset % self.page_size) as usize)
    }

    /// Grow until every offset below `end` is addressable
    pub fn ensure_capacity(&mut self, end: u64) -> Result<()> {
        if end <= self.capacity() {
            return Ok(());
        }

        let before = self.store.page_count();
        while self.capacity() < end {
            self.store.append_page()?;
        }

        tracing::debug!(
            "Address space grew from {} to {} pages ({} bytes)",
            before,
            self.store.page_count(),
            self.capacity()
        );
        Ok(())
    }

    /// Fill `buf` starting at `offset`
    ///
    /// Pages that were never allocated read as zeroes.
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let page_count = self.store.page_count();
        let mut done = 0;

        while done < buf.len() {
            let (page, in_page) = self.locate(offset + done as u64);
            let chunk = (self.page_size as usize - in_page).min(buf.len() - done);
            let target = &mut buf[done..done + chunk];

            if page < page_count {
                self.store.read_at(page, in_page, target)?;
            } else {
                target.fill(0);
            }
            done += chunk;
        }
        Ok(())
    }

    /// Read `len` bytes starting at `offset`
    pub fn read_bytes(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read(offset, &mut buf)?;
        Ok(buf)
    }

    /// Write `data` at `offset`, growing the space if needed
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.ensure_capacity(offset + data.len() as u64)?;

        let mut done = 0;
        while done < data.len() {
            let (page, in_page) = self.locate(offset + done as u64);
            let chunk = (self.page_size as usize - in_page).min(data.len() - done);
            self.store.write_at(page, in_page, &data[done..done + chunk])?;
            done += chunk;
        }
        Ok(())
    }

    pub fn read_u64(&self, offset: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read(offset, &mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_u16(&self, offset: u64) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read(offset, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    pub fn read_u8(&self, offset: u64) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read(offset, &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_u64(&mut self, offset: u64, value: u64) -> Result<()> {
        self.write(offset, &value.to_be_bytes())
    }

    pub fn write_u8(&mut self, offset: u64, value: u8) -> Result<()> {
        self.write(offset, &[value])
    }

    /// Push pending writes to the backing medium
    pub fn flush(&mut self, sync: CommitSync) -> Result<()> {
        self.store.flush(sync)
    }
}
