//! In-memory page store
//!
//! Growable pool of heap buffers. Contents vanish with the store.

use crate::config::CommitSync;
use crate::error::Result;

use super::PageStore;

/// Ephemeral page store backed by heap buffers
pub struct MemoryStore {
    pages: Vec<Box<[u8]>>,
    page_size: usize,
}

impl MemoryStore {
    /// Create an empty store with the given page size
    pub fn new(page_size: usize) -> Self {
        Self {
            pages: Vec::new(),
            page_size,
        }
    }
}

impl PageStore for MemoryStore {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn page_count(&self) -> u64 {
        self.pages.len() as u64
    }

    fn read_at(&self, page: u64, in_page: usize, buf: &mut [u8]) -> Result<()> {
        let src = &self.pages[page as usize];
        buf.copy_from_slice(&src[in_page..in_page + buf.len()]);
        Ok(())
    }

    fn write_at(&mut self, page: u64, in_page: usize, data: &[u8]) -> Result<()> {
        let dst = &mut self.pages[page as usize];
        dst[in_page..in_page + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn append_page(&mut self) -> Result<()> {
        self.pages.push(vec![0u8; self.page_size].into_boxed_slice());
        Ok(())
    }

    fn flush(&mut self, _sync: CommitSync) -> Result<()> {
        // Nothing to persist
        Ok(())
    }
}
