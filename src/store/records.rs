//! Record allocation
//!
//! Byte-level put/get/update/delete over the index table and data region.

use crate::error::{Result, StoreError};
use crate::index::{EntryKind, IndexEntry};
use crate::layout::{EMPTY_RECORD_OFFSET, FIRST_USER_RECID, MAX_RECORD_SIZE, RECID_FREE_RECIDS};

use super::RecordStore;

/// Point-in-time counters of a record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Logical index slots, reserved ones included
    pub index_slots: u64,
    /// User recids with a non-empty entry
    pub live_records: u64,
    /// Recids waiting on the free-recid stack
    pub free_recids: u64,
    /// Next append offset in the data region
    pub data_end: u64,
    /// Pages allocated to the index region
    pub index_pages: u64,
    /// Pages allocated to the data region
    pub data_pages: u64,
}

impl RecordStore {
    /// Store `bytes` as a new record and return its recid
    pub fn put(&mut self, bytes: &[u8]) -> Result<u64> {
        check_record_size(bytes.len())?;

        let offset = self.allocate_span(bytes.len())?;
        let recid = self.allocate_recid()?;

        self.index.set_entry(recid, IndexEntry::record(bytes.len(), offset))?;
        if !bytes.is_empty() {
            self.data.write(offset, bytes)?;
        }
        Ok(recid)
    }

    /// Payload of the record at `recid`
    pub fn get(&self, recid: u64) -> Result<Vec<u8>> {
        let entry = self.live_entry(recid)?;
        match entry.size() {
            0 => Ok(Vec::new()),
            size => self.data.read_bytes(entry.offset(), size),
        }
    }

    /// Replace the payload of `recid`
    ///
    /// Same length overwrites in place; otherwise the old span is released
    /// and the record moves to a fresh one.
    pub fn update(&mut self, recid: u64, bytes: &[u8]) -> Result<()> {
        check_record_size(bytes.len())?;
        let entry = self.live_entry(recid)?;

        if entry.size() == bytes.len() {
            if !bytes.is_empty() {
                self.data.write(entry.offset(), bytes)?;
            }
            return Ok(());
        }

        if entry.size() > 0 {
            self.release_span(entry.offset(), entry.size())?;
        }
        let offset = self.allocate_span(bytes.len())?;

        self.index.set_entry(recid, IndexEntry::record(bytes.len(), offset))?;
        if !bytes.is_empty() {
            self.data.write(offset, bytes)?;
        }
        Ok(())
    }

    /// Free `recid` and its span for reuse
    pub fn delete(&mut self, recid: u64) -> Result<()> {
        let entry = self.live_entry(recid)?;

        if entry.size() > 0 {
            self.release_span(entry.offset(), entry.size())?;
        }
        self.index.set_entry(recid, IndexEntry::Empty)?;
        self.stack_push(RECID_FREE_RECIDS, recid)
    }

    /// True when `recid` names a live record
    pub fn contains(&self, recid: u64) -> Result<bool> {
        match self.live_entry(recid) {
            Ok(_) => Ok(true),
            Err(StoreError::RecordNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// All live user recids in ascending order
    pub fn live_recids(&self) -> Result<Vec<u64>> {
        let mut recids = Vec::new();
        for recid in FIRST_USER_RECID..self.index.size() {
            if self.index.get(recid)? != 0 {
                recids.push(recid);
            }
        }
        Ok(recids)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            index_slots: self.index.size(),
            live_records: self.live_recids()?.len() as u64,
            free_recids: self.stack_values(RECID_FREE_RECIDS)?.len() as u64,
            data_end: self.data_end()?,
            index_pages: self.index.space().page_count(),
            data_pages: self.data.page_count(),
        })
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Decoded entry of a live user record
    fn live_entry(&self, recid: u64) -> Result<IndexEntry> {
        if recid < FIRST_USER_RECID {
            return Err(StoreError::InvalidArgument(format!(
                "recid {} is reserved (user recids start at {})",
                recid, FIRST_USER_RECID
            )));
        }
        if recid >= self.index.size() {
            return Err(StoreError::RecordNotFound(recid));
        }

        match self.index.entry(recid, EntryKind::Record)? {
            IndexEntry::Empty => Err(StoreError::RecordNotFound(recid)),
            entry => Ok(entry),
        }
    }

    /// Recycled recid if one is free, else a new index slot
    fn allocate_recid(&mut self) -> Result<u64> {
        if let Some(recid) = self.stack_pop(RECID_FREE_RECIDS)? {
            debug_assert_eq!(self.index.get(recid)?, 0, "reused recid {} is not free", recid);
            return Ok(recid);
        }
        self.index.push_slot()
    }

    /// Freed span of `len` bytes if one fits, else fresh space at the end
    fn allocate_span(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Ok(EMPTY_RECORD_OFFSET);
        }
        match self.acquire_span(len)? {
            Some(offset) => Ok(offset),
            None => self.append_span(len),
        }
    }
}

fn check_record_size(size: usize) -> Result<()> {
    if size > MAX_RECORD_SIZE {
        return Err(StoreError::RecordTooLarge {
            size,
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(())
}
