//! Index Table
//!
//! Dense array of 64-bit slots, slot `recid` at byte offset `recid * 8`.

use crate::config::CommitSync;
use crate::error::{Result, StoreError};
use crate::layout::{header_word, FIRST_USER_RECID, INDEX_ENTRY_SIZE, RECID_HEADER, RECID_SLOT_COUNT};
use crate::storage::AddressSpace;

use super::{EntryKind, IndexEntry};

/// Index table persisted on its own address space
///
/// The logical slot count lives in slot `RECID_SLOT_COUNT` so it survives
/// reopen; the header word in slot `RECID_HEADER` identifies the format.
pub struct IndexTable {
    space: AddressSpace,
    /// Cached copy of the persisted slot count
    slot_count: u64,
}

impl IndexTable {
    /// Open an index table, initializing an empty space
    ///
    /// A fresh table holds every reserved slot, zeroed, and nothing else.
    pub fn open(mut space: AddressSpace) -> Result<Self> {
        let header = space.read_u64(RECID_HEADER * INDEX_ENTRY_SIZE)?;

        if header == 0 {
            let end = FIRST_USER_RECID * INDEX_ENTRY_SIZE;
            space.write(0, &vec![0u8; end as usize])?;
            space.write_u64(RECID_HEADER * INDEX_ENTRY_SIZE, header_word())?;
            space.write_u64(RECID_SLOT_COUNT * INDEX_ENTRY_SIZE, FIRST_USER_RECID)?;

            tracing::debug!("Initialized index table with {} reserved slots", FIRST_USER_RECID);
            return Ok(Self {
                space,
                slot_count: FIRST_USER_RECID,
            });
        }

        if header != header_word() {
            return Err(StoreError::Corruption(format!(
                "bad index header: expected {:#018x}, got {:#018x}",
                header_word(),
                header
            )));
        }

        let slot_count = space.read_u64(RECID_SLOT_COUNT * INDEX_ENTRY_SIZE)?;
        if slot_count < FIRST_USER_RECID {
            return Err(StoreError::Corruption(format!(
                "index slot count {} below reserved range {}",
                slot_count, FIRST_USER_RECID
            )));
        }

        Ok(Self { space, slot_count })
    }

    /// Raw word stored at `recid`
    pub fn get(&self, recid: u64) -> Result<u64> {
        self.check_bounds(recid)?;
        self.space.read_u64(recid * INDEX_ENTRY_SIZE)
    }

    /// Overwrite the raw word at `recid`
    pub fn set(&mut self, recid: u64, word: u64) -> Result<()> {
        self.check_bounds(recid)?;
        self.space.write_u64(recid * INDEX_ENTRY_SIZE, word)
    }

    /// Decoded entry at `recid`
    pub fn entry(&self, recid: u64, kind: EntryKind) -> Result<IndexEntry> {
        Ok(IndexEntry::decode(self.get(recid)?, kind))
    }

    /// Store an entry at `recid`
    pub fn set_entry(&mut self, recid: u64, entry: IndexEntry) -> Result<()> {
        self.set(recid, entry.encode())
    }

    /// Logical number of slots, reserved ones included
    pub fn size(&self) -> u64 {
        self.slot_count
    }

    /// Extend the table to `slot_count` slots, zero-filling the new ones
    pub fn grow(&mut self, slot_count: u64) -> Result<()> {
        if slot_count <= self.slot_count {
            return Ok(());
        }

        let start = self.slot_count * INDEX_ENTRY_SIZE;
        let len = (slot_count - self.slot_count) * INDEX_ENTRY_SIZE;
        self.space.write(start, &vec![0u8; len as usize])?;
        self.space.write_u64(RECID_SLOT_COUNT * INDEX_ENTRY_SIZE, slot_count)?;
        self.slot_count = slot_count;
        Ok(())
    }

    /// Append one slot and return its recid
    pub fn push_slot(&mut self) -> Result<u64> {
        let recid = self.slot_count;
        self.grow(recid + 1)?;
        Ok(recid)
    }

    /// Borrow the backing address space
    pub fn space(&self) -> &AddressSpace {
        &self.space
    }

    pub fn flush(&mut self, sync: CommitSync) -> Result<()> {
        self.space.flush(sync)
    }

    fn check_bounds(&self, recid: u64) -> Result<()> {
        if recid >= self.slot_count {
            return Err(StoreError::InvalidArgument(format!(
                "recid {} beyond index size {}",
                recid, self.slot_count
            )));
        }
        Ok(())
    }
}
