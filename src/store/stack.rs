//! Persistent LIFO stack
//!
//! Free lists stored as a singly linked chain of fixed-size pages in the
//! data region. The index slot of the head recid points at the newest page.
//!
//! ## Page Layout
//! ```text
//! byte 0        count of stored values (1..=100)
//! bytes 1..8    low bytes of the previous head word (link, 16|48 packed)
//! bytes 8..     values, oldest first; slot count-1 is the top
//! ```
//! The count byte overwrites the high byte of the link's tag, so the link is
//! always read through `OFFSET_MASK`.

use crate::error::Result;
use crate::index::{EntryKind, IndexEntry};
use crate::layout::{OFFSET_MASK, STACK_VALUES_PER_PAGE};

use super::RecordStore;

/// Offset of value slot `slot` within the page at `page`
fn slot_offset(page: u64, slot: usize) -> u64 {
    page + 8 + slot as u64 * 8
}

impl RecordStore {
    /// Push `value` onto the stack rooted at `head`
    pub fn stack_push(&mut self, head: u64, value: u64) -> Result<()> {
        let head_entry = self.index.entry(head, EntryKind::StackHead)?;
        let page = head_entry.offset();

        if page != 0 {
            let count = self.data.read_u8(page)? as usize;
            debug_assert!(count <= STACK_VALUES_PER_PAGE, "stack page count {} out of range", count);

            if count < STACK_VALUES_PER_PAGE {
                self.data.write_u64(slot_offset(page, count), value)?;
                self.data.write_u8(page, (count + 1) as u8)?;
                return Ok(());
            }
        }

        // Head page missing or full: start a new page linked to the old head
        let new_page = self.append_stack_page()?;
        self.data.write_u64(new_page, head_entry.encode())?;
        self.data.write_u8(new_page, 1)?;
        self.data.write_u64(slot_offset(new_page, 0), value)?;
        self.index.set_entry(head, IndexEntry::stack_head(new_page))?;

        Ok(())
    }

    /// Pop the most recently pushed value, `None` when the stack is empty
    ///
    /// A page drained to zero is unlinked; its bytes are not reclaimed.
    pub fn stack_pop(&mut self, head: u64) -> Result<Option<u64>> {
        loop {
            let page = self.index.entry(head, EntryKind::StackHead)?.offset();
            if page == 0 {
                return Ok(None);
            }

            let count = self.data.read_u8(page)? as usize;
            debug_assert!(count <= STACK_VALUES_PER_PAGE, "stack page count {} out of range", count);

            if count == 0 {
                self.unlink_page(head, page)?;
                continue;
            }

            let value = self.data.read_u64(slot_offset(page, count - 1))?;
            if count == 1 {
                self.unlink_page(head, page)?;
            } else {
                self.data.write_u8(page, (count - 1) as u8)?;
            }
            return Ok(Some(value));
        }
    }

    /// Top value without removing it
    pub fn stack_peek(&self, head: u64) -> Result<Option<u64>> {
        let mut page = self.index.entry(head, EntryKind::StackHead)?.offset();

        while page != 0 {
            let count = self.data.read_u8(page)? as usize;
            if count > 0 {
                return Ok(Some(self.data.read_u64(slot_offset(page, count - 1))?));
            }
            page = self.page_link(page)?;
        }
        Ok(None)
    }

    /// True when nothing can be popped from `head`
    pub fn stack_is_empty(&self, head: u64) -> Result<bool> {
        Ok(self.stack_peek(head)?.is_none())
    }

    /// Every value on the stack, top first, without modifying it
    pub fn stack_values(&self, head: u64) -> Result<Vec<u64>> {
        let mut values = Vec::new();
        let mut page = self.index.entry(head, EntryKind::StackHead)?.offset();

        while page != 0 {
            let count = self.data.read_u8(page)? as usize;
            for slot in (0..count).rev() {
                values.push(self.data.read_u64(slot_offset(page, slot))?);
            }
            page = self.page_link(page)?;
        }
        Ok(values)
    }

    /// Offset of the page below `page`, 0 if none
    pub fn page_link(&self, page: u64) -> Result<u64> {
        Ok(self.data.read_u64(page)? & OFFSET_MASK)
    }

    /// Point `head` at the page below `page`
    fn unlink_page(&mut self, head: u64, page: u64) -> Result<()> {
        let link = self.page_link(page)?;
        let entry = if link == 0 {
            IndexEntry::Empty
        } else {
            IndexEntry::stack_head(link)
        };

        tracing::trace!("Stack {} drained page {}, next page {}", head, page, link);
        self.index.set_entry(head, entry)
    }
}
