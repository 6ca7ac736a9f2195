//! Index entry encoding
//!
//! An index slot is one 64-bit word. What the word means depends on the
//! slot: user recids hold a record's (size, offset); free-list head recids
//! hold a stack page's (capacity tag, offset). Both use the same 16|48
//! packing, so decoding needs to be told which kind it is reading.

use crate::layout::{EMPTY_RECORD_OFFSET, MAX_RECORD_SIZE, OFFSET_MASK, SIZE_SHIFT, STACK_PAGE_SIZE};

/// Which interpretation to apply when decoding a raw index word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Slot of a user record
    Record,
    /// Root pointer of a persistent stack
    StackHead,
}

/// Decoded index slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEntry {
    /// Free / never allocated (raw word is zero)
    Empty,

    /// Live user record of `size` bytes at `offset` in the data region
    Record { size: u16, offset: u64 },

    /// Top page of a persistent stack; `capacity` tags the page size
    StackHead { capacity: u16, offset: u64 },
}

impl IndexEntry {
    /// Entry for a record of `size` bytes stored at `offset`
    ///
    /// Zero-length records carry a sentinel offset so the word stays non-zero.
    pub fn record(size: usize, offset: u64) -> Self {
        debug_assert!(size <= MAX_RECORD_SIZE, "record size {} out of range", size);
        let offset = if size == 0 { EMPTY_RECORD_OFFSET } else { offset };
        IndexEntry::Record {
            size: size as u16,
            offset: offset & OFFSET_MASK,
        }
    }

    /// Head entry pointing at the stack page at `offset`
    pub fn stack_head(offset: u64) -> Self {
        IndexEntry::StackHead {
            capacity: STACK_PAGE_SIZE as u16,
            offset: offset & OFFSET_MASK,
        }
    }

    /// Decode a raw word under the given interpretation
    pub fn decode(word: u64, kind: EntryKind) -> Self {
        if word == 0 {
            return IndexEntry::Empty;
        }
        let (tag, offset) = unpack(word);
        match kind {
            EntryKind::Record => IndexEntry::Record { size: tag, offset },
            EntryKind::StackHead => IndexEntry::StackHead { capacity: tag, offset },
        }
    }

    /// Raw 64-bit word for this entry
    pub fn encode(&self) -> u64 {
        match *self {
            IndexEntry::Empty => 0,
            IndexEntry::Record { size, offset } => pack(size, offset),
            IndexEntry::StackHead { capacity, offset } => pack(capacity, offset),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IndexEntry::Empty)
    }

    /// Physical offset, 0 for an empty entry
    pub fn offset(&self) -> u64 {
        match *self {
            IndexEntry::Empty => 0,
            IndexEntry::Record { offset, .. } | IndexEntry::StackHead { offset, .. } => offset,
        }
    }

    /// Payload size of a record entry, 0 otherwise
    pub fn size(&self) -> usize {
        match *self {
            IndexEntry::Record { size, .. } => size as usize,
            _ => 0,
        }
    }
}

/// A contiguous byte range in the data region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: u64,
    pub size: usize,
}

impl Span {
    pub fn new(offset: u64, size: usize) -> Self {
        Self { offset, size }
    }

    /// Pack into the 16|48 word stored on a free-span stack
    pub fn pack(&self) -> u64 {
        debug_assert!(self.size <= MAX_RECORD_SIZE);
        pack(self.size as u16, self.offset)
    }

    /// Inverse of [`Span::pack`]
    pub fn unpack(word: u64) -> Self {
        let (size, offset) = unpack(word);
        Self {
            offset,
            size: size as usize,
        }
    }

    /// First offset past the span
    pub fn end(&self) -> u64 {
        self.offset + self.size as u64
    }
}

/// `tag:16 | offset:48`
pub const fn pack(tag: u16, offset: u64) -> u64 {
    ((tag as u64) << SIZE_SHIFT) | (offset & OFFSET_MASK)
}

/// Split a word into (tag, offset)
pub const fn unpack(word: u64) -> (u16, u64) {
    ((word >> SIZE_SHIFT) as u16, word & OFFSET_MASK)
}
