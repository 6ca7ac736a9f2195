//! Index Module
//!
//! Maps record ids to packed (size, offset) words.
//!
//! ## Responsibilities
//! - Encode/decode the polymorphic 64-bit index entry
//! - Persist one slot per recid on a paged address space
//! - Track the logical slot count across reopen
//!
//! ## Slot Format
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │ size/tag(16) │ physical offset (48)             │
//! └──────────────┴──────────────────────────────────┘
//! ```
//! A zero word means the slot is free.

mod entry;
mod table;

pub use entry::{pack, unpack, EntryKind, IndexEntry, Span};
pub use table::IndexTable;
