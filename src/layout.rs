//! On-disk layout constants
//!
//! Every reserved record id, bit mask and page geometry value lives here.
//!
//! ## Index region
//! ```text
//! recid  0            header word (magic + format version)
//! recid  1            end of the data region (next append offset)
//! recid  2            logical slot count of the index table
//! recid  3            head of the free-recid stack
//! recid  4 ..= 2538   heads of the free-span stacks, one per size bucket
//! recid  2539 ..      user records
//! ```
//!
//! ## Index entry (64 bits, big-endian on disk)
//! ```text
//! ┌──────────────┬──────────────────────────────────┐
//! │ size (16)    │ physical offset (48)             │
//! └──────────────┴──────────────────────────────────┘
//! ```
//!
//! ## Stack page (808 bytes in the data region)
//! ```text
//! ┌─────────────────────────┬──────────┬──────────┬─────┬────────────┐
//! │ count(1) | link(7 low)  │ value 0  │ value 1  │ ... │ value 99   │
//! └─────────────────────────┴──────────┴──────────┴─────┴────────────┘
//! ```

// =============================================================================
// Index Entry Packing
// =============================================================================

/// Width of one index slot in bytes
pub const INDEX_ENTRY_SIZE: u64 = 8;

/// Bit position of the size field inside an index entry
pub const SIZE_SHIFT: u32 = 48;

/// Mask selecting the 48-bit physical offset of an index entry
pub const OFFSET_MASK: u64 = (1 << SIZE_SHIFT) - 1;

/// Largest payload a single record may hold
pub const MAX_RECORD_SIZE: usize = u16::MAX as usize;

/// Offset stored for zero-length records so their entry is never zero
pub const EMPTY_RECORD_OFFSET: u64 = OFFSET_MASK;

// =============================================================================
// Persistent Stack Pages
// =============================================================================

/// Number of 64-bit values a single stack page holds
pub const STACK_VALUES_PER_PAGE: usize = 100;

/// Size of a stack page: 8 byte count/link word followed by the values
pub const STACK_PAGE_SIZE: u64 = 8 + STACK_VALUES_PER_PAGE as u64 * 8;

// =============================================================================
// Size Buckets
// =============================================================================

/// Sizes below this limit get a bucket of their own
pub const EXACT_BUCKET_LIMIT: usize = 1535;

/// Width of each shared bucket above `EXACT_BUCKET_LIMIT`
pub const BUCKET_GRANULARITY: usize = 64;

/// Total number of free-span buckets
pub const BUCKET_COUNT: usize = 1000 + EXACT_BUCKET_LIMIT;

// =============================================================================
// Reserved Record Ids
// =============================================================================

/// Header word: magic and format version
pub const RECID_HEADER: u64 = 0;

/// Next append offset in the data region
pub const RECID_DATA_END: u64 = 1;

/// Logical slot count of the index table
pub const RECID_SLOT_COUNT: u64 = 2;

/// Head of the stack holding freed record ids
pub const RECID_FREE_RECIDS: u64 = 3;

/// Head of the stack for size bucket 0; bucket `b` lives at `+ b`
pub const RECID_FREE_SPANS_START: u64 = 4;

/// First record id handed out to callers
pub const FIRST_USER_RECID: u64 = RECID_FREE_SPANS_START + BUCKET_COUNT as u64;

// =============================================================================
// Regions
// =============================================================================

/// First usable data offset; offset 0 means "no page" / "no span"
pub const DATA_START: u64 = 8;

/// Header magic: "RECS" followed by the format version
pub const HEADER_MAGIC: u64 = 0x5245_4353_0000_0000;

/// Current on-disk format version
pub const FORMAT_VERSION: u64 = 1;

/// Default size of one address-space page (1 MiB)
pub const DEFAULT_PAGE_SIZE: usize = 1 << 20;

/// Head recid of the free-span stack for `bucket`
pub const fn bucket_head(bucket: usize) -> u64 {
    RECID_FREE_SPANS_START + bucket as u64
}

/// Header word written at `RECID_HEADER`
pub const fn header_word() -> u64 {
    HEADER_MAGIC | FORMAT_VERSION
}
