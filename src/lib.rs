//! # recstore
//!
//! An embedded record store with:
//! - Stable 64-bit record ids (recids) mapped to byte payloads
//! - File-backed or in-memory paged storage
//! - Persistent free lists that recycle freed recids and spans (LIFO)
//! - Single-writer/multi-reader concurrency model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Engine                              │
//! │          (RwLock, lifecycle, codec boundary)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      RecordStore                            │
//! │      put/get/update/delete · size buckets · LIFO stacks     │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   IndexTable    │                │   Data region   │
//!   │ recid → (sz,off)│                │ payloads, pages │
//!   └────────┬────────┘                └────────┬────────┘
//!            ▼                                  ▼
//!   ┌─────────────────────────────────────────────────────┐
//!   │        AddressSpace (FileStore | MemoryStore)       │
//!   └─────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod layout;

pub mod codec;
pub mod storage;
pub mod index;
pub mod store;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{CommitSync, Config};
pub use codec::{
    BincodeCodec, BoolCodec, BytesCodec, Codec, F32Codec, F64Codec, I16Codec, I32Codec,
    I64Codec, I8Codec, StringCodec, U16Codec, U32Codec, U64Codec, U8Codec,
};
pub use engine::Engine;
pub use store::{RecordStore, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of recstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
