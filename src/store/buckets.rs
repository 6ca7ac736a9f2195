//! Size-bucketed free-space index
//!
//! One persistent stack per size class. Freed spans are pushed onto the
//! stack of their bucket and popped again when a record of a fitting size
//! needs space.
//!
//! ## Bucket Function
//! ```text
//! size   1 ..= 1534        bucket = size - 1          (one size each)
//! size   1535 ..= 65534    bucket = 1534 + (size - 1535) / 64
//! size   65535             bucket = 2534              (alone)
//! ```

use crate::error::{Result, StoreError};
use crate::index::Span;
use crate::layout::{bucket_head, BUCKET_COUNT, BUCKET_GRANULARITY, EXACT_BUCKET_LIMIT, MAX_RECORD_SIZE};

use super::RecordStore;

/// Size class for a payload of `size` bytes
///
/// Monotonic, steps by at most one, and gives `MAX_RECORD_SIZE` a bucket of
/// its own. Fails for `size == 0` and `size > MAX_RECORD_SIZE`.
pub fn size_to_bucket(size: usize) -> Result<usize> {
    if size == 0 {
        return Err(StoreError::InvalidArgument("span size must be positive".to_string()));
    }
    if size > MAX_RECORD_SIZE {
        return Err(StoreError::InvalidArgument(format!(
            "span size {} exceeds maximum {}",
            size, MAX_RECORD_SIZE
        )));
    }

    let bucket = if size < EXACT_BUCKET_LIMIT {
        size - 1
    } else if size == MAX_RECORD_SIZE {
        BUCKET_COUNT - 1
    } else {
        EXACT_BUCKET_LIMIT - 1 + (size - EXACT_BUCKET_LIMIT) / BUCKET_GRANULARITY
    };

    debug_assert!(bucket < BUCKET_COUNT, "bucket {} out of range for size {}", bucket, size);
    Ok(bucket)
}

/// True when smaller sizes share the bucket of `size`
fn bucket_is_shared(size: usize, bucket: usize) -> Result<bool> {
    Ok(size > 1 && size_to_bucket(size - 1)? == bucket)
}

impl RecordStore {
    /// Return the span (`offset`, `size`) to the free-space index
    pub fn release_span(&mut self, offset: u64, size: usize) -> Result<()> {
        let bucket = size_to_bucket(size)?;
        self.stack_push(bucket_head(bucket), Span::new(offset, size).pack())
    }

    /// Find a freed span of at least `size` bytes, `None` on a miss
    ///
    /// The most recently freed span in the bucket is tried first. When the
    /// bucket also holds smaller sizes and its top does not fit, the next
    /// bucket (whose spans are all larger) is tried. Any excess beyond
    /// `size` is released again as its own span.
    pub fn acquire_span(&mut self, size: usize) -> Result<Option<u64>> {
        let bucket = size_to_bucket(size)?;
        let head = bucket_head(bucket);

        if let Some(word) = self.stack_peek(head)? {
            if Span::unpack(word).size >= size {
                self.stack_pop(head)?;
                return self.carve(Span::unpack(word), size).map(Some);
            }
        }

        if bucket_is_shared(size, bucket)? && bucket + 1 < BUCKET_COUNT {
            if let Some(word) = self.stack_pop(bucket_head(bucket + 1))? {
                return self.carve(Span::unpack(word), size).map(Some);
            }
        }

        Ok(None)
    }

    /// Keep the first `size` bytes of `span`, release the rest
    fn carve(&mut self, span: Span, size: usize) -> Result<u64> {
        debug_assert!(span.size >= size);

        if span.size > size {
            self.release_span(span.offset + size as u64, span.size - size)?;
        }

        tracing::trace!("Reusing span at {} ({} of {} bytes)", span.offset, size, span.size);
        Ok(span.offset)
    }
}
