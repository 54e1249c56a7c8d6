//! Splits ordered inputs into provider-sized batches.

use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Lazily splits `items` into contiguous chunks of at most `limit` items.
///
/// Input order is preserved within and across chunks; the last chunk holds
/// the remainder. An empty input yields no chunks.
pub fn chunked<T>(items: &[T], limit: NonZeroUsize) -> Chunks<'_, T> {
    items.chunks(limit.get())
}

/// Number of chunks [`chunked`] yields for `len` items.
pub fn chunk_count(len: usize, limit: NonZeroUsize) -> usize {
    len.div_ceil(limit.get())
}
