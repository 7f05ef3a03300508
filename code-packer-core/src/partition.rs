//! Partitioner: split the collected sequence into contiguous, nearly equal groups.

use std::num::NonZeroUsize;

/// Files per group: `ceil(total / count)`.
pub fn chunk_size(total: usize, count: NonZeroUsize) -> usize {
    total.div_ceil(count.get())
}

/// Slice `items` into consecutive groups of [`chunk_size`] items; the last
/// group may be shorter.
///
/// At most `count` groups are produced, and fewer whenever the chunk size
/// covers the input early (3 items into 5 groups gives 3 groups of one).
/// An empty input yields no groups.
pub fn partition<T>(items: &[T], count: NonZeroUsize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }
    items.chunks(chunk_size(items.len(), count)).collect()
}
