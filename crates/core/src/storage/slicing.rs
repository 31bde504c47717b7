use std::ops::Range;

/// Largest number of writes accepted by one atomic transaction.
pub const MAX_TRANSACT_SLICE: usize = 99;

/// Splits `0..total` into consecutive ranges of at most [`MAX_TRANSACT_SLICE`].
///
/// Every index is covered exactly once. Only the last range may be short.
pub fn slice_ranges(total: usize) -> Vec<Range<usize>> {
    (0..total)
        .step_by(MAX_TRANSACT_SLICE)
        .map(|start| start..(start + MAX_TRANSACT_SLICE).min(total))
        .collect()
}
