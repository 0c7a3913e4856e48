//! Phase 1: pairwise reduction.
//!
//! Collapses `x` into `z` with `z[i] = x[2i] + x[2i + 1]`. Every output slot
//! depends on two inputs only, so the work is split across the current rayon
//! pool with no synchronization beyond the final collect. An odd trailing
//! element has no partner and is left for the reconstruction phase.

use rayon::prelude::*;

/// Sums adjacent pairs of `x` with wrapping arithmetic.
///
/// Returns `⌊x.len() / 2⌋` elements; empty and single-element inputs yield an
/// empty vector.
pub fn reduce_pairs(x: &[i32]) -> Vec<i32> {
    x.par_chunks_exact(2)
        .map(|pair| pair[0].wrapping_add(pair[1]))
        .collect()
}

/// Like [`reduce_pairs`], but returns `None` if any pair sum overflows `i32`.
pub fn reduce_pairs_checked(x: &[i32]) -> Option<Vec<i32>> {
    x.par_chunks_exact(2)
        .map(|pair| pair[0].checked_add(pair[1]))
        .collect()
}
