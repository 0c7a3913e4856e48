//! Phase 3: fan the pair totals back out to full length.
//!
//! `w[k]` is the prefix sum through `x[2k + 1]`. An odd output index
//! `2k + 1` closes pair `k` and copies `w[k]`; an even index `2k` opens pair
//! `k` and needs the previous pair's total plus the lone `x[2k]`. Slots 0 and 1
//! are written first, then every slot from 2 on is computed independently on
//! the current rayon pool, each worker writing only its own slot.

use rayon::prelude::*;

#[derive(Clone, Copy)]
enum Source {
    /// Copy `w[k]`.
    Closed(usize),
    /// `w[k] + x[i]`.
    Open(usize),
}

#[inline]
fn source(i: usize) -> Source {
    if i % 2 == 1 {
        Source::Closed(i / 2)
    } else {
        Source::Open(i / 2 - 1)
    }
}

/// Builds the final prefix sum `y` from the input `x` and the scanned pair
/// totals `w`, with wrapping arithmetic.
///
/// `w` must hold `⌊x.len() / 2⌋` elements. For odd lengths the trailing
/// element falls on an even index and is covered by the open-pair rule.
pub fn reconstruct(x: &[i32], w: &[i32]) -> Vec<i32> {
    debug_assert_eq!(w.len(), x.len() / 2);
    let Some(mut y) = base_cases(x, w) else {
        return x.to_vec();
    };

    y[2..]
        .par_iter_mut()
        .enumerate()
        .for_each(|(offset, slot)| {
            let i = offset + 2;
            *slot = match source(i) {
                Source::Closed(k) => w[k],
                Source::Open(k) => w[k].wrapping_add(x[i]),
            };
        });
    y
}

/// Like [`reconstruct`], but returns `None` if any `w[k] + x[i]` overflows.
pub fn reconstruct_checked(x: &[i32], w: &[i32]) -> Option<Vec<i32>> {
    debug_assert_eq!(w.len(), x.len() / 2);
    let Some(mut y) = base_cases(x, w) else {
        return Some(x.to_vec());
    };

    y[2..]
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(offset, slot)| {
            let i = offset + 2;
            *slot = match source(i) {
                Source::Closed(k) => w[k],
                Source::Open(k) => w[k].checked_add(x[i])?,
            };
            Some(())
        })?;
    Some(y)
}

/// Allocates `y` with slots 0 and 1 filled, or `None` when `x` has fewer than
/// two elements (the answer is then `x` itself).
fn base_cases(x: &[i32], w: &[i32]) -> Option<Vec<i32>> {
    if x.len() < 2 {
        return None;
    }
    let mut y = vec![0i32; x.len()];
    y[0] = x[0];
    y[1] = w[0];
    Some(y)
}
