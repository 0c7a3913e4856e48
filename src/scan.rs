//! Phase 2: sequential scan of the reduced array.
//!
//! `w[i]` needs `w[i - 1]`, so this is the critical path of the whole
//! computation. It runs on the calling thread over `⌊n / 2⌋` elements, half of
//! what a plain sequential scan would touch.

/// Inclusive running total of `z` with wrapping arithmetic.
pub fn scan_sequential(z: &[i32]) -> Vec<i32> {
    let mut w = Vec::with_capacity(z.len());
    let mut running = 0i32;
    for &pair_sum in z {
        running = running.wrapping_add(pair_sum);
        w.push(running);
    }
    w
}

/// Like [`scan_sequential`], but returns `None` on the first overflow.
pub fn scan_sequential_checked(z: &[i32]) -> Option<Vec<i32>> {
    let mut w = Vec::with_capacity(z.len());
    let mut running = 0i32;
    for &pair_sum in z {
        running = running.checked_add(pair_sum)?;
        w.push(running);
    }
    Some(w)
}
