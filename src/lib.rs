//! Work-efficient parallel inclusive prefix sum over `i32`.
//!
//! A plain parallel scan (Hillis-Steele) does O(n log n) additions. This crate
//! keeps the total at O(n) by splitting the job into three phases:
//!
//! 1. **Reduce** ([`reduce_pairs`]): `z[i] = x[2i] + x[2i + 1]`, in parallel.
//! 2. **Scan** ([`scan_sequential`]): running total `w` of `z`, sequentially.
//!    This is the only dependent chain, and it is half the input length.
//! 3. **Reconstruct** ([`reconstruct`]): every `y[i]` from `w` and `x`, in
//!    parallel.
//!
//! [`WorkEfficientScan`] owns a rayon pool sized by [`ScanConfig`] and runs
//! the three phases with a barrier between each. Arithmetic wraps by default;
//! [`OverflowMode::Checked`] turns overflow into [`ScanError::Overflow`].
//!
//! ```
//! use pairwise_scan::{ScanConfig, WorkEfficientScan};
//!
//! let scan = WorkEfficientScan::new(ScanConfig::new(4))?;
//! assert_eq!(scan.run(&[3, 1, 4, 1, 5, 9, 2, 6])?, [3, 4, 8, 9, 14, 23, 25, 31]);
//! # Ok::<(), pairwise_scan::ScanError>(())
//! ```
//!
//! # References
//!
//! - [Prefix sum, work-efficient algorithm](https://en.wikipedia.org/wiki/Prefix_sum#Algorithm_2:_Work-efficient)

mod config;
mod error;
mod input;
mod pipeline;
mod prefix_sum;
mod reconstruct;
mod reduce;
mod scan;

pub use config::*;
pub use error::*;
pub use input::*;
pub use pipeline::*;
pub use prefix_sum::*;
pub use reconstruct::*;
pub use reduce::*;
pub use scan::*;
