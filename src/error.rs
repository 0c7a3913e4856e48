use thiserror::Error;

use crate::Phase;

/// Errors surfaced by the scan pipeline and its drivers.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Rejected before any parallel work is scheduled.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// Only produced under [`OverflowMode::Checked`](crate::OverflowMode::Checked).
    #[error("i32 overflow during {phase} phase")]
    Overflow { phase: Phase },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
