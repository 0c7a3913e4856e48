use std::thread;

use crate::ScanError;

/// How additions behave when a sum leaves the `i32` range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowMode {
    /// Two's-complement wraparound. Wrapping addition is associative, so the
    /// three-phase result matches a wrapping sequential scan bit for bit.
    #[default]
    Wrapping,
    /// Abort with [`ScanError::Overflow`] on the first overflowing addition.
    ///
    /// Conservative: pair sums and partial sums are checked too, so an input
    /// whose true prefix sums all fit can still be rejected.
    Checked,
}

/// Parameters of one [`WorkEfficientScan`](crate::WorkEfficientScan).
///
/// Passed explicitly instead of living in a process-wide setting, so two scans
/// with different thread counts can coexist (and run in parallel tests).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    pub threads: usize,
    pub overflow: OverflowMode,
}

impl ScanConfig {
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            overflow: OverflowMode::Wrapping,
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowMode) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.threads == 0 {
            return Err(ScanError::InvalidConfiguration(
                "thread count must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        let threads = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threads_rejected() {
        let err = ScanConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfiguration(_)));
    }

    #[test]
    fn default_is_valid_and_wrapping() {
        let config = ScanConfig::default();
        assert!(config.threads >= 1);
        assert_eq!(config.overflow, OverflowMode::Wrapping);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn with_overflow_keeps_threads() {
        let config = ScanConfig::new(4).with_overflow(OverflowMode::Checked);
        assert_eq!(config.threads, 4);
        assert_eq!(config.overflow, OverflowMode::Checked);
    }
}
