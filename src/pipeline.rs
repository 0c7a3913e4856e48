//! The three-phase driver.
//!
//! ```text
//! x --reduce (parallel)--> z --scan (sequential)--> w --reconstruct (parallel)--> y
//! ```
//!
//! Each phase returns only after its whole output exists, which is the barrier
//! the next phase relies on. Total work stays O(n); the sequential critical
//! path is `n / 2` additions.

use std::fmt;
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, debug_span};

use crate::{
    OverflowMode, ScanConfig, ScanError, reconstruct, reconstruct_checked, reduce_pairs,
    reduce_pairs_checked, scan_sequential, scan_sequential_checked,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Reduce,
    Scan,
    Reconstruct,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Reduce, Phase::Scan, Phase::Reconstruct];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Reduce => "reduce",
            Phase::Scan => "scan",
            Phase::Reconstruct => "reconstruct",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wall-clock time spent in each phase of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub reduce: Duration,
    pub scan: Duration,
    pub reconstruct: Duration,
}

impl PhaseTimings {
    pub fn get(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Reduce => self.reduce,
            Phase::Scan => self.scan,
            Phase::Reconstruct => self.reconstruct,
        }
    }

    fn slot_mut(&mut self, phase: Phase) -> &mut Duration {
        match phase {
            Phase::Reduce => &mut self.reduce,
            Phase::Scan => &mut self.scan,
            Phase::Reconstruct => &mut self.reconstruct,
        }
    }

    pub fn total(&self) -> Duration {
        self.reduce + self.scan + self.reconstruct
    }
}

/// Every intermediate of one run, kept for inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanTrace {
    /// `z`: adjacent pair sums.
    pub reduced: Vec<i32>,
    /// `w`: running total of `z`.
    pub scanned: Vec<i32>,
    /// `y`: inclusive prefix sum of the input.
    pub output: Vec<i32>,
    pub timings: PhaseTimings,
}

/// Work-efficient inclusive prefix sum backed by a dedicated worker pool.
///
/// The pool is built once from [`ScanConfig::threads`] and reused by every
/// call. The thread count only changes how fast a run finishes, never its
/// result.
pub struct WorkEfficientScan {
    pool: ThreadPool,
    config: ScanConfig,
}

impl WorkEfficientScan {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("scan-worker-{i}"))
            .build()?;
        debug!(threads = config.threads, overflow = ?config.overflow, "scan pool ready");
        Ok(Self { pool, config })
    }

    pub fn config(&self) -> ScanConfig {
        self.config
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Computes `y[i] = x[0] + ... + x[i]`.
    pub fn run(&self, x: &[i32]) -> Result<Vec<i32>, ScanError> {
        self.run_timed(x).map(|(y, _)| y)
    }

    /// [`run`](Self::run) plus the time spent in each phase.
    pub fn run_timed(&self, x: &[i32]) -> Result<(Vec<i32>, PhaseTimings), ScanError> {
        let mut timings = PhaseTimings::default();
        let z = self.reduce(x, &mut timings)?;
        let w = self.scan(&z, &mut timings)?;
        // Nothing downstream of the scan reads z.
        drop(z);
        let y = self.reconstruct(x, &w, &mut timings)?;
        Ok((y, timings))
    }

    /// Like [`run_timed`](Self::run_timed), but keeps `z` and `w` alive and
    /// hands them back.
    pub fn run_traced(&self, x: &[i32]) -> Result<ScanTrace, ScanError> {
        let mut timings = PhaseTimings::default();
        let reduced = self.reduce(x, &mut timings)?;
        let scanned = self.scan(&reduced, &mut timings)?;
        let output = self.reconstruct(x, &scanned, &mut timings)?;
        Ok(ScanTrace {
            reduced,
            scanned,
            output,
            timings,
        })
    }

    fn reduce(&self, x: &[i32], timings: &mut PhaseTimings) -> Result<Vec<i32>, ScanError> {
        let overflow = self.config.overflow;
        timed(Phase::Reduce, x.len(), timings, || {
            self.pool.install(|| match overflow {
                OverflowMode::Wrapping => Some(reduce_pairs(x)),
                OverflowMode::Checked => reduce_pairs_checked(x),
            })
        })
    }

    fn scan(&self, z: &[i32], timings: &mut PhaseTimings) -> Result<Vec<i32>, ScanError> {
        timed(Phase::Scan, z.len(), timings, || match self.config.overflow {
            OverflowMode::Wrapping => Some(scan_sequential(z)),
            OverflowMode::Checked => scan_sequential_checked(z),
        })
    }

    fn reconstruct(
        &self,
        x: &[i32],
        w: &[i32],
        timings: &mut PhaseTimings,
    ) -> Result<Vec<i32>, ScanError> {
        let overflow = self.config.overflow;
        timed(Phase::Reconstruct, x.len(), timings, || {
            self.pool.install(|| match overflow {
                OverflowMode::Wrapping => Some(reconstruct(x, w)),
                OverflowMode::Checked => reconstruct_checked(x, w),
            })
        })
    }
}

impl fmt::Debug for WorkEfficientScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkEfficientScan")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Runs one phase, records its duration, and maps a `None` result to an
/// overflow in that phase.
fn timed<T>(
    phase: Phase,
    len: usize,
    timings: &mut PhaseTimings,
    f: impl FnOnce() -> Option<T>,
) -> Result<T, ScanError> {
    let _span = debug_span!("phase", name = phase.name(), len).entered();
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    *timings.slot_mut(phase) = elapsed;
    debug!(elapsed_us = elapsed.as_micros() as u64, "phase done");
    result.ok_or(ScanError::Overflow { phase })
}

/// One-shot convenience: builds a pool of `threads` workers and scans `input`
/// with wrapping arithmetic.
pub fn work_efficient_prefix_sum(input: &[i32], threads: usize) -> Result<Vec<i32>, ScanError> {
    WorkEfficientScan::new(ScanConfig::new(threads))?.run(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix_sum_scalar;
    use proptest::prelude::*;
    use proptest::test_runner::TestRunner;

    fn scanner(threads: usize) -> WorkEfficientScan {
        WorkEfficientScan::new(ScanConfig::new(threads)).unwrap()
    }

    fn run_against_reference(cases: u32, max_len: usize) {
        let mut runner = TestRunner::new(ProptestConfig {
            cases,
            ..ProptestConfig::default()
        });
        let strat = (
            proptest::collection::vec(any::<i32>(), 0..=max_len),
            1usize..=8,
        );

        runner
            .run(&strat, |(input, threads)| {
                let expected = prefix_sum_scalar(&input);
                let actual = scanner(threads).run(&input).unwrap();
                prop_assert_eq!(actual, expected);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn prop_matches_reference_fast() {
        run_against_reference(64, 2048);
    }

    #[test]
    #[ignore]
    fn prop_matches_reference_deep() {
        run_against_reference(1024, 1 << 16);
    }

    proptest! {
        #[test]
        fn non_negative_input_is_monotonic(values in proptest::collection::vec(0i32..=1000, 0..=2048)) {
            let y = scanner(2).run(&values).unwrap();
            prop_assert!(y.windows(2).all(|pair| pair[0] <= pair[1]));
        }

        #[test]
        fn intermediate_lengths(values in proptest::collection::vec(any::<i32>(), 0..=1024)) {
            let trace = scanner(2).run_traced(&values).unwrap();
            prop_assert_eq!(trace.reduced.len(), values.len() / 2);
            prop_assert_eq!(trace.scanned.len(), values.len() / 2);
            prop_assert_eq!(trace.output.len(), values.len());
        }

        #[test]
        fn checked_matches_wrapping_without_overflow(values in proptest::collection::vec(-1000i32..=1000, 0..=1024)) {
            let checked = WorkEfficientScan::new(ScanConfig::new(3).with_overflow(OverflowMode::Checked)).unwrap();
            prop_assert_eq!(checked.run(&values).unwrap(), prefix_sum_scalar(&values));
        }
    }

    #[test]
    fn trace_of_known_input() {
        let trace = scanner(4).run_traced(&[3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        assert_eq!(trace.reduced, vec![4, 5, 14, 8]);
        assert_eq!(trace.scanned, vec![4, 9, 23, 31]);
        assert_eq!(trace.output, vec![3, 4, 8, 9, 14, 23, 25, 31]);
    }

    #[test]
    fn trace_of_single_pair() {
        let trace = scanner(1).run_traced(&[1, 2]).unwrap();
        assert_eq!(trace.reduced, vec![3]);
        assert_eq!(trace.scanned, vec![3]);
        assert_eq!(trace.output, vec![1, 3]);
    }

    #[test]
    fn degenerate_inputs() {
        let scan = scanner(2);
        assert_eq!(scan.run(&[]).unwrap(), Vec::<i32>::new());
        assert_eq!(scan.run(&[5]).unwrap(), vec![5]);
        assert_eq!(scan.run(&[1, 2, 3]).unwrap(), vec![1, 3, 6]);
    }

    #[test]
    fn thread_count_does_not_change_result() {
        let input: Vec<i32> = (0..10_001).map(|i| (i % 100) + 1).collect();
        let expected = prefix_sum_scalar(&input);
        for threads in [1, 4, 64] {
            let scan = scanner(threads);
            assert_eq!(scan.threads(), threads);
            assert_eq!(scan.run(&input).unwrap(), expected, "threads = {threads}");
        }
    }

    #[test]
    fn pool_is_reused_across_runs() {
        let scan = scanner(3);
        assert_eq!(scan.run(&[1, 1, 1, 1]).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(scan.run(&[2, 2]).unwrap(), vec![2, 4]);
    }

    #[test]
    fn independent_scans_run_concurrently() {
        let input: Vec<i32> = (1..=4096).collect();
        let expected = prefix_sum_scalar(&input);
        let input = input.as_slice();
        std::thread::scope(|s| {
            let handles: Vec<_> = [1, 2, 8]
                .into_iter()
                .map(|threads| s.spawn(move || scanner(threads).run(input).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn zero_threads_is_configuration_error() {
        let err = WorkEfficientScan::new(ScanConfig::new(0)).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfiguration(_)));
        assert!(work_efficient_prefix_sum(&[1, 2], 0).is_err());
    }

    #[test]
    fn checked_overflow_names_phase() {
        let checked =
            WorkEfficientScan::new(ScanConfig::new(2).with_overflow(OverflowMode::Checked))
                .unwrap();

        let err = checked.run(&[i32::MAX, 1]).unwrap_err();
        assert!(matches!(err, ScanError::Overflow { phase: Phase::Reduce }));

        let err = checked.run(&[i32::MAX, 0, 1, 0]).unwrap_err();
        assert!(matches!(err, ScanError::Overflow { phase: Phase::Scan }));

        let err = checked.run(&[i32::MAX, 0, 1]).unwrap_err();
        assert!(matches!(err, ScanError::Overflow { phase: Phase::Reconstruct }));
    }

    #[test]
    fn wrapping_overflow_matches_reference() {
        let input = [i32::MAX, 1, i32::MAX, 1, 7];
        assert_eq!(
            work_efficient_prefix_sum(&input, 2).unwrap(),
            prefix_sum_scalar(&input)
        );
    }

    #[test]
    fn timings_cover_every_phase() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();

        let input: Vec<i32> = (0..100_000).collect();
        let (y, timings) = scanner(2).run_timed(&input).unwrap();
        assert_eq!(y.len(), input.len());
        let sum: Duration = Phase::ALL.iter().map(|&p| timings.get(p)).sum();
        assert_eq!(sum, timings.total());
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Reconstruct.to_string(), "reconstruct");
        let err = ScanError::Overflow { phase: Phase::Scan };
        assert_eq!(err.to_string(), "i32 overflow during scan phase");
    }
}
