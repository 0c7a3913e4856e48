use std::env;
use std::hint::black_box;
use std::process;
use std::time::{Duration, Instant};

use pairwise_scan::{
    DEFAULT_SEED, PhaseTimings, ScanConfig, WorkEfficientScan, prefix_sum_scalar,
    prefix_sum_scalar_in_place, random_i32_array,
};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy)]
enum Bench {
    Scalar,
    ScalarInPlace,
    WorkEfficient,
}

#[derive(Clone, Copy)]
struct Config {
    bench: Bench,
    len: usize,
    iters: usize,
    threads: usize,
    seed: u64,
    reset: bool,
    verify: bool,
    report: bool,
}

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage(&program_name());
            process::exit(2);
        }
    };

    if config.verify {
        verify_bench(config);
    }

    run_bench(config);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args() -> Result<Config, String> {
    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "perf_harness".to_string());

    let mut bench = None;
    let mut len = 1_000_000;
    let mut iters = 10;
    let mut threads = ScanConfig::default().threads;
    let mut seed = DEFAULT_SEED;
    let mut reset = true;
    let mut verify = false;
    let mut report = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bench" => {
                let name = args.next().ok_or("--bench requires a value")?;
                let parsed = parse_bench(&name).ok_or_else(|| format!("unknown bench: {name}"))?;
                bench = Some(parsed);
            }
            "--len" => {
                let value = args.next().ok_or("--len requires a value")?;
                len = parse_usize(&value, "--len")?;
            }
            "--iters" => {
                let value = args.next().ok_or("--iters requires a value")?;
                iters = parse_usize(&value, "--iters")?;
            }
            "--threads" => {
                let value = args.next().ok_or("--threads requires a value")?;
                threads = parse_usize(&value, "--threads")?;
                if threads == 0 {
                    return Err("--threads must be positive".to_string());
                }
            }
            "--seed" => {
                let value = args.next().ok_or("--seed requires a value")?;
                seed = parse_u64(&value, "--seed")?;
            }
            "--reset" => reset = true,
            "--no-reset" => reset = false,
            "--verify" => verify = true,
            "--report" => report = true,
            "--no-report" => report = false,
            "--list" => {
                list_benches();
                process::exit(0);
            }
            "-h" | "--help" => {
                print_usage(&program);
                process::exit(0);
            }
            _ => return Err(format!("unknown argument: {arg}")),
        }
    }

    Ok(Config {
        bench: bench.ok_or("missing --bench")?,
        len,
        iters,
        threads,
        seed,
        reset,
        verify,
        report,
    })
}

fn program_name() -> String {
    env::args()
        .next()
        .unwrap_or_else(|| "perf_harness".to_string())
}

fn print_usage(program: &str) {
    eprintln!(
        "\
Usage:
  {program} --bench <name> [--len N] [--iters N] [--threads N] [--seed N] [--no-reset] [--verify]
  {program} --list

Options:
  --bench <name>   Benchmark to run (see --list)
  --len N          Input length in elements (default: 1000000)
  --iters N        Iterations (default: 10)
  --threads N      Worker threads for work_efficient (default: available parallelism)
  --seed N         RNG seed (default: 0x123456789ABCDEF0)
  --no-reset       Skip resetting in-place inputs each iteration
  --verify         Run a quick correctness check before benchmarking
  --report         Print throughput summary after the run
  --no-report      Disable throughput summary
  --list           Show available benches
"
    );
}

fn list_benches() {
    for bench in [Bench::Scalar, Bench::ScalarInPlace, Bench::WorkEfficient] {
        println!("{}", bench.name());
    }
}

fn parse_bench(name: &str) -> Option<Bench> {
    match name {
        "scalar" => Some(Bench::Scalar),
        "scalar_in_place" => Some(Bench::ScalarInPlace),
        "work_efficient" => Some(Bench::WorkEfficient),
        _ => None,
    }
}

impl Bench {
    fn name(self) -> &'static str {
        match self {
            Bench::Scalar => "scalar",
            Bench::ScalarInPlace => "scalar_in_place",
            Bench::WorkEfficient => "work_efficient",
        }
    }
}

fn parse_usize(value: &str, flag: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{flag} expects a non-negative integer"))
}

fn parse_u64(value: &str, flag: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("{flag} expects a non-negative integer"))
}

fn run_bench(config: Config) {
    let start = Instant::now();
    let phases = match config.bench {
        Bench::Scalar => {
            bench_scalar(config);
            None
        }
        Bench::ScalarInPlace => {
            bench_scalar_in_place(config);
            None
        }
        Bench::WorkEfficient => Some(bench_work_efficient(config)),
    };
    let elapsed = start.elapsed();
    if config.report {
        print_report(&config, elapsed, phases);
    }
}

fn print_report(config: &Config, elapsed: Duration, phases: Option<PhaseTimings>) {
    let work_items = (config.len as u128) * (config.iters as u128);
    // One read of x and one write of y per element.
    let bytes = work_items * 8;
    let elapsed_s = elapsed.as_secs_f64();
    let items_per_s = work_items as f64 / elapsed_s;
    let bytes_per_s = bytes as f64 / elapsed_s;
    let ns_per_item = (elapsed_s * 1.0e9) / work_items as f64;

    let mut lines = Vec::with_capacity(5);
    lines.push(format!(
        "bench={} len={} iters={} threads={}",
        config.bench.name(),
        config.len,
        config.iters,
        config.threads
    ));
    lines.push(format!(
        "elapsed_s={:.6} ns_per_item={:.3} throughput={}",
        elapsed_s,
        ns_per_item,
        format_rate(items_per_s, "elem")
    ));
    lines.push(format!(
        "bytes={} byte_throughput={}",
        bytes,
        format_rate(bytes_per_s, "B")
    ));

    if let Some(phases) = phases {
        lines.push(format!(
            "reduce_s={:.6} scan_s={:.6} reconstruct_s={:.6}",
            phases.reduce.as_secs_f64(),
            phases.scan.as_secs_f64(),
            phases.reconstruct.as_secs_f64()
        ));
    }

    println!("{}", lines.join("\n"));
}

fn format_rate(rate: f64, unit: &str) -> String {
    let (value, prefix) = if rate >= 1.0e12 {
        (rate / 1.0e12, "T")
    } else if rate >= 1.0e9 {
        (rate / 1.0e9, "G")
    } else if rate >= 1.0e6 {
        (rate / 1.0e6, "M")
    } else if rate >= 1.0e3 {
        (rate / 1.0e3, "K")
    } else {
        (rate, "")
    };
    format!("{value:.3} {prefix}{unit}/s")
}

fn build_scan(threads: usize) -> WorkEfficientScan {
    match WorkEfficientScan::new(ScanConfig::new(threads)) {
        Ok(scan) => scan,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn verify_bench(config: Config) {
    let input = [3, 1, 4, 1, 5, 9, 2];
    let expected = vec![3, 4, 8, 9, 14, 23, 25];
    match config.bench {
        Bench::Scalar => assert_eq!(prefix_sum_scalar(&input), expected),
        Bench::ScalarInPlace => {
            let mut values = input;
            prefix_sum_scalar_in_place(&mut values);
            assert_eq!(values.to_vec(), expected);
        }
        Bench::WorkEfficient => {
            let scan = build_scan(config.threads);
            assert_eq!(scan.run(&input).ok(), Some(expected));
        }
    }
}

fn bench_scalar(config: Config) {
    let input = random_i32_array(config.len, config.seed);
    let mut acc = 0i64;
    for _ in 0..config.iters {
        let output = prefix_sum_scalar(black_box(input.as_slice()));
        acc ^= output.last().copied().unwrap_or(0) as i64;
        black_box(&output);
    }
    black_box(acc);
}

fn bench_scalar_in_place(config: Config) {
    let base = random_i32_array(config.len, config.seed);
    let mut values = base.clone();
    let mut acc = 0i64;
    for _ in 0..config.iters {
        if config.reset {
            values.copy_from_slice(&base);
        }
        prefix_sum_scalar_in_place(black_box(values.as_mut_slice()));
        acc ^= values.last().copied().unwrap_or(0) as i64;
    }
    black_box(acc);
}

/// Returns the per-phase time summed over all iterations.
fn bench_work_efficient(config: Config) -> PhaseTimings {
    let input = random_i32_array(config.len, config.seed);
    let scan = build_scan(config.threads);
    let mut totals = PhaseTimings::default();
    let mut acc = 0i64;
    for _ in 0..config.iters {
        let (output, timings) = match scan.run_timed(black_box(input.as_slice())) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("error: {err}");
                process::exit(1);
            }
        };
        totals.reduce += timings.reduce;
        totals.scan += timings.scan;
        totals.reconstruct += timings.reconstruct;
        acc ^= output.last().copied().unwrap_or(0) as i64;
        black_box(&output);
    }
    black_box(acc);
    totals
}
