use std::env;
use std::process;

use pairwise_scan::{
    DEFAULT_SEED, OverflowMode, Phase, ScanConfig, ScanError, ScanTrace, WorkEfficientScan,
    format_array, random_array, verify_prefix_sum,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Config {
    len: usize,
    threads: usize,
    seed: u64,
    timing: bool,
    checked: bool,
    verify: bool,
    quiet: bool,
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

    match run(&config) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err @ ScanError::InvalidConfiguration(_)) => {
            eprintln!("error: {err}");
            print_usage(&program_name());
            process::exit(2);
        }
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
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
    let program = args.next().unwrap_or_else(|| "parallel_sum".to_string());

    let mut positional = Vec::with_capacity(2);
    let mut seed = DEFAULT_SEED;
    let mut timing = false;
    let mut checked = false;
    let mut verify = false;
    let mut quiet = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed requires a value")?;
                seed = parse_u64(&value, "--seed")?;
            }
            "--timing" => timing = true,
            "--checked" => checked = true,
            "--verify" => verify = true,
            "--quiet" => quiet = true,
            "-h" | "--help" => {
                print_usage(&program);
                process::exit(0);
            }
            _ if arg.starts_with("--") => return Err(format!("unknown argument: {arg}")),
            _ => positional.push(arg),
        }
    }

    let [len, threads] = positional.as_slice() else {
        return Err(format!(
            "expected ARRAY_SIZE and THREAD_COUNT, got {} positional argument(s)",
            positional.len()
        ));
    };

    Ok(Config {
        len: parse_usize(len, "ARRAY_SIZE")?,
        threads: parse_usize(threads, "THREAD_COUNT")?,
        seed,
        timing,
        checked,
        verify,
        quiet,
    })
}

fn program_name() -> String {
    env::args()
        .next()
        .unwrap_or_else(|| "parallel_sum".to_string())
}

fn print_usage(program: &str) {
    eprintln!(
        "\
Usage:
  {program} [OPTIONS] <ARRAY_SIZE> <THREAD_COUNT>

Computes the inclusive prefix sum of ARRAY_SIZE random values in [1, 100]
with the three-phase work-efficient scan on THREAD_COUNT worker threads.

Options:
  --seed N     RNG seed (default: 0x123456789ABCDEF0)
  --timing     Print the time spent in each phase
  --checked    Fail on i32 overflow instead of wrapping
  --verify     Compare the result against a sequential scan
  --quiet      Do not print the sequences
  -h, --help   Show this message
"
    );
}

fn parse_usize(value: &str, name: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{name} expects a non-negative integer, got {value:?}"))
}

fn parse_u64(value: &str, flag: &str) -> Result<u64, String> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| format!("{flag} expects a non-negative integer"))
}

/// Returns `Ok(false)` when `--verify` finds a mismatch.
fn run(config: &Config) -> Result<bool, ScanError> {
    if config.len == 0 {
        return Err(ScanError::InvalidConfiguration("array size must be positive"));
    }
    let overflow = if config.checked {
        OverflowMode::Checked
    } else {
        OverflowMode::Wrapping
    };
    let scan = WorkEfficientScan::new(ScanConfig::new(config.threads).with_overflow(overflow))?;

    let x = random_array(config.len, config.seed);
    info!(len = config.len, threads = config.threads, seed = config.seed, "input generated");
    if !config.quiet {
        println!("Random array (x): {}\n", format_array(&x));
    }

    let trace = scan.run_traced(&x)?;
    for phase in Phase::ALL {
        print_phase(config, &trace, phase);
    }

    if config.timing {
        println!(
            "Total time: {:.9} seconds\n",
            trace.timings.total().as_secs_f64()
        );
    }

    if config.verify {
        if verify_prefix_sum(&x, &trace.output) {
            println!("Verification: PASSED");
        } else {
            println!("Verification: FAILED");
            return Ok(false);
        }
    }
    Ok(true)
}

fn print_phase(config: &Config, trace: &ScanTrace, phase: Phase) {
    let (label, how, values) = match phase {
        Phase::Reduce => ("Sequence z", "in parallel", &trace.reduced),
        Phase::Scan => ("Sequence w", "sequentially", &trace.scanned),
        Phase::Reconstruct => ("Prefix sum array (y)", "in parallel", &trace.output),
    };

    if !config.quiet {
        println!("{label} ({how}): {}\n", format_array(values));
    }
    if config.timing {
        println!(
            "Time taken to calculate {}: {:.9} seconds\n",
            phase,
            trace.timings.get(phase).as_secs_f64()
        );
    }
}
