//! Multiplies two random matrices stored in paged memory and checks the
//! result against heap copies.

mod matrix;

use matrix::{HeapMatrix, PagedMatrix};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{env, io};
use uvm_info::memory::DEFAULT_MAX_RESIDENT;
use uvm_log::StderrLogger;
use uvm_pager::{Pager, PagerConfig, PagerError};
use uvm_policy::{PolicyError, PolicyKind};

const USAGE: &str = "\
usage: matrix-demo [--seed N] [--max-resident N] [--policy fifo|clock|random] SIZE

Generates two SIZE x SIZE matrices in paged memory and multiplies them
into a third one.

  --seed, -s N          seed for the random values (default: current time)
  --max-resident, -m N  pages that may be resident at once (default: 64)
  --policy, -p NAME     eviction policy (default: clock)
  UVM_LOG=LEVEL         pager log level (default: info)";

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Pager(#[from] PagerError),
    #[error("{size}x{size} matrices do not fit into the managed range")]
    TooLarge { size: usize },
}

#[derive(Debug, PartialEq, Eq)]
struct Options {
    seed: u64,
    max_resident: usize,
    policy: PolicyKind,
    size: usize,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, DemoError> {
    let mut seed = None;
    let mut max_resident = DEFAULT_MAX_RESIDENT;
    let mut policy = PolicyKind::default();
    let mut size = None;

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| DemoError::Usage(format!("{name} needs a value")))
        };
        match arg.as_str() {
            "--seed" | "-s" => seed = Some(number(&value("--seed")?)?),
            "--max-resident" | "--max_resident" | "-m" => {
                max_resident = number(&value("--max-resident")?)?;
            }
            "--policy" | "-p" => policy = value("--policy")?.parse()?,
            "--help" | "-h" => return Err(DemoError::Usage(String::new())),
            flag if flag.starts_with('-') => {
                return Err(DemoError::Usage(format!("unknown option {flag}")));
            }
            positional if size.is_none() => size = Some(number(positional)?),
            extra => return Err(DemoError::Usage(format!("unexpected argument {extra}"))),
        }
    }

    let size = size.ok_or_else(|| DemoError::Usage("SIZE is required".into()))?;
    let seed = seed.filter(|&s| s != 0).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(1, |d| d.as_secs())
    });
    Ok(Options {
        seed,
        max_resident,
        policy,
        size,
    })
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, DemoError> {
    s.parse()
        .map_err(|_| DemoError::Usage(format!("`{s}` is not a valid number")))
}

fn check(name: &str, ok: bool) -> bool {
    if ok {
        println!(" * {name} is correct");
    } else {
        println!(" * ERROR:  {name} doesn't contain correct values!");
    }
    ok
}

fn run(opts: &Options) -> Result<bool, DemoError> {
    println!("Options:");
    println!(" * Random seed = {}", opts.seed);
    println!(" * Max resident pages = {}", opts.max_resident);
    println!(" * Eviction policy = {}", opts.policy);
    println!(" * Using {0} x {0} matrices\n", opts.size);

    let config = PagerConfig::new(opts.max_resident)
        .with_policy(opts.policy)
        .with_random_seed(opts.seed);
    let pager = Pager::init(&config)?;
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let n = opts.size;
    let bytes = n
        .checked_mul(n)
        .and_then(|e| e.checked_mul(size_of::<i32>()))
        .ok_or(DemoError::TooLarge { size: n })?;
    let paged = || {
        pager
            .alloc(bytes)
            .map(|region| PagedMatrix::new(n, n, region))
            .ok_or(DemoError::TooLarge { size: n })
    };

    println!("Generating two matrices\n");
    let mut m1v = HeapMatrix::new(n, n);
    let mut m1 = paged()?;
    matrix::generate(&mut m1v, &mut rng);
    matrix::copy(&m1v, &mut m1);

    let mut m2v = HeapMatrix::new(n, n);
    let mut m2 = paged()?;
    matrix::generate(&mut m2v, &mut rng);
    matrix::copy(&m2v, &mut m2);

    let mut resultv = HeapMatrix::new(n, n);
    let mut result = paged()?;

    println!("Multiplying the matrices together");
    println!(" * Printing one dot per row in result matrix.\n");
    let mut out = io::stdout();
    matrix::multiply(&m1, &m2, &mut result, |_| {
        print!(".");
        let _ = out.flush();
    });
    println!();
    matrix::multiply(&m1v, &m2v, &mut resultv, |_| {});

    println!("Verifying source and result matrix contents");
    let ok = [
        check("Matrix m1", matrix::equal(&m1, &m1v)),
        check("Matrix m2", matrix::equal(&m2, &m2v)),
        check("Result matrix", matrix::equal(&result, &resultv)),
    ]
    .into_iter()
    .all(|ok| ok);

    let stats = pager.shutdown()?;
    println!("\nDone!\n");
    println!("Total page loads:  {}", stats.page_load_count);
    println!(
        "Faults: {}, evictions: {}, flushes: {}, ticks: {}",
        stats.fault_count, stats.eviction_count, stats.flush_count, stats.tick_count
    );
    Ok(ok)
}

fn main() -> ExitCode {
    if let Err(e) = StderrLogger::from_env(log::LevelFilter::Info).init() {
        eprintln!("logger: {e}");
    }

    let opts = match parse_args(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(DemoError::Usage(msg)) => {
            if !msg.is_empty() {
                eprintln!("{msg}\n");
            }
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&opts) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("matrix-demo: {e}");
            ExitCode::FAILURE
        }
    }
}
