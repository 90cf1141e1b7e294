// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Benchmark harness binary: generates synthetic FIBs across the
//! configured size range, cross-validates all three engines agree, then
//! times each engine's lookup loop under Zipf-distributed traffic,
//! isolating each run in its own forked process.

use std::io::{Read, Write};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use nix::sys::time::TimeSpec;
use nix::time::{clock_gettime, ClockId};
use nix::unistd::{fork, ForkResult};

use xia_lpm::bloom_engine::BloomEngine;
use xia_lpm::config::{BenchConfig, BloomEngineConfig, GeneratorConfig};
use xia_lpm::fib::FibEntry;
use xia_lpm::generator::generate;
use xia_lpm::lctrie::LcTrie;
use xia_lpm::loader::{load_fib, load_seeds};
use xia_lpm::patricia::PatriciaTrie;
use xia_lpm::xid::Xid;
use xia_lpm::zipf::SampleCache;

/// LPM engine benchmark: synthetic FIBs, Zipf-distributed lookups, one
/// forked run per engine per size.
#[derive(Parser, Debug)]
struct Cli {
    /// Comma-separated `2^k` size exponents to benchmark; defaults to 4..=20
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<u8>>,

    /// Lookups drawn per engine per size
    #[arg(long)]
    lookups: Option<usize>,

    /// Zipf skew parameter
    #[arg(long)]
    zipf_exponent: Option<f64>,

    /// Load a FIB from a text file instead of generating one synthetically
    #[arg(long)]
    fib: Option<std::path::PathBuf>,

    /// Load PRNG seeds from a text file instead of the built-in defaults
    #[arg(long)]
    seeds: Option<std::path::PathBuf>,
}

/// A CPU-time stopwatch, mirroring `std::time::Instant`'s `now`/`elapsed`
/// shape but backed by `CLOCK_PROCESS_CPUTIME_ID` so wall-clock noise from
/// sibling processes on the same machine doesn't leak into a measurement.
struct CpuInstant(TimeSpec);

impl CpuInstant {
    fn now() -> Self {
        Self(clock_gettime(ClockId::CPUTIME_ID).expect("clock_gettime(CPUTIME_ID)"))
    }

    fn elapsed_nanos(&self) -> u64 {
        let now = clock_gettime(ClockId::CPUTIME_ID).expect("clock_gettime(CPUTIME_ID)");
        let start_ns = self.0.tv_sec() as i64 * 1_000_000_000 + self.0.tv_nsec() as i64;
        let now_ns = now.tv_sec() as i64 * 1_000_000_000 + now.tv_nsec() as i64;
        (now_ns - start_ns).max(0) as u64
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut bench_config = BenchConfig::default();
    if let Some(sizes) = cli.sizes {
        bench_config.size_exponents = sizes;
    }
    if let Some(lookups) = cli.lookups {
        bench_config.n_lookups = lookups;
    }
    if let Some(exponent) = cli.zipf_exponent {
        bench_config.zipf_exponent = exponent;
    }

    let mut generator_config = GeneratorConfig::default();
    if let Some(path) = &cli.seeds {
        generator_config.seeds = load_seeds(path).context("loading seed file")?;
    }

    if let Some(path) = &cli.fib {
        let entries = load_fib(path).context("loading FIB file")?;
        run_one_size(&entries, &bench_config)?;
        return Ok(());
    }

    for &k in &bench_config.size_exponents {
        let entries = generate(u32::from(k), &generator_config);
        println!("== size 2^{k} ({} entries) ==", entries.len());
        run_one_size(&entries, &bench_config)?;
    }

    Ok(())
}

fn run_one_size(entries: &[FibEntry], config: &BenchConfig) -> Result<()> {
    check_correctness(entries)?;

    let samples = SampleCache::build(entries.len(), config.n_lookups, config.zipf_exponent, 0xB1A5);

    let patricia_ns = bench_engine(entries, &samples, "patricia", |fib| {
        PatriciaTrie::build(fib).map_err(anyhow::Error::from)
    })?;
    let lctrie_ns = bench_engine(entries, &samples, "lctrie", |fib| {
        LcTrie::build(fib).map_err(anyhow::Error::from)
    })?;
    let bloom_ns = bench_engine(entries, &samples, "bloom", |fib| {
        BloomEngine::build(fib, &BloomEngineConfig::default()).map_err(anyhow::Error::from)
    })?;

    println!(
        "  patricia: {:>12} ns total  ({:.1} ns/lookup)",
        patricia_ns,
        patricia_ns as f64 / config.n_lookups as f64
    );
    println!(
        "  lctrie:   {:>12} ns total  ({:.1} ns/lookup)",
        lctrie_ns,
        lctrie_ns as f64 / config.n_lookups as f64
    );
    println!(
        "  bloom:    {:>12} ns total  ({:.1} ns/lookup)",
        bloom_ns,
        bloom_ns as f64 / config.n_lookups as f64
    );

    Ok(())
}

/// Builds all three engines in-process (never forked, since the check must
/// observe all three handles together) and asserts they agree on every FIB
/// entry's own prefix.
fn check_correctness(entries: &[FibEntry]) -> Result<()> {
    let patricia = PatriciaTrie::build(entries)?;
    let lctrie = LcTrie::build(entries)?;
    let bloom = BloomEngine::build(entries, &BloomEngineConfig::default())?;

    for entry in entries {
        let a = patricia.lookup(&entry.prefix);
        let b = lctrie.lookup(&entry.prefix);
        let c = bloom.lookup(&entry.prefix);
        ensure!(
            a == b && b == c,
            "engines disagree on prefix {:?}/{}: patricia={a} lctrie={b} bloom={c}",
            entry.prefix,
            entry.len
        );
    }

    Ok(())
}

/// Forks a child that builds `entries` into an engine via `build`, runs the
/// sampled lookup loop, times it with [`CpuInstant`], and writes the
/// elapsed nanoseconds back to the parent over a pipe.
fn bench_engine<E>(
    entries: &[FibEntry],
    samples: &SampleCache,
    label: &str,
    build: impl FnOnce(&[FibEntry]) -> Result<E>,
) -> Result<u64>
where
    E: Lookup,
{
    let (read_fd, write_fd) = nix::unistd::pipe().context("creating result pipe")?;

    // SAFETY: the child immediately execs no further work besides building
    // an in-memory engine and writing to its own pipe end before exiting;
    // it touches no shared mutable state inherited from the parent.
    match unsafe { fork() }.context("forking benchmark child")? {
        ForkResult::Child => {
            drop(read_fd);
            let mut write_file = std::fs::File::from(write_fd);

            let engine = build(entries).expect("engine build failed in forked child");

            let timer = CpuInstant::now();
            let mut sink: u64 = 0;
            for &idx in samples.indices() {
                let key = entries[idx].prefix;
                sink = sink.wrapping_add(u64::from(engine.lookup(&key)));
            }
            let elapsed = timer.elapsed_nanos();
            std::hint::black_box(sink);

            write_file
                .write_all(&elapsed.to_le_bytes())
                .expect("writing result to pipe");
            std::process::exit(0);
        }
        ForkResult::Parent { child } => {
            drop(write_fd);
            let mut read_file = std::fs::File::from(read_fd);

            let mut buf = [0u8; 8];
            read_file
                .read_exact(&mut buf)
                .with_context(|| format!("reading {label} result from pipe"))?;

            match nix::sys::wait::waitpid(child, None).context("waiting for benchmark child")? {
                nix::sys::wait::WaitStatus::Exited(_, 0) => {}
                other => bail!("{label} benchmark child exited abnormally: {other:?}"),
            }

            Ok(u64::from_le_bytes(buf))
        }
    }
}

/// The subset of each engine's API the benchmark loop needs, so
/// `bench_engine` can be generic over `PatriciaTrie`/`LcTrie`/`BloomEngine`
/// without hand-rolling an enum dispatch.
trait Lookup {
    fn lookup(&self, key: &Xid) -> u32;
}

impl Lookup for PatriciaTrie {
    fn lookup(&self, key: &Xid) -> u32 {
        PatriciaTrie::lookup(self, key)
    }
}

impl Lookup for LcTrie {
    fn lookup(&self, key: &Xid) -> u32 {
        LcTrie::lookup(self, key)
    }
}

impl Lookup for BloomEngine {
    fn lookup(&self, key: &Xid) -> u32 {
        BloomEngine::lookup(self, key)
    }
}
