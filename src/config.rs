// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Explicit, per-build configuration structs.
//!
//! There is no legitimate need for process-wide mutable state in an
//! offline, single-threaded build path, so every tunable — fill-factor
//! knobs, PRNG seeds, Bloom sizing — is threaded through as an explicit
//! config value instead of a global.

use crate::fib::{MAX_LEN, MIN_LEN};

/// Bloom-engine (C8) sizing knobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomEngineConfig {
    /// Target false-positive rate per length bucket
    pub error_rate: f32,
    /// Bloom filter is sized `ntimes * n_entries` for its length bucket
    pub ntimes: usize,
}

impl Default for BloomEngineConfig {
    fn default() -> Self {
        Self {
            error_rate: 0.05,
            ntimes: 2,
        }
    }
}

/// Three independent PRNG seed streams for the FIB generator: one
/// each for prefix length, prefix bits, and nexthop selection, so that a
/// fixed seed triple reproduces byte-identical FIBs across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorSeeds {
    /// Seeds the prefix-length stream
    pub length_seed: u64,
    /// Seeds the prefix-bits stream
    pub prefix_seed: u64,
    /// Seeds the nexthop-selection stream
    pub nexthop_seed: u64,
}

impl Default for GeneratorSeeds {
    fn default() -> Self {
        Self {
            length_seed: 0x5EED_0001,
            prefix_seed: 0x5EED_0002,
            nexthop_seed: 0x5EED_0003,
        }
    }
}

/// FIB generator (C5) configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Shortest prefix length the generator will emit
    pub min_len: u32,
    /// Prefix lengths are drawn from `[min_len, min_len + len_spread)`
    pub len_spread: u32,
    /// Number of distinct nexthops; nexthops are drawn from `[1, nexthop_count]`
    pub nexthop_count: u32,
    /// PRNG seed streams
    pub seeds: GeneratorSeeds,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_len: MIN_LEN,
            len_spread: MAX_LEN - MIN_LEN + 1,
            nexthop_count: 64,
            seeds: GeneratorSeeds::default(),
        }
    }
}

/// Benchmark-harness (C9) configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// FIB sizes to measure, as `2^k` exponents
    pub size_exponents: Vec<u8>,
    /// Number of lookups drawn per measurement run
    pub n_lookups: usize,
    /// Zipf distribution skew parameter
    pub zipf_exponent: f64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size_exponents: (4..=20).collect(),
            n_lookups: 1_000_000,
            zipf_exponent: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn generator_config_defaults_match_contract_constants() {
        let cfg = GeneratorConfig::default();
        assert_eq!(20, cfg.min_len);
        assert_eq!(140, cfg.len_spread);
    }

    #[test]
    fn bloom_engine_config_defaults_match_contract_constants() {
        let cfg = BloomEngineConfig::default();
        assert_eq!(0.05, cfg.error_rate);
        assert_eq!(2, cfg.ntimes);
    }

    #[test]
    fn bench_config_default_covers_k_4_to_20() {
        let cfg = BenchConfig::default();
        assert_eq!(4, *cfg.size_exponents.first().unwrap());
        assert_eq!(20, *cfg.size_exponents.last().unwrap());
        assert_eq!(1_000_000, cfg.n_lookups);
    }
}
