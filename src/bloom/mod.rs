// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! A counting Bloom filter over raw byte keys.
//!
//! Unlike a plain set-only Bloom filter, each slot is a 4-bit saturating
//! counter, so items can be removed as well as added. The counting Bloom
//! engine (`bloom_engine`) never exercises removal, but the filter supports
//! it directly, matching the original library's API surface.
//!
//! Uses double hashing instead of `k` independent hash functions, see:
//! <https://fjall-rs.github.io/post/bloom-filter-hash-sharing>

mod counters;

use crate::error::{Error, Result};
use crate::hash;
use counters::CounterArray;

/// A counting Bloom filter
#[derive(Debug)]
pub struct CountingBloom {
    counters: CounterArray,

    /// Number of hash functions (double-hash rounds)
    n_funcs: usize,

    /// Counters available to each hash function
    counts_per_func: usize,
}

impl CountingBloom {
    /// Builds a filter sized to hold `capacity` items at false-positive rate
    /// `error_rate`.
    ///
    /// `n_funcs = ceil(log2(1 / error_rate))`,
    /// `counts_per_func = ceil(capacity * |ln(error_rate)| / (n_funcs * ln(2)^2))`
    /// Fails if the pair yields zero hash functions.
    pub fn with_capacity(capacity: usize, error_rate: f32) -> Result<Self> {
        if capacity == 0 || !(0.0..1.0).contains(&error_rate) {
            return Err(Error::BloomSizing {
                capacity,
                error_rate,
            });
        }

        let n_funcs = (1.0 / f64::from(error_rate)).log2().ceil() as i64;
        if n_funcs <= 0 {
            return Err(Error::BloomSizing {
                capacity,
                error_rate,
            });
        }
        let n_funcs = n_funcs as usize;

        let ln2_sq = std::f64::consts::LN_2.powi(2);
        let counts_per_func = (capacity as f64 * f64::from(error_rate).ln().abs()
            / (n_funcs as f64 * ln2_sq))
            .ceil() as usize;
        let counts_per_func = counts_per_func.max(1);

        Ok(Self {
            counters: CounterArray::with_len(n_funcs * counts_per_func),
            n_funcs,
            counts_per_func,
        })
    }

    /// Number of hash functions in use
    #[must_use]
    pub fn hash_fn_count(&self) -> usize {
        self.n_funcs
    }

    /// Total number of counters backing this filter
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Counters available per hash function
    #[must_use]
    pub fn counts_per_func(&self) -> usize {
        self.counts_per_func
    }

    fn indices(&self, (mut h0, mut h1): (u64, u64)) -> impl Iterator<Item = usize> + '_ {
        let counts_per_func = self.counts_per_func as u64;
        (0..self.n_funcs as u64).map(move |i| {
            let slot = h0 % counts_per_func;
            h0 = h0.wrapping_add(h1);
            h1 = h1.wrapping_add(i);
            (i * counts_per_func + slot) as usize
        })
    }

    /// Adds a key's precomputed double-hash seed pair to the filter.
    ///
    /// Returns `Err(Error::BloomOverflow)` if a counter would saturate past
    /// 15; this is a fatal sizing bug, never a run-of-the-mill event.
    pub fn add_hash(&mut self, seeds: (u64, u64)) -> Result<()> {
        let indices: Vec<usize> = self.indices(seeds).collect();
        for idx in indices {
            self.counters
                .incr(idx)
                .map_err(|_| Error::BloomOverflow { counter_index: idx })?;
        }
        Ok(())
    }

    /// Adds a raw key to the filter, hashing it with [`hash::bloom_seeds`].
    pub fn add(&mut self, key: &[u8]) -> Result<()> {
        self.add_hash(hash::bloom_seeds(key))
    }

    /// Removes a key's precomputed double-hash seed pair.
    ///
    /// Fails if any indexed counter is already zero (the item, or an item
    /// hashing to the same slots, was never added).
    pub fn remove_hash(&mut self, seeds: (u64, u64)) -> bool {
        let indices: Vec<usize> = self.indices(seeds).collect();
        if indices.iter().any(|&idx| self.counters.get(idx) == 0) {
            return false;
        }
        for idx in indices {
            self.counters.decr(idx);
        }
        true
    }

    /// Removes a raw key from the filter
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.remove_hash(hash::bloom_seeds(key))
    }

    /// Returns `true` if the key's hash seeds may be contained — never a
    /// false negative.
    #[must_use]
    pub fn check_hash(&self, seeds: (u64, u64)) -> bool {
        self.indices(seeds).all(|idx| self.counters.get(idx) > 0)
    }

    /// Returns `true` if the raw key may be contained.
    #[must_use]
    pub fn check(&self, key: &[u8]) -> bool {
        self.check_hash(hash::bloom_seeds(key))
    }
}
