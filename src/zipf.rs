// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Zipf-distributed lookup sampling for the benchmark harness.
//!
//! Real FIB traffic is skewed: a small number of prefixes receive most
//! lookups. Sampling indices from a Zipf distribution instead of uniformly
//! exercises each engine's hot-path/cold-path balance the way a flat
//! uniform sample wouldn't. The sample set is drawn once per FIB size and
//! reused across every engine's run, so all three see identical traffic.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Zipf};

/// A precomputed cache of FIB-entry indices, Zipf-distributed over
/// `[0, n_entries)`.
pub struct SampleCache {
    indices: Vec<usize>,
}

impl SampleCache {
    /// Draws `n_samples` indices into `[0, n_entries)` with skew `exponent`,
    /// seeded deterministically so repeat runs over the same FIB size probe
    /// the same sequence.
    #[must_use]
    pub fn build(n_entries: usize, n_samples: usize, exponent: f64, seed: u64) -> Self {
        assert!(n_entries > 0, "cannot sample lookups over an empty FIB");

        let mut rng = StdRng::seed_from_u64(seed);
        // rand_distr's Zipf is 1-indexed over [1, n]; shift back to [0, n).
        let zipf = Zipf::new(n_entries as u64, exponent).expect("valid zipf parameters");

        let indices = (0..n_samples)
            .map(|_| (zipf.sample(&mut rng) as usize - 1).min(n_entries - 1))
            .collect();

        Self { indices }
    }

    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn indices_stay_in_range() {
        let cache = SampleCache::build(100, 10_000, 1.2, 42);
        assert_eq!(10_000, cache.len());
        assert!(cache.indices().iter().all(|&i| i < 100));
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = SampleCache::build(50, 1_000, 1.2, 7);
        let b = SampleCache::build(50, 1_000, 1.2, 7);
        assert_eq!(a.indices(), b.indices());
    }

    #[test]
    fn skew_concentrates_on_low_indices() {
        let cache = SampleCache::build(1_000, 20_000, 1.5, 1);
        let hits_in_top_10: usize = cache.indices().iter().filter(|&&i| i < 10).count();
        // With a steep skew, the first few indices should take a
        // disproportionate share of draws versus a uniform 10/1000 = 1%.
        assert!(hits_in_top_10 as f64 / cache.len() as f64 > 0.05);
    }
}
