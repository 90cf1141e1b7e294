// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Parallel counting-Bloom-filter LPM engine.
//!
//! One [`CountingBloom`] plus one [`XidHashMap`] per prefix length that
//! actually appears in the FIB. A lookup probes every active length from
//! 160 down to 1: a Bloom miss skips the length outright, a Bloom hit is
//! confirmed against that length's hashmap, and a false positive (Bloom
//! hit, hashmap miss) simply falls through to the next shorter length —
//! the hashmap's exact-equality check means a false positive can cost a
//! wasted probe but never a wrong answer.

use crate::bloom::CountingBloom;
use crate::config::BloomEngineConfig;
use crate::error::Result;
use crate::fib::{validate_and_sort, FibEntry, NexthopTable};
use crate::hash;
use crate::hashmap::XidHashMap;
use crate::xid::Xid;

struct LengthBucket {
    bloom: CountingBloom,
    map: XidHashMap,
}

/// One Murmur invocation, split into the Bloom filter's double-hash seeds
/// and the hashmap's precomputed slot hash — shared by build and
/// lookup so the two structures never disagree on a key's digest.
fn digest(prefix: &Xid) -> ((u64, u64), u64) {
    let (lo, hi) = hash::murmur3_x64_128(prefix.as_bytes());
    ((lo & 0xFFFF_FFFF, lo >> 32), hi)
}

/// A built Bloom-based LPM engine.
pub struct BloomEngine {
    // Indexed by prefix length, 1..=160; index 0 is always `None`.
    buckets: Vec<Option<LengthBucket>>,
    nexthops: NexthopTable,
}

impl BloomEngine {
    /// Buckets entries by length, building one counting Bloom filter and
    /// one hashmap per length that has at least one entry. Each bucket's
    /// Bloom filter is sized `config.ntimes * n_entries` at
    /// `config.error_rate`.
    pub fn build(entries: &[FibEntry], config: &BloomEngineConfig) -> Result<Self> {
        let sorted = validate_and_sort(entries)?;
        let (nexthops, nexthop_indices) = NexthopTable::build(&sorted);

        let mut per_length: Vec<Vec<(Xid, u32)>> = (0..=160).map(|_| Vec::new()).collect();
        for (entry, &nh_idx) in sorted.iter().zip(&nexthop_indices) {
            per_length[entry.len as usize].push((entry.prefix, nh_idx));
        }

        let mut buckets: Vec<Option<LengthBucket>> = Vec::with_capacity(161);
        buckets.push(None);
        for items in per_length.into_iter().skip(1) {
            if items.is_empty() {
                buckets.push(None);
                continue;
            }

            let capacity = (items.len() * config.ntimes).max(1);
            let mut bloom = CountingBloom::with_capacity(capacity, config.error_rate)?;
            let mut map = XidHashMap::with_capacity(items.len());

            for (prefix, nh_idx) in items {
                let (seeds, h64) = digest(&prefix);
                bloom.add_hash(seeds)?;
                map.insert(prefix, nh_idx, h64);
            }

            buckets.push(Some(LengthBucket { bloom, map }));
        }

        log::debug!(
            "bloom_engine: {} active length buckets out of 160",
            buckets.iter().filter(|b| b.is_some()).count()
        );

        Ok(Self { buckets, nexthops })
    }

    /// Longest-prefix-match lookup, probing active lengths from 160 down
    /// to 1. Returns `0` if no FIB entry matches.
    #[must_use]
    pub fn lookup(&self, key: &Xid) -> u32 {
        for len in (1..=160u32).rev() {
            let Some(bucket) = &self.buckets[len as usize] else {
                continue;
            };

            let probe = key.canonicalize(len);
            let (seeds, h64) = digest(&probe);

            if bucket.bloom.check_hash(seeds) {
                if let Some(nh_idx) = bucket.map.get(&probe, h64) {
                    return self.nexthops.get(nh_idx);
                }
            }
        }

        0
    }

    /// Number of prefix lengths with at least one active entry.
    #[must_use]
    pub fn active_length_count(&self) -> usize {
        self.buckets.iter().filter(|b| b.is_some()).count()
    }
}
