// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Synthetic FIB generation.
//!
//! Drawing prefix length, prefix bits, and nexthop from a single
//! process-wide PRNG stream would couple the three distributions together:
//! reordering the draws, or adding a fourth one, would change every FIB the
//! generator has ever produced. Three independent streams, one per
//! distribution, make each one reproducible on its own.

use crate::config::GeneratorConfig;
use crate::fib::FibEntry;
use crate::xid::Xid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

/// Generates `2^tablexp` distinct `(prefix, length, nexthop)` entries.
///
/// Lengths are drawn uniformly from `[config.min_len, config.min_len +
/// config.len_spread)`; prefixes are drawn uniformly over the full key space
/// and canonicalized to the drawn length (bits at or past the length are
/// zeroed); nexthops are drawn uniformly from `[1, config.nexthop_count]`.
///
/// A `(prefix, length)` pair colliding with one already emitted is resolved
/// by repeatedly incrementing the prefix within its length's bit budget
/// until the collision clears. Same `tablexp` and `config` always produce
/// the same entries, in the same order.
#[must_use]
pub fn generate(tablexp: u32, config: &GeneratorConfig) -> Vec<FibEntry> {
    let n = 1usize << tablexp;

    let mut length_rng = StdRng::seed_from_u64(config.seeds.length_seed);
    let mut prefix_rng = StdRng::seed_from_u64(config.seeds.prefix_seed);
    let mut nexthop_rng = StdRng::seed_from_u64(config.seeds.nexthop_seed);

    let mut taken: FxHashSet<(Xid, u32)> = FxHashSet::default();
    let mut entries = Vec::with_capacity(n);

    for _ in 0..n {
        let len = config.min_len + length_rng.random_range(0..config.len_spread);
        let nexthop = nexthop_rng.random_range(1..=config.nexthop_count);

        let mut prefix = random_xid(&mut prefix_rng).canonicalize(len);
        while taken.contains(&(prefix, len)) {
            prefix = prefix.increment_within(len);
        }
        taken.insert((prefix, len));

        entries.push(FibEntry {
            prefix,
            len,
            nexthop,
        });
    }

    entries
}

fn random_xid(rng: &mut StdRng) -> Xid {
    let mut bytes = [0u8; 20];
    rng.fill(&mut bytes);
    Xid(bytes)
}
