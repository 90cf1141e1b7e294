// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Longest-prefix-match (LPM) forwarding-information-base lookup on
//! 160-bit identifiers (XIDs), as required by a next-generation
//! internetworking architecture whose addresses are SHA-1-sized principal
//! identifiers.
//!
//! Given a FIB of `(prefix, length, nexthop)` tuples, the crate answers:
//! for input XID `x`, return the nexthop of the longest FIB prefix that
//! matches `x`, or `0` if none does. Three interchangeable engines build
//! from the same `&[FibEntry]` and share one lookup contract
//! (`fn lookup(&self, key: &Xid) -> u32`):
//!
//! - [`patricia::PatriciaTrie`] — a path-compressed binary radix trie with
//!   a sibling prefix chain; the baseline.
//! - [`lctrie::LcTrie`] — a level- and path-compressed, word-packed array,
//!   built as a compression pass over a [`patricia::PatriciaTrie`].
//! - [`bloom_engine::BloomEngine`] — one counting Bloom filter and one
//!   exact hashmap per distinct prefix length, probed longest-length-first.
//!
//! # Example
//!
//! ```
//! use xia_lpm::fib::FibEntry;
//! use xia_lpm::patricia::PatriciaTrie;
//! use xia_lpm::xid::Xid;
//!
//! let mut prefix = [0u8; 20];
//! prefix[0] = 0b1010_0000;
//! let entry = FibEntry::new(Xid(prefix), 4, 7)?;
//!
//! let trie = PatriciaTrie::build(&[entry])?;
//! assert_eq!(7, trie.lookup(&Xid(prefix)));
//! # Ok::<(), xia_lpm::error::Error>(())
//! ```
//!
//! All structures here are built once from an immutable FIB snapshot and
//! are read-only afterward: there is no incremental update, no
//! concurrency, and no persistence. Build is offline;
//! lookup is single-threaded per engine instance.

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Binary-search helper shared by the Patricia builder.
pub mod binary_search;

/// Counting Bloom filter over raw byte keys.
pub mod bloom;

/// Parallel counting-Bloom-filter LPM engine.
pub mod bloom_engine;

/// Explicit, per-build configuration structs.
pub mod config;

/// Crate-wide error and result types.
pub mod error;

/// The FIB entry type and shared build-time bookkeeping.
pub mod fib;

/// Synthetic FIB generation.
pub mod generator;

/// MurmurHash3-x64-128, shared by the Bloom filter and the hashmap.
pub mod hash;

/// Open-chained exact-match hashmap keyed by an externally supplied hash.
pub mod hashmap;

/// Level- and path-compressed trie, built as a compression pass over a Patricia trie.
pub mod lctrie;

/// Path-compressed radix trie (Patricia) with a sibling prefix chain.
pub mod patricia;

/// 160-bit bitstring primitives shared by every LPM engine.
pub mod xid;

/// Text-format FIB and seed-file loaders, used only by the benchmark binary.
#[cfg(feature = "bench-harness")]
pub mod loader;

/// Zipf-distributed lookup sampling for the benchmark harness.
#[cfg(feature = "bench-harness")]
pub mod zipf;

pub use bloom_engine::BloomEngine;
pub use config::{BenchConfig, BloomEngineConfig, GeneratorConfig, GeneratorSeeds};
pub use error::{Error, Result};
pub use fib::{FibEntry, NexthopTable};
pub use lctrie::LcTrie;
pub use patricia::PatriciaTrie;
pub use xid::Xid;
