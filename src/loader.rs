// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Text-format FIB and seed-file loaders for the benchmark harness.
//!
//! Neither loader is reached by the core engines — `patricia`, `lctrie` and
//! `bloom_engine` only ever consume an in-memory `&[FibEntry]`, built either
//! by [`crate::generator::generate`] or by this module, consistent with the
//! no-I/O boundary the engines hold to.

use std::io::BufRead;
use std::path::Path;

use crate::config::GeneratorSeeds;
use crate::error::{Error, Result};
use crate::fib::FibEntry;
use crate::xid::{Xid, BYTES};

/// Loads a FIB from its text format: one entry per line, three
/// whitespace-separated tokens — `<40-hex-digit prefix> <decimal length>
/// <decimal nexthop>`. Malformed lines produce `Error::MalformedFibLine`;
/// well-formed but semantically invalid entries (bad length, non-canonical
/// prefix) surface `FibEntry::new`'s own error instead.
pub fn load_fib(path: impl AsRef<Path>) -> Result<Vec<FibEntry>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);

    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_fib_line(line_no + 1, &line)?);
    }

    Ok(entries)
}

fn parse_fib_line(line_no: usize, line: &str) -> Result<FibEntry> {
    let malformed = || Error::MalformedFibLine {
        line_no,
        line: line.to_string(),
    };

    let mut tokens = line.split_whitespace();
    let prefix_tok = tokens.next().ok_or_else(malformed)?;
    let len_tok = tokens.next().ok_or_else(malformed)?;
    let nexthop_tok = tokens.next().ok_or_else(malformed)?;
    if tokens.next().is_some() {
        return Err(malformed());
    }

    let prefix = parse_hex_prefix(prefix_tok).ok_or_else(malformed)?;
    let len: u32 = len_tok.parse().map_err(|_| malformed())?;
    let nexthop: u32 = nexthop_tok.parse().map_err(|_| malformed())?;

    FibEntry::new(prefix, len, nexthop)
}

fn parse_hex_prefix(tok: &str) -> Option<Xid> {
    if tok.len() != BYTES * 2 {
        return None;
    }

    let mut bytes = [0u8; BYTES];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&tok[i * 2..i * 2 + 2], 16).ok()?;
    }

    Some(Xid(bytes))
}

/// Loads a seed file: newline-separated 8-hex-digit `u32` values, folded
/// round-robin into the three `GeneratorSeeds` streams. A file with fewer
/// than three values, or none at all, leaves the corresponding streams at
/// their default seed.
pub fn load_seeds(path: impl AsRef<Path>) -> Result<GeneratorSeeds> {
    let contents = std::fs::read_to_string(path)?;

    let mut acc = [None::<u32>; 3];
    for (i, line) in contents.lines().filter(|l| !l.trim().is_empty()).enumerate() {
        let value = u32::from_str_radix(line.trim(), 16).map_err(|_| Error::MalformedFibLine {
            line_no: i + 1,
            line: line.to_string(),
        })?;
        let slot = &mut acc[i % 3];
        *slot = Some(slot.map_or(value, |prev| prev ^ value));
    }

    let defaults = GeneratorSeeds::default();
    Ok(GeneratorSeeds {
        length_seed: acc[0].map_or(defaults.length_seed, u64::from),
        prefix_seed: acc[1].map_or(defaults.prefix_seed, u64::from),
        nexthop_seed: acc[2].map_or(defaults.nexthop_seed, u64::from),
    })
}
