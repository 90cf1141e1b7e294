// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::xid::Xid;

/// Represents errors that can occur while building or driving an LPM engine
#[derive(Debug)]
pub enum Error {
    /// Two FIB entries share the same `(prefix, len)` after canonicalization
    DuplicateEntry {
        /// The duplicated prefix
        prefix: Xid,
        /// The duplicated length
        len: u32,
    },

    /// A FIB entry's length is outside `[1, 160]`
    InvalidLength {
        /// The offending length
        len: u32,
    },

    /// A FIB entry has nonzero bits at or beyond its stated length
    NonCanonicalPrefix {
        /// The offending prefix
        prefix: Xid,
        /// The stated length
        len: u32,
    },

    /// A counting Bloom filter counter saturated during build
    BloomOverflow {
        /// Index of the counter that overflowed
        counter_index: usize,
    },

    /// The requested capacity/error-rate pair yields zero hash functions
    BloomSizing {
        /// Requested capacity
        capacity: usize,
        /// Requested false-positive rate
        error_rate: f32,
    },

    /// A line in a FIB text file could not be parsed
    MalformedFibLine {
        /// 1-based line number
        line_no: usize,
        /// The offending line, verbatim
        line: String,
    },

    /// I/O error, surfaced by the benchmark harness and text loaders
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LpmError: {self:?}")
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// LPM result
pub type Result<T> = std::result::Result<T, Error>;
