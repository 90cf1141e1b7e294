// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Open-chained exact-match hashmap, keyed by an externally supplied 64-bit
//! hash: callers compute one MurmurHash3 digest per key and
//! split it between the counting Bloom filter and this map, instead of
//! hashing twice.

use crate::xid::Xid;

struct Entry {
    key: Xid,
    value: u32,
    next: Option<u32>,
    /// Unlinked from its chain by `delete`, but kept in `entries` so every
    /// other entry's index stays stable. `grow` skips these when rehashing.
    tombstoned: bool,
}

/// Exact `Xid -> u32` lookup table, single-threaded, no internal hashing.
pub struct XidHashMap {
    buckets: Vec<Option<u32>>,
    entries: Vec<Entry>,
    len: usize,
}

const LOAD_FACTOR: f64 = 0.75;

impl XidHashMap {
    /// Creates a map with room for roughly `capacity_hint` entries before
    /// the first resize.
    #[must_use]
    pub fn with_capacity(capacity_hint: usize) -> Self {
        let n_buckets = (capacity_hint.max(1) as f64 / LOAD_FACTOR)
            .ceil()
            .next_power_of_two() as usize;

        Self {
            buckets: vec![None; n_buckets.max(1)],
            entries: Vec::with_capacity(capacity_hint),
            len: 0,
        }
    }

    /// Number of entries stored
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_of(&self, h64: u64) -> usize {
        // table size is always a power of two
        (h64 as usize) & (self.buckets.len() - 1)
    }

    /// Inserts or updates `key -> value` under the precomputed hash `h64`.
    pub fn insert(&mut self, key: Xid, value: u32, h64: u64) {
        if (self.len + 1) as f64 > self.buckets.len() as f64 * LOAD_FACTOR {
            self.grow();
        }

        let bucket = self.bucket_of(h64);
        let mut cursor = self.buckets[bucket];

        while let Some(idx) = cursor {
            let entry = &mut self.entries[idx as usize];
            if entry.key == key {
                entry.value = value;
                return;
            }
            cursor = entry.next;
        }

        let new_idx = self.entries.len() as u32;
        self.entries.push(Entry {
            key,
            value,
            next: self.buckets[bucket],
            tombstoned: false,
        });
        self.buckets[bucket] = Some(new_idx);
        self.len += 1;
    }

    /// Looks up `key` under the precomputed hash `h64`.
    #[must_use]
    pub fn get(&self, key: &Xid, h64: u64) -> Option<u32> {
        let bucket = self.bucket_of(h64);
        let mut cursor = self.buckets[bucket];

        while let Some(idx) = cursor {
            let entry = &self.entries[idx as usize];
            if entry.key == *key {
                return Some(entry.value);
            }
            cursor = entry.next;
        }

        None
    }

    /// Removes `key` under the precomputed hash `h64`, returning its value
    /// if present. Kept for API completeness (the LPM engines never delete),
    /// grounded on the original `hashmap.c`'s `hashit_delete`.
    pub fn delete(&mut self, key: &Xid, h64: u64) -> Option<u32> {
        let bucket = self.bucket_of(h64);
        let mut cursor = self.buckets[bucket];
        let mut prev: Option<usize> = None;

        while let Some(idx) = cursor {
            let idx = idx as usize;
            if self.entries[idx].key == *key {
                let next = self.entries[idx].next;
                match prev {
                    Some(prev_idx) => self.entries[prev_idx].next = next,
                    None => self.buckets[bucket] = next,
                }
                self.entries[idx].tombstoned = true;
                self.len -= 1;
                return Some(self.entries[idx].value);
            }
            prev = Some(idx);
            cursor = self.entries[idx].next;
        }

        None
    }

    fn grow(&mut self) {
        let new_size = (self.buckets.len() * 2).max(2);
        self.buckets = vec![None; new_size];

        for idx in 0..self.entries.len() {
            if self.entries[idx].tombstoned {
                continue;
            }
            let h64 = crate::hash::map_hash(&self.entries[idx].key.0);
            let bucket = (h64 as usize) & (self.buckets.len() - 1);
            self.entries[idx].next = self.buckets[bucket];
            self.buckets[bucket] = Some(idx as u32);
        }
    }
}
