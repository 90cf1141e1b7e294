// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! MurmurHash3 x64 128-bit, the hash both the counting Bloom filter and the
//! hashmap consume.
//!
//! Standard public-domain port of Austin Appleby's reference algorithm. The
//! seed is a fixed salt so that a Bloom probe and a hashmap lookup for
//! the same key always agree on which slot bits they derive from, letting
//! callers compute one hash per query and split it two ways (see
//! [`murmur3_x64_128`]).

/// Fixed salt every hash in this crate is seeded with
pub const SALT: u32 = 0x97c2_9b3a;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// The 128-bit MurmurHash3 x64 digest, as two `u64` halves `(low, high)`.
#[must_use]
pub fn murmur3_x64_128(data: &[u8]) -> (u64, u64) {
    let seed = u64::from(SALT);
    let mut h1 = seed;
    let mut h2 = seed;

    let nblocks = data.len() / 16;

    for block in data.chunks_exact(16).take(nblocks) {
        let mut k1 = u64::from_le_bytes(block[0..8].try_into().expect("8 bytes"));
        let mut k2 = u64::from_le_bytes(block[8..16].try_into().expect("8 bytes"));

        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let tail = &data[nblocks * 16..];
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;

    let tail_len = tail.len();

    if tail_len > 8 {
        for (i, &byte) in tail[8..].iter().enumerate() {
            k2 ^= u64::from(byte) << (8 * i);
        }
        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;
    }

    if tail_len > 0 {
        let head = &tail[..tail_len.min(8)];
        for (i, &byte) in head.iter().enumerate() {
            k1 ^= u64::from(byte) << (8 * i);
        }
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

/// The four 32-bit words `(h0, h1, h2, h3)` of the 128-bit digest. `(h0,
/// h1)` feed the counting Bloom filter's double-hashing scheme; `h2 ∥ h3` (the upper 64
/// bits) feed the hashmap as its precomputed slot hash — this split is
/// load-bearing: both consumers must derive from one Murmur
/// invocation per query.
#[must_use]
pub fn murmur3_words(data: &[u8]) -> (u32, u32, u32, u32) {
    let (lo, hi) = murmur3_x64_128(data);
    let h0 = lo as u32;
    let h1 = (lo >> 32) as u32;
    let h2 = hi as u32;
    let h3 = (hi >> 32) as u32;
    (h0, h1, h2, h3)
}

/// Double-hashing seed pair `(h0, h1)` for the counting Bloom filter, derived
/// from the low 64 bits of the digest.
#[must_use]
pub fn bloom_seeds(data: &[u8]) -> (u64, u64) {
    let (lo, _hi) = murmur3_x64_128(data);
    (lo & 0xFFFF_FFFF, lo >> 32)
}

/// The upper 64 bits of the digest, used as the hashmap's precomputed slot
/// hash (`h2 ∥ h3`).
#[must_use]
pub fn map_hash(data: &[u8]) -> u64 {
    let (_lo, hi) = murmur3_x64_128(data);
    hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn deterministic_across_calls() {
        let a = murmur3_x64_128(b"hello world");
        let b = murmur3_x64_128(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_on_different_input() {
        let a = murmur3_x64_128(b"hello world");
        let b = murmur3_x64_128(b"hello world!");
        assert_ne!(a, b);
    }

    #[test]
    fn handles_all_tail_lengths() {
        // exercise every byte-count modulo 16 to cover every tail branch
        for len in 0..=32 {
            let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let _ = murmur3_x64_128(&data);
        }
    }

    #[test]
    fn bloom_and_map_hash_share_one_digest() {
        let data = b"shared-invocation";
        let (h0, h1) = bloom_seeds(data);
        let h64 = map_hash(data);
        let (lo, hi) = murmur3_x64_128(data);
        assert_eq!(h0, lo & 0xFFFF_FFFF);
        assert_eq!(h1, lo >> 32);
        assert_eq!(h64, hi);
    }

    #[test]
    fn empty_input() {
        let (h1, h2) = murmur3_x64_128(b"");
        // Must not panic, and must be a pure function of the seed alone.
        let (h1b, h2b) = murmur3_x64_128(b"");
        assert_eq!((h1, h2), (h1b, h2b));
    }
}
