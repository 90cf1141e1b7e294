use test_log::test;

use xia_lpm::bloom_engine::BloomEngine;
use xia_lpm::config::BloomEngineConfig;
use xia_lpm::fib::FibEntry;
use xia_lpm::xid::Xid;

fn entry_at(len_prefix: u32, nexthop: u32) -> FibEntry {
    let mut bytes = [0u8; 20];
    bytes[0] = (len_prefix >> 24) as u8;
    bytes[1] = (len_prefix >> 16) as u8;
    bytes[2] = (len_prefix >> 8) as u8;
    bytes[3] = len_prefix as u8;
    bytes[4] = 0; // zero out the low bit of the 40-bit prefix class
    FibEntry::new(Xid(bytes), 40, nexthop).unwrap()
}

/// 1024 entries, all at length 40, built with a deliberately loose error
/// rate so the per-length Bloom filter reports plenty of false positives.
/// Every probe key whose first 40 bits are absent from the FIB must still
/// resolve to 0 — the hashmap confirms (or refutes) every Bloom hit, so a
/// false positive costs an extra probe but never changes the answer.
#[test]
fn false_positives_never_corrupt_the_answer() {
    let config = BloomEngineConfig {
        error_rate: 0.3,
        ntimes: 1,
    };

    let entries: Vec<FibEntry> = (0u32..1024).map(|i| entry_at(i << 8, i + 1)).collect();
    let engine = BloomEngine::build(&entries, &config).unwrap();

    let present: std::collections::HashSet<u32> = (0u32..1024).map(|i| i << 8).collect();

    let mut misses_checked = 0;
    for i in 0u32..10_000 {
        let probe_class = (i.wrapping_mul(2_654_435_761)) >> 8 << 8;
        if present.contains(&probe_class) {
            continue;
        }

        let mut bytes = [0u8; 20];
        bytes[0] = (probe_class >> 24) as u8;
        bytes[1] = (probe_class >> 16) as u8;
        bytes[2] = (probe_class >> 8) as u8;
        bytes[3] = probe_class as u8;
        let key = Xid(bytes);

        assert_eq!(0, engine.lookup(&key));
        misses_checked += 1;
    }

    // sanity: the probe set was actually disjoint from the FIB for a
    // meaningful number of trials, not trivially empty.
    assert!(misses_checked > 5_000, "too few disjoint probes generated");
}

/// Every FIB entry itself must still resolve to its own nexthop even at a
/// loose error rate: Bloom false positives never shadow a true positive.
#[test]
fn exact_matches_still_resolve_at_a_loose_error_rate() {
    let config = BloomEngineConfig {
        error_rate: 0.3,
        ntimes: 1,
    };
    let entries: Vec<FibEntry> = (0u32..1024).map(|i| entry_at(i << 8, i + 1)).collect();
    let engine = BloomEngine::build(&entries, &config).unwrap();

    for e in &entries {
        assert_eq!(e.nexthop, engine.lookup(&e.prefix));
    }
}
