use test_log::test;

use xia_lpm::bloom_engine::BloomEngine;
use xia_lpm::config::{BloomEngineConfig, GeneratorConfig};
use xia_lpm::generator::generate;
use xia_lpm::lctrie::LcTrie;
use xia_lpm::patricia::PatriciaTrie;
use xia_lpm::xid::Xid;

/// For every FIB and every key drawn from the FIB's own prefixes, all three
/// engines must return the same nexthop.
#[test]
fn engines_agree_on_every_fib_entry() {
    for k in 4..=14u32 {
        let entries = generate(k, &GeneratorConfig::default());

        let patricia = PatriciaTrie::build(&entries).unwrap();
        let lctrie = LcTrie::build(&entries).unwrap();
        let bloom = BloomEngine::build(&entries, &BloomEngineConfig::default()).unwrap();

        for entry in &entries {
            let a = patricia.lookup(&entry.prefix);
            let b = lctrie.lookup(&entry.prefix);
            let c = bloom.lookup(&entry.prefix);
            assert_eq!(a, b, "patricia/lctrie disagree at k={k}");
            assert_eq!(b, c, "lctrie/bloom disagree at k={k}");
        }
    }
}

/// Same as above, but for keys that are *not* guaranteed to be in the FIB —
/// exercises the "no match" path identically across all three engines.
#[test]
fn engines_agree_on_arbitrary_probe_keys() {
    let entries = generate(12, &GeneratorConfig::default());

    let patricia = PatriciaTrie::build(&entries).unwrap();
    let lctrie = LcTrie::build(&entries).unwrap();
    let bloom = BloomEngine::build(&entries, &BloomEngineConfig::default()).unwrap();

    let mut bytes = [0u8; 20];
    for seed in 0..2_000u32 {
        bytes[0] = seed as u8;
        bytes[1] = (seed >> 8) as u8;
        bytes[2] = (seed >> 16) as u8;
        bytes[19] = seed.wrapping_mul(31) as u8;
        let key = Xid(bytes);

        let a = patricia.lookup(&key);
        let b = lctrie.lookup(&key);
        let c = bloom.lookup(&key);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }
}

/// Every FIB of size 2^k has every entry's own prefix resolve under all
/// three engines, across a wider span of sizes than the unit-test suites
/// exercise individually.
#[test]
fn every_entry_resolves_to_its_own_nexthop_across_sizes() {
    for k in 4..=16u32 {
        let entries = generate(k, &GeneratorConfig::default());
        let patricia = PatriciaTrie::build(&entries).unwrap();
        let lctrie = LcTrie::build(&entries).unwrap();
        let bloom = BloomEngine::build(&entries, &BloomEngineConfig::default()).unwrap();

        for entry in &entries {
            assert_eq!(entry.nexthop, patricia.lookup(&entry.prefix));
            assert_eq!(entry.nexthop, lctrie.lookup(&entry.prefix));
            assert_eq!(entry.nexthop, bloom.lookup(&entry.prefix));
        }
    }
}
