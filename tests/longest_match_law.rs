use test_log::test;

use xia_lpm::fib::FibEntry;
use xia_lpm::patricia::PatriciaTrie;
use xia_lpm::xid::Xid;

fn xid_bits(bits: &[u8]) -> Xid {
    let mut bytes = [0u8; 20];
    for (i, chunk) in bits.chunks(8).enumerate() {
        let mut byte = 0u8;
        for (j, &bit) in chunk.iter().enumerate() {
            if bit != 0 {
                byte |= 0x80 >> j;
            }
        }
        bytes[i] = byte;
    }
    Xid(bytes)
}

/// A brute-force reference: the nexthop of whichever FIB entry has the
/// longest prefix matching `key`, or 0 if none matches.
fn brute_force_lookup(fib: &[FibEntry], key: &Xid) -> u32 {
    fib.iter()
        .filter(|e| key.matches_prefix(&e.prefix, e.len))
        .max_by_key(|e| e.len)
        .map_or(0, |e| e.nexthop)
}

#[test]
fn patricia_matches_brute_force_on_a_small_overlapping_fib() {
    let fib = [
        FibEntry::new(xid_bits(&[1]), 1, 1).unwrap(),
        FibEntry::new(xid_bits(&[1, 0]), 2, 2).unwrap(),
        FibEntry::new(xid_bits(&[1, 0, 1]), 3, 3).unwrap(),
        FibEntry::new(xid_bits(&[1, 0, 1, 1]), 4, 4).unwrap(),
        FibEntry::new(xid_bits(&[0, 1]), 2, 5).unwrap(),
        FibEntry::new(xid_bits(&[0, 1, 1, 0, 1]), 5, 6).unwrap(),
    ];
    let trie = PatriciaTrie::build(&fib).unwrap();

    let probes = [
        xid_bits(&[1, 0, 1, 1, 0, 0]),
        xid_bits(&[1, 0, 1, 0, 0, 0]),
        xid_bits(&[0, 1, 1, 0, 1, 1]),
        xid_bits(&[0, 1, 0, 0, 0, 0]),
        xid_bits(&[0, 0, 0, 0, 0, 0]),
    ];

    for key in probes {
        assert_eq!(
            brute_force_lookup(&fib, &key),
            trie.lookup(&key),
            "mismatch for key {key:?}"
        );
    }
}

#[test]
fn longer_prefix_wins_over_shorter_overlapping_one() {
    let fib = [
        FibEntry::new(xid_bits(&[1]), 1, 10).unwrap(),
        FibEntry::new(xid_bits(&[1, 1]), 2, 20).unwrap(),
    ];
    let trie = PatriciaTrie::build(&fib).unwrap();

    assert_eq!(20, trie.lookup(&xid_bits(&[1, 1, 1])));
    assert_eq!(10, trie.lookup(&xid_bits(&[1, 0, 1])));
    assert_eq!(0, trie.lookup(&xid_bits(&[0, 1, 0])));
}

#[test]
fn no_match_returns_zero() {
    let fib = [FibEntry::new(xid_bits(&[1, 0, 1]), 3, 7).unwrap()];
    let trie = PatriciaTrie::build(&fib).unwrap();
    assert_eq!(0, trie.lookup(&xid_bits(&[0, 0, 0])));
}
