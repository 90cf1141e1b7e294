// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Level- and path-compressed trie (LC-trie), built as a post-pass over a
//! [`PatriciaTrie`].
//!
//! Collapsing `b` binary levels into one `2^b`-way branch is only lossless
//! when every node strictly between the collapsed root and its depth-`b`
//! descendants has `skip == 0` — any nonzero skip there represents bits the
//! flat `extract(pos, branch, key)` read wouldn't reproduce. Nodes are
//! checked bottom-up (`branch(leaf) = 0`, `branch(internal) = 1 +
//! min(branch(left), branch(right))`), then validated along the
//! collapsed span and reduced to `branch = 1` wherever that validation
//! fails. The depth-`b` descendant collector doubles as
//! the fan-out handler for the "leaf shorter than the branch" edge case:
//! a leaf reached before depth `b` is simply replicated across every slot
//! its subtree would have occupied.

use std::collections::VecDeque;

use crate::error::Result;
use crate::fib::{FibEntry, NexthopTable};
use crate::patricia::{confirm, BaseEntry, Node, PatriciaTrie, PrefixEntry};
use crate::xid::Xid;

/// A 64-bit packed LC-trie node: `branch` (8 bits), `skip` (8 bits),
/// `child_or_base` (32 bits); the remaining 16 bits are reserved.
type PackedWord = u64;

fn pack(branch: u8, skip: u8, child_or_base: u32) -> PackedWord {
    (u64::from(branch) << 56) | (u64::from(skip) << 48) | u64::from(child_or_base)
}

fn word_branch(word: PackedWord) -> u8 {
    (word >> 56) as u8
}

fn word_skip(word: PackedWord) -> u8 {
    (word >> 48) as u8
}

fn word_child(word: PackedWord) -> u32 {
    (word & 0xFFFF_FFFF) as u32
}

/// An intermediate, tree-shaped representation built while compressing;
/// flattened into a BFS-ordered `Vec<PackedWord>` as the final step.
enum TempNode {
    Leaf { skip: u32, base: u32 },
    Internal {
        skip: u32,
        branch: u8,
        children: Vec<TempNode>,
    },
}

/// A built LC-trie: the packed node array plus the base/prefix/nexthop
/// tables inherited unchanged from the Patricia trie it was compressed
/// from.
#[derive(Debug)]
pub struct LcTrie {
    nodes: Vec<PackedWord>,
    base: Vec<BaseEntry>,
    pre: Vec<PrefixEntry>,
    nexthops: NexthopTable,
}

/// `1 + min(branch(left), branch(right))` for internal nodes, `0` for
/// leaves, computed bottom-up in a single pass over the arena: every
/// child's arena index is smaller than its parent's, since the Patricia
/// builder only ever pushes a node after both its children.
fn compute_branch_raw(nodes: &[Node]) -> Vec<u32> {
    let mut branch = vec![0u32; nodes.len()];
    for (idx, node) in nodes.iter().enumerate() {
        if let Node::Internal { left, right, .. } = node {
            branch[idx] = 1 + branch[*left as usize].min(branch[*right as usize]);
        }
    }
    branch
}

/// `true` if any internal node strictly between `idx` and depth
/// `depth_to_go` below it has a nonzero skip. `depth_to_go == 0` means
/// `idx` itself is already the depth-`b` descendant, whose own skip is
/// preserved rather than required to be zero.
fn has_nonzero_skip_before_depth(nodes: &[Node], idx: u32, depth_to_go: u32) -> bool {
    if depth_to_go == 0 {
        return false;
    }
    match nodes[idx as usize] {
        Node::Leaf { .. } => false,
        Node::Internal { skip, left, right } => {
            skip != 0
                || has_nonzero_skip_before_depth(nodes, left, depth_to_go - 1)
                || has_nonzero_skip_before_depth(nodes, right, depth_to_go - 1)
        }
    }
}

/// Collects the `2^depth` descendants of `idx` exactly `depth` levels
/// below it, in left-to-right order. A leaf reached before `depth` levels
/// have been consumed is replicated across every slot its shortfall would
/// otherwise leave empty.
fn collect_descendants(nodes: &[Node], idx: u32, depth: u32) -> Vec<u32> {
    if depth == 0 {
        return vec![idx];
    }
    match nodes[idx as usize] {
        Node::Leaf { .. } => vec![idx; 1usize << depth],
        Node::Internal { left, right, .. } => {
            let mut v = collect_descendants(nodes, left, depth - 1);
            v.extend(collect_descendants(nodes, right, depth - 1));
            v
        }
    }
}

/// Builds the compressed tree rooted at `idx`, choosing (and validating)
/// each internal node's branch factor along the way.
fn build_compressed(nodes: &[Node], idx: u32, branch_raw: &[u32]) -> TempNode {
    match nodes[idx as usize] {
        Node::Leaf { skip, base } => TempNode::Leaf { skip, base },
        Node::Internal { skip, left, right } => {
            let mut branch = branch_raw[idx as usize];
            if branch >= 2
                && (has_nonzero_skip_before_depth(nodes, left, branch - 1)
                    || has_nonzero_skip_before_depth(nodes, right, branch - 1))
            {
                branch = 1;
            }

            let descendants = collect_descendants(nodes, idx, branch);
            let children = descendants
                .into_iter()
                .map(|d| build_compressed(nodes, d, branch_raw))
                .collect();

            TempNode::Internal {
                skip,
                branch: branch as u8,
                children,
            }
        }
    }
}

/// Lays the compressed tree out breadth-first into a flat packed-word
/// array: a node's children always occupy a contiguous block immediately
/// after the array's current end, so `child_or_base` can point at the
/// first child and the rest follow by offset.
fn flatten(root: TempNode) -> Vec<PackedWord> {
    let mut words = vec![0u64];
    let mut queue: VecDeque<(usize, TempNode)> = VecDeque::new();
    queue.push_back((0, root));

    while let Some((my_idx, node)) = queue.pop_front() {
        match node {
            TempNode::Leaf { skip, base } => {
                words[my_idx] = pack(0, skip as u8, base);
            }
            TempNode::Internal {
                skip,
                branch,
                children,
            } => {
                let first_child = words.len();
                words.resize(first_child + children.len(), 0);
                words[my_idx] = pack(branch, skip as u8, first_child as u32);
                for (i, child) in children.into_iter().enumerate() {
                    queue.push_back((first_child + i, child));
                }
            }
        }
    }

    words
}

impl LcTrie {
    /// Builds a Patricia trie, then compresses it into a level- and
    /// path-compressed array. Fails exactly as [`PatriciaTrie::build`]
    /// does on a malformed FIB.
    pub fn build(entries: &[FibEntry]) -> Result<Self> {
        let patricia = PatriciaTrie::build(entries)?;
        Ok(Self::from_patricia(patricia))
    }

    fn from_patricia(patricia: PatriciaTrie) -> Self {
        let PatriciaTrie {
            nodes,
            root,
            base,
            pre,
            nexthops,
        } = patricia;

        let packed = match root {
            None => Vec::new(),
            Some(root) => {
                let branch_raw = compute_branch_raw(&nodes);
                let compressed = build_compressed(&nodes, root, &branch_raw);
                flatten(compressed)
            }
        };

        log::debug!(
            "lctrie: {} patricia nodes -> {} packed words ({:.1}x)",
            nodes.len(),
            packed.len(),
            nodes.len() as f64 / packed.len().max(1) as f64,
        );

        Self {
            nodes: packed,
            base,
            pre,
            nexthops,
        }
    }

    /// Longest-prefix-match lookup. Returns `0` if no FIB entry matches.
    #[must_use]
    pub fn lookup(&self, key: &Xid) -> u32 {
        if self.nodes.is_empty() {
            return 0;
        }

        let mut word = self.nodes[0];
        let mut pos = u32::from(word_skip(word));
        let mut branch = word_branch(word);
        let mut adr = word_child(word);

        while branch != 0 {
            let offset = key.extract(pos, u32::from(branch)).low_u32();
            word = self.nodes[(adr + offset) as usize];
            pos += u32::from(branch) + u32::from(word_skip(word));
            branch = word_branch(word);
            adr = word_child(word);
        }

        confirm(&self.base, &self.pre, &self.nexthops, adr, key)
    }

    /// Number of packed words in the array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::config::GeneratorConfig;
    use test_log::test;

    fn xid_of(b: u8) -> Xid {
        let mut bytes = [0u8; 20];
        bytes[0] = b;
        Xid(bytes)
    }

    #[test]
    fn empty_fib_always_misses() {
        let trie = LcTrie::build(&[]).unwrap();
        assert!(trie.is_empty());
        assert_eq!(0, trie.lookup(&Xid::ZERO));
    }

    #[test]
    fn scenario_a_single_entry_exact_match() {
        let entries = [FibEntry::new(xid_of(0xAA), 8, 42).unwrap()];
        let trie = LcTrie::build(&entries).unwrap();
        assert_eq!(42, trie.lookup(&xid_of(0xAA)));
        assert_eq!(0, trie.lookup(&xid_of(0xAB)));
    }

    #[test]
    fn scenario_b_longest_prefix_wins() {
        let entries = [
            FibEntry::new(xid_of(0x80), 1, 10).unwrap(),
            FibEntry::new(xid_of(0xC0), 2, 20).unwrap(),
        ];
        let trie = LcTrie::build(&entries).unwrap();
        assert_eq!(20, trie.lookup(&xid_of(0b1110_0000)));
        assert_eq!(10, trie.lookup(&xid_of(0b1010_0000)));
        assert_eq!(0, trie.lookup(&xid_of(0b0100_0000)));
    }

    #[test]
    fn scenario_c_prefix_chain_through_base_entry() {
        let short = FibEntry::new(xid_of(0x20), 20, 1).unwrap();
        let mut p_bytes = [0u8; 20];
        p_bytes[0] = 0x20;
        p_bytes[3] = 0xFF;
        let long = FibEntry::new(Xid(p_bytes), 40, 2).unwrap();

        let trie = LcTrie::build(&[short, long]).unwrap();
        assert_eq!(2, trie.lookup(&Xid(p_bytes)));
        assert_eq!(1, trie.lookup(&xid_of(0x20)));
    }

    #[test]
    fn faithful_to_patricia_on_synthetic_fibs() {
        // Property 6: for every key, lookup_lctrie == lookup_patricia.
        for k in 4..=12u32 {
            let entries = generate(k, &GeneratorConfig::default());
            let patricia = PatriciaTrie::build(&entries).unwrap();
            let lc = LcTrie::build(&entries).unwrap();

            for e in &entries {
                assert_eq!(
                    patricia.lookup(&e.prefix),
                    lc.lookup(&e.prefix),
                    "mismatch at k={k} prefix={:?}",
                    e.prefix
                );
            }
        }
    }

    #[test]
    fn faithful_to_patricia_on_probe_keys() {
        let entries = generate(10, &GeneratorConfig::default());
        let patricia = PatriciaTrie::build(&entries).unwrap();
        let lc = LcTrie::build(&entries).unwrap();

        let mut bytes = [0u8; 20];
        for seed in 0..500u32 {
            bytes[0] = seed as u8;
            bytes[1] = (seed >> 8) as u8;
            bytes[2] = (seed >> 16) as u8;
            let key = Xid(bytes);
            assert_eq!(patricia.lookup(&key), lc.lookup(&key));
        }
    }

    #[test]
    fn word_packing_roundtrips() {
        let word = pack(6, 200, 0xABCD_EF01);
        assert_eq!(6, word_branch(word));
        assert_eq!(200, word_skip(word));
        assert_eq!(0xABCD_EF01, word_child(word));
    }
}
