// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Path-compressed radix trie (Patricia) with a sibling prefix chain.
//!
//! The arena is a flat `Vec<Node>` addressed by `u32` indices rather than
//! heap-allocated `left`/`right` pointers: the build is
//! strictly post-order (every child is pushed before its parent), so a
//! node's own arena index is always greater than both of its children's —
//! a property the LC-trie compressor (`crate::lctrie`) leans on directly.

use crate::binary_search::partition_point;
use crate::error::Result;
use crate::fib::{validate_and_sort, FibEntry, NexthopTable};
use crate::xid::Xid;

/// One base-vector entry: a FIB prefix that is not a proper prefix of any
/// other FIB prefix, reached directly by a Patricia leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BaseEntry {
    pub str: Xid,
    pub len: u32,
    /// Head of the chain through `pre`, longest match first.
    pub pre: Option<u32>,
    pub nexthop_idx: u32,
}

/// One prefix-vector entry: a FIB prefix that is a proper prefix of some
/// other FIB prefix. Carries no string of its own — every comparison along
/// a `pre` chain truncates the *leaf's* base string to this entry's `len`
/// a separate string is never stored for prefix-vector entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PrefixEntry {
    pub len: u32,
    pub pre: Option<u32>,
    pub nexthop_idx: u32,
}

/// An arena node. Leaves and internal nodes both carry `skip`: summed
/// `(1 + skip)` over a root-to-leaf path plus the leaf's own consumed
/// length equals `base[leaf.base].len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Node {
    Leaf { skip: u32, base: u32 },
    Internal { skip: u32, left: u32, right: u32 },
}

/// A built Patricia trie: the arena, the base/prefix vectors, and the
/// deduplicated nexthop table every lookup resolves against.
#[derive(Debug)]
pub struct PatriciaTrie {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: Option<u32>,
    pub(crate) base: Vec<BaseEntry>,
    pub(crate) pre: Vec<PrefixEntry>,
    pub(crate) nexthops: NexthopTable,
}

/// Confirms a candidate leaf against the query key, walking the `pre`
/// chain on mismatch. Shared with the LC-trie, whose descent bottoms out
/// at the same base vector.
pub(crate) fn confirm(
    base: &[BaseEntry],
    pre: &[PrefixEntry],
    nexthops: &NexthopTable,
    base_idx: u32,
    key: &Xid,
) -> u32 {
    let b = &base[base_idx as usize];
    if key.matches_prefix(&b.str, b.len) {
        return nexthops.get(b.nexthop_idx);
    }

    let mut cursor = b.pre;
    while let Some(idx) = cursor {
        let p = &pre[idx as usize];
        if key.matches_prefix(&b.str, p.len) {
            return nexthops.get(p.nexthop_idx);
        }
        cursor = p.pre;
    }

    0
}

/// Scans from bit `prefix` upward and returns the first bit position at
/// which `base[first]` and `base[first + n - 1]` differ.
/// Base is sorted lexicographically, so the longest common prefix of the
/// whole range equals that of its two endpoints.
fn skip_compute(base: &[BaseEntry], prefix: u32, first: usize, n: usize) -> u32 {
    let low = &base[first].str;
    let high = &base[first + n - 1].str;
    let mut i = prefix;
    while i < crate::xid::BITS && low.bit(i) == high.bit(i) {
        i += 1;
    }
    i
}

/// Builds the Patricia arena recursively over `base[first..first+n)`,
/// having already consumed `prefix` bits. Returns the arena index of the
/// subtree's root. Children are always pushed before their parent.
fn build_subtrie(base: &[BaseEntry], prefix: u32, first: usize, n: usize, nodes: &mut Vec<Node>) -> u32 {
    if n == 1 {
        nodes.push(Node::Leaf {
            skip: base[first].len - prefix,
            base: first as u32,
        });
        return (nodes.len() - 1) as u32;
    }

    let new_prefix = skip_compute(base, prefix, first, n);
    let nleft = partition_point(&base[first..first + n], |e| !e.str.bit(new_prefix));

    let left = build_subtrie(base, new_prefix + 1, first, nleft, nodes);
    let right = build_subtrie(base, new_prefix + 1, first + nleft, n - nleft, nodes);

    nodes.push(Node::Internal {
        skip: new_prefix - prefix,
        left,
        right,
    });
    (nodes.len() - 1) as u32
}

/// Partitions sorted entries into base/prefix vectors and links each
/// base's `pre` chain to its ancestors.
///
/// Entries are visited left to right while maintaining a stack of
/// currently "open" prefix-vector entries — those not yet known to be a
/// proper prefix of everything that follows. An entry's nearest matching
/// ancestor is always the stack top once entries that no longer match
/// have been popped; since the FIB is lexicographically sorted, a prefix
/// entry can only ever be the immediate ancestor of entries that follow it
/// contiguously, so a single stack pass suffices (no separate tree search
/// like the source's `in_prefix_tree` is needed).
fn partition(
    sorted: &[FibEntry],
    nexthop_idx: &[u32],
) -> (Vec<BaseEntry>, Vec<PrefixEntry>) {
    struct StackItem {
        pre_idx: u32,
        orig_idx: usize,
    }

    let mut base = Vec::new();
    let mut pre = Vec::new();
    let mut stack: Vec<StackItem> = Vec::new();

    for i in 0..sorted.len() {
        let e = &sorted[i];

        while let Some(top) = stack.last() {
            let ancestor = &sorted[top.orig_idx];
            if ancestor.len <= e.len && ancestor.prefix.matches_prefix(&e.prefix, ancestor.len) {
                break;
            }
            stack.pop();
        }

        let my_pre = stack.last().map(|t| t.pre_idx);

        let is_prefix_entry = i + 1 < sorted.len()
            && e.len <= sorted[i + 1].len
            && e.prefix.matches_prefix(&sorted[i + 1].prefix, e.len);

        if is_prefix_entry {
            let pre_idx = pre.len() as u32;
            pre.push(PrefixEntry {
                len: e.len,
                pre: my_pre,
                nexthop_idx: nexthop_idx[i],
            });
            stack.push(StackItem {
                pre_idx,
                orig_idx: i,
            });
        } else {
            base.push(BaseEntry {
                str: e.prefix,
                len: e.len,
                pre: my_pre,
                nexthop_idx: nexthop_idx[i],
            });
        }
    }

    (base, pre)
}

impl PatriciaTrie {
    /// Builds a Patricia trie from an arbitrary-order FIB snapshot.
    ///
    /// Fails with `Error::DuplicateEntry`/`InvalidLength`/`NonCanonicalPrefix`
    /// if `entries` doesn't satisfy the FIB invariants; never fails
    /// afterward — lookup is infallible.
    pub fn build(entries: &[FibEntry]) -> Result<Self> {
        let sorted = validate_and_sort(entries)?;
        let (nexthops, nexthop_idx) = NexthopTable::build(&sorted);
        let (base, pre) = partition(&sorted, &nexthop_idx);

        let mut nodes = Vec::new();
        let root = if base.is_empty() {
            None
        } else {
            Some(build_subtrie(&base, 0, 0, base.len(), &mut nodes))
        };

        log::debug!(
            "patricia: {} entries -> {} base, {} prefix, {} arena nodes",
            entries.len(),
            base.len(),
            pre.len(),
            nodes.len(),
        );

        Ok(Self {
            nodes,
            root,
            base,
            pre,
            nexthops,
        })
    }

    /// Longest-prefix-match lookup. Returns `0` if no FIB entry matches.
    #[must_use]
    pub fn lookup(&self, key: &Xid) -> u32 {
        let Some(root) = self.root else {
            return 0;
        };

        let mut idx = root;
        let mut pos = 0u32;

        loop {
            match self.nodes[idx as usize] {
                Node::Leaf { base, .. } => {
                    return confirm(&self.base, &self.pre, &self.nexthops, base, key)
                }
                Node::Internal { skip, left, right } => {
                    pos += skip;
                    let bit = key.bit(pos);
                    pos += 1;
                    idx = if bit { right } else { left };
                }
            }
        }
    }

    /// Number of base-vector (leaf) entries.
    #[must_use]
    pub fn base_len(&self) -> usize {
        self.base.len()
    }

    /// Number of prefix-vector (chained, non-leaf) entries.
    #[must_use]
    pub fn prefix_len(&self) -> usize {
        self.pre.len()
    }
}
