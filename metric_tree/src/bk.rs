//! BK-tree: a metric tree whose internal nodes bucket their keys by exact
//! distance to a chosen center.
//!
//! Every internal node holds one center key and one child subtree per
//! populated distance bucket, kept in strictly increasing bucket order.
//! A range query at radius `maxd` measures `d = distance(center, ref)` and,
//! by the triangle inequality, only needs the buckets whose distance `c`
//! satisfies `d - maxd <= c <= d + maxd`; because the child list is ordered
//! it can skip the low buckets and stop at the first bucket past the window.

use crate::accumulator::ResultAccumulator;
use crate::data::{distance, Distance, Key, MAX_DISTANCE};
use crate::error::Error;
use crate::node::{BuildStats, LeafNode};
use std::collections::VecDeque;
use std::mem;

#[derive(Debug, Clone, PartialEq)]
pub enum BkNode {
    Leaf(LeafNode),
    Internal {
        center: Key,
        /// How many input keys in this subtree's range equal the center.
        /// Queries emit the center once per counted key, so duplicate
        /// inputs survive indexing.
        center_count: usize,
        /// Child subtrees as (bucket distance, subtree), bucket distances
        /// strictly increasing and in `[1, MAX_DISTANCE]`.
        children: Vec<(Distance, BkNode)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BkTree {
    pub root: BkNode,
    pub max_leaf_size: usize,
}

impl BkTree {
    /// Builds the tree from `keys`, in input order.
    ///
    /// The first key of each range becomes that range's center; no
    /// rebalancing is attempted, so the shape depends on input order and a
    /// pathological ordering degrades balance. Construction is recursive
    /// with depth bounded by the key count in the worst case (each level
    /// removes at least the center from the range).
    pub fn build(keys: &[Key], max_leaf_size: usize) -> Result<(Self, BuildStats), Error> {
        if keys.is_empty() {
            return Err(Error::EmptyKeySet);
        }

        let mut stats = BuildStats::default();
        let root = build_node(keys, max_leaf_size, &mut stats)?;

        return Ok((Self { root, max_leaf_size }, stats));
    }

    /// Appends every indexed key within `maxd` of `ref_key` to `out`.
    ///
    /// Returns the number of keys and internal nodes examined. Traversal
    /// uses an explicit work list, so query depth cannot overflow the call
    /// stack however unbalanced the tree is.
    pub fn query(
        &self,
        ref_key: Key,
        maxd: Distance,
        out: &mut ResultAccumulator,
    ) -> Result<usize, Error> {
        if maxd > MAX_DISTANCE {
            return Err(Error::DistanceOutOfRange { maxd });
        }

        let mut examined: usize = 0;

        let mut to_visit: VecDeque<&BkNode> = VecDeque::new();
        to_visit.push_back(&self.root);

        while let Some(node) = to_visit.pop_front() {
            match node {
                BkNode::Leaf(leaf) => {
                    examined += leaf.scan(ref_key, maxd, out)?;
                }
                BkNode::Internal { center, center_count, children } => {
                    examined += 1;

                    let d = distance(*center, ref_key);

                    if d <= maxd {
                        for _ in 0..*center_count {
                            out.append(*center)?;
                        }
                    }

                    // A key in the bucket at distance c from the center is
                    // at distance >= |d - c| from the reference, so buckets
                    // with c + maxd < d hold no match, and neither do those
                    // with c > d + maxd. Buckets are ordered: skip from the
                    // front, stop at the first one past the window.
                    for (c, child) in children {
                        if *c + maxd < d {
                            continue;
                        }
                        if *c > maxd + d {
                            break;
                        }
                        to_visit.push_back(child);
                    }
                }
            }
        }

        return Ok(examined);
    }

    /// The key count held by every leaf, for shape inspection.
    pub fn leaf_lengths(&self) -> Vec<usize> {
        let mut lengths: Vec<usize> = Vec::new();

        let mut to_visit: VecDeque<&BkNode> = VecDeque::new();
        to_visit.push_back(&self.root);

        while let Some(node) = to_visit.pop_front() {
            match node {
                BkNode::Leaf(leaf) => lengths.push(leaf.len()),
                BkNode::Internal { children, .. } => {
                    for (_, child) in children {
                        to_visit.push_back(child);
                    }
                }
            }
        }

        return lengths;
    }
}

fn build_node(keys: &[Key], max_leaf_size: usize, stats: &mut BuildStats) -> Result<BkNode, Error> {
    debug_assert!(!keys.is_empty());

    if keys.len() <= max_leaf_size || keys.len() == 1 {
        let leaf = LeafNode::from_range(keys)?;
        stats.record_node(mem::size_of::<BkNode>() + leaf.key_bytes());
        return Ok(BkNode::Leaf(leaf));
    }

    let center = keys[0];
    let rest = &keys[1..];

    // Counting sort of the remaining keys by distance to the center.
    let mut dcnt = [0usize; MAX_DISTANCE as usize + 1];
    for &key in rest {
        dcnt[distance(center, key) as usize] += 1;
    }

    let mut cumulative = [0usize; MAX_DISTANCE as usize + 1];
    let mut total: usize = 0;
    for (slot, &count) in cumulative.iter_mut().zip(dcnt.iter()) {
        total += count;
        *slot = total;
    }
    debug_assert_eq!(total, rest.len());

    // Bucket 0 is every key equal to the center; those are carried on the
    // node itself rather than recursed into (a bucket of identical keys
    // can never split).
    let center_count = 1 + dcnt[0];

    let mut sorted: Vec<Key> = Vec::new();
    sorted.try_reserve_exact(rest.len())?;
    sorted.resize(rest.len(), 0);

    let mut pos = [0usize; MAX_DISTANCE as usize + 1];
    pos[1..].copy_from_slice(&cumulative[..MAX_DISTANCE as usize]);

    for &key in rest {
        let d = distance(center, key) as usize;
        sorted[pos[d]] = key;
        pos[d] += 1;
    }

    let mut children: Vec<(Distance, BkNode)> = Vec::new();
    for bucket in 1..=MAX_DISTANCE as usize {
        let off = cumulative[bucket - 1];
        let len = cumulative[bucket] - off;
        if len == 0 {
            continue;
        }

        let child = build_node(&sorted[off..off + len], max_leaf_size, stats)?;
        children.push((bucket as Distance, child));
    }

    stats.record_node(mem::size_of::<BkNode>());

    return Ok(BkNode::Internal { center, center_count, children });
}
