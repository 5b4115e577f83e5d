//! VP-tree: a metric tree splitting each range around a vantage point.
//!
//! Every internal node holds a vantage key and a threshold radius. The
//! "near" child owns the closed ball (distance to the vantage `<=`
//! threshold), the "far" child owns everything outside it. The threshold is
//! picked from a distance histogram so the two sides come out near the
//! median. A range query compares `d = distance(vantage, ref)` against the
//! threshold and the radius: the near side is visited only when the query
//! ball can overlap the closed ball (`d <= maxd + threshold`), the far side
//! only when the ball can reach outside it (`d + maxd > threshold`); both
//! sides may be visited in one step.

use crate::accumulator::ResultAccumulator;
use crate::data::{distance, Distance, Key, MAX_DISTANCE};
use crate::error::Error;
use crate::node::{BuildStats, LeafNode};
use std::collections::VecDeque;
use std::mem;

#[derive(Debug, Clone, PartialEq)]
pub enum VpNode {
    Leaf(LeafNode),
    Internal {
        vantage: Key,
        /// How many input keys in this subtree's range equal the vantage.
        /// Queries emit the vantage once per counted key, so duplicate
        /// inputs survive indexing.
        vantage_count: usize,
        /// Closed-ball radius: the near child holds distances
        /// `1..=threshold`, the far child `threshold+1..=MAX_DISTANCE`.
        threshold: Distance,
        near: Option<Box<VpNode>>,
        far: Option<Box<VpNode>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VpTree {
    pub root: VpNode,
    pub max_leaf_size: usize,
}

impl VpTree {
    /// Builds the tree from `keys`, in input order.
    ///
    /// The first key of each range becomes that range's vantage; no
    /// rebalancing is attempted, so the shape depends on input order and
    /// persistently lopsided splits (near-duplicate key sets) can drive the
    /// recursion depth toward the key count.
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

        let mut to_visit: VecDeque<&VpNode> = VecDeque::new();
        to_visit.push_back(&self.root);

        while let Some(node) = to_visit.pop_front() {
            match node {
                VpNode::Leaf(leaf) => {
                    examined += leaf.scan(ref_key, maxd, out)?;
                }
                VpNode::Internal { vantage, vantage_count, threshold, near, far } => {
                    examined += 1;

                    let d = distance(*vantage, ref_key);

                    if d <= maxd {
                        for _ in 0..*vantage_count {
                            out.append(*vantage)?;
                        }
                    }

                    // A branch is skipped only when its bound strictly
                    // fails; both can pass in the same step.
                    if d <= maxd + *threshold {
                        if let Some(child) = near {
                            to_visit.push_back(child);
                        }
                    }
                    if d + maxd > *threshold {
                        if let Some(child) = far {
                            to_visit.push_back(child);
                        }
                    }
                }
            }
        }

        return Ok(examined);
    }

    /// The key count held by every leaf, for shape inspection.
    pub fn leaf_lengths(&self) -> Vec<usize> {
        let mut lengths: Vec<usize> = Vec::new();

        let mut to_visit: VecDeque<&VpNode> = VecDeque::new();
        to_visit.push_back(&self.root);

        while let Some(node) = to_visit.pop_front() {
            match node {
                VpNode::Leaf(leaf) => lengths.push(leaf.len()),
                VpNode::Internal { near, far, .. } => {
                    if let Some(child) = near {
                        to_visit.push_back(child);
                    }
                    if let Some(child) = far {
                        to_visit.push_back(child);
                    }
                }
            }
        }

        return lengths;
    }
}

fn build_node(keys: &[Key], max_leaf_size: usize, stats: &mut BuildStats) -> Result<VpNode, Error> {
    debug_assert!(!keys.is_empty());

    if keys.len() <= max_leaf_size || keys.len() == 1 {
        let leaf = LeafNode::from_range(keys)?;
        stats.record_node(mem::size_of::<VpNode>() + leaf.key_bytes());
        return Ok(VpNode::Leaf(leaf));
    }

    let vantage = keys[0];
    let rest = &keys[1..];

    // Cumulative histogram of distances to the vantage.
    let mut dcnt = [0usize; MAX_DISTANCE as usize + 1];
    for &key in rest {
        dcnt[distance(vantage, key) as usize] += 1;
    }

    let mut cumulative = [0usize; MAX_DISTANCE as usize + 1];
    let mut total: usize = 0;
    for (slot, &count) in cumulative.iter_mut().zip(dcnt.iter()) {
        total += count;
        *slot = total;
    }
    debug_assert_eq!(total, rest.len());

    // Threshold selection: the smallest distance whose cumulative count
    // strictly exceeds the balance target. Keys equal to the vantage are
    // carried on the node, but still count toward the target so the
    // remaining split stays centered. When stepping the threshold down by
    // one leaves the split no further from the target, prefer the smaller
    // threshold. If every remaining key equals the vantage no distance
    // exceeds the target; the scan then falls through near the top of the
    // range and both children come out empty.
    let median = cumulative[0] + (rest.len() - cumulative[0]) / 2;

    let mut threshold = MAX_DISTANCE as usize;
    for k in 1..=MAX_DISTANCE as usize {
        if cumulative[k] > median {
            threshold = k;
            break;
        }
    }
    if threshold != 1 && median - cumulative[threshold - 1] <= cumulative[threshold] - median {
        threshold -= 1;
    }

    let vantage_count = 1 + cumulative[0];
    let near_count = cumulative[threshold] - cumulative[0];
    let far_count = rest.len() - cumulative[threshold];

    let mut near_keys: Vec<Key> = Vec::new();
    near_keys.try_reserve_exact(near_count)?;
    let mut far_keys: Vec<Key> = Vec::new();
    far_keys.try_reserve_exact(far_count)?;

    for &key in rest {
        if key == vantage {
            continue; // carried in vantage_count
        }
        if distance(vantage, key) as usize <= threshold {
            near_keys.push(key);
        } else {
            far_keys.push(key);
        }
    }
    debug_assert_eq!(near_keys.len(), near_count);
    debug_assert_eq!(far_keys.len(), far_count);

    let near = match near_keys.is_empty() {
        true => None,
        false => Some(Box::new(build_node(&near_keys, max_leaf_size, stats)?)),
    };
    let far = match far_keys.is_empty() {
        true => None,
        false => Some(Box::new(build_node(&far_keys, max_leaf_size, stats)?)),
    };

    stats.record_node(mem::size_of::<VpNode>());

    return Ok(VpNode::Internal {
        vantage,
        vantage_count,
        threshold: threshold as Distance,
        near,
        far,
    });
}
