//! Brute-force baseline: every query scans the whole key set.
//!
//! Trivial on purpose. The tree implementations are validated against this
//! index, and its examined count (always n) is the denominator the coverage
//! statistic compares pruning against.

use crate::accumulator::ResultAccumulator;
use crate::data::{Distance, Key, MAX_DISTANCE};
use crate::error::Error;
use crate::node::{BuildStats, LeafNode};
use std::mem;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearIndex {
    leaf: LeafNode,
}

impl LinearIndex {
    /// Copies the key set. O(n) time and space.
    pub fn build(keys: &[Key]) -> Result<(Self, BuildStats), Error> {
        if keys.is_empty() {
            return Err(Error::EmptyKeySet);
        }

        let leaf = LeafNode::from_range(keys)?;

        let mut stats = BuildStats::default();
        stats.record_node(mem::size_of::<Self>() + leaf.key_bytes());

        return Ok((Self { leaf }, stats));
    }

    /// Scans every key, appending those within `maxd` of `ref_key`.
    ///
    /// Returns the number of keys examined, which is always the full count.
    pub fn query(
        &self,
        ref_key: Key,
        maxd: Distance,
        out: &mut ResultAccumulator,
    ) -> Result<usize, Error> {
        if maxd > MAX_DISTANCE {
            return Err(Error::DistanceOutOfRange { maxd });
        }

        return self.leaf.scan(ref_key, maxd, out);
    }

    pub fn len(&self) -> usize {
        return self.leaf.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.leaf.is_empty();
    }

    /// The index is one flat range; reported as a single leaf.
    pub fn leaf_lengths(&self) -> Vec<usize> {
        return vec![self.leaf.len()];
    }
}
