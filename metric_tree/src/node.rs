//! Shared leaf representation and build statistics.
//!
//! Both tree kinds linearize small ranges into the same leaf struct and
//! account for their size the same way, so that lives here.

use crate::accumulator::ResultAccumulator;
use crate::data::{distance, Distance, Key};
use crate::error::Error;
use std::mem;

/// A linearized subtree: a range that shrank to `max_leaf_size` keys or
/// fewer is stored flat and queried by scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub keys: Vec<Key>,
}

impl LeafNode {
    /// Copies the range into an owned leaf.
    pub fn from_range(keys: &[Key]) -> Result<Self, Error> {
        let mut copy: Vec<Key> = Vec::new();
        copy.try_reserve_exact(keys.len())?;
        copy.extend_from_slice(keys);

        return Ok(Self { keys: copy });
    }

    /// Scans every held key, appending those within `maxd` of `ref_key`.
    ///
    /// Returns the number of keys examined, which is always the leaf length.
    pub fn scan(
        &self,
        ref_key: Key,
        maxd: Distance,
        out: &mut ResultAccumulator,
    ) -> Result<usize, Error> {
        for &key in &self.keys {
            if distance(ref_key, key) <= maxd {
                out.append(key)?;
            }
        }

        return Ok(self.keys.len());
    }

    pub fn len(&self) -> usize {
        return self.keys.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.keys.is_empty();
    }

    /// Bytes held by the key array itself, for the build size estimate.
    pub fn key_bytes(&self) -> usize {
        return self.keys.len() * mem::size_of::<Key>();
    }
}

/// Construction statistics, threaded through the recursive builds and
/// returned with the finished tree rather than kept in process globals.
///
/// `tree_size` is an estimate in bytes: one node struct per node plus the
/// key arrays owned by leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub node_count: usize,
    pub tree_size: usize,
}

impl BuildStats {
    pub fn record_node(&mut self, bytes: usize) {
        self.node_count += 1;
        self.tree_size += bytes;
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn scan_filters_by_distance() {
        let leaf = LeafNode::from_range(&[0b0000, 0b0001, 0b0011, 0b0111]).unwrap();
        let mut acc = ResultAccumulator::new();

        let examined = leaf.scan(0, 1, &mut acc).unwrap();

        assert_eq!(examined, 4);
        assert_eq!(acc.as_slice(), &[0b0000, 0b0001]);
    }

    #[test]
    fn scan_examines_every_key_even_without_matches() {
        let leaf = LeafNode::from_range(&[u32::MAX; 5]).unwrap();
        let mut acc = ResultAccumulator::new();

        let examined = leaf.scan(0, 3, &mut acc).unwrap();

        assert_eq!(examined, 5);
        assert!(acc.is_empty());
    }

    #[test]
    fn stats_accumulate() {
        let mut stats = BuildStats::default();

        stats.record_node(100);
        stats.record_node(24);

        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.tree_size, 124);
    }
}
