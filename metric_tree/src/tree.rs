//! Tree kind selection, configuration, and the dispatching handle.
//!
//! The handle is the boundary the benchmark harness consumes: build once
//! from a key set, query many times, read the build statistics back as
//! plain values.

use crate::accumulator::ResultAccumulator;
use crate::bk::BkTree;
use crate::data::{Distance, Key};
use crate::error::Error;
use crate::linear::LinearIndex;
use crate::node::BuildStats;
use crate::vp::VpTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeKind {
    Bk,
    Vp,
    Linear,
}

impl TreeKind {
    /// Parses the selector names the CLI accepts, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bk" => Some(Self::Bk),
            "vp" => Some(Self::Vp),
            "linear" => Some(Self::Linear),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bk => "BK-tree",
            Self::Vp => "VP-tree",
            Self::Linear => "Linear search",
        }
    }
}

impl FromStr for TreeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return Self::from_name(s).ok_or_else(|| format!("unknown tree type: '{}'", s));
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    pub kind: TreeKind,
    pub max_leaf_size: usize,
}

impl TreeConfig {
    pub fn default() -> Self {
        return Self {
            kind: TreeKind::Vp,
            // Around a thousand keys per leaf keeps node overhead
            // reasonable; very small leaves explode memory use.
            max_leaf_size: 1000,
        };
    }

    pub fn from_file(filename: &str) -> Result<Self, Error> {
        let serialized = fs::read_to_string(filename)
            .map_err(|e| Error::Config(format!("{}: {}", filename, e)))?;

        let deserialized: Self = serde_yaml::from_str(&serialized)
            .map_err(|e| Error::Config(format!("{}: {}", filename, e)))?;

        return Ok(deserialized);
    }

    pub fn to_file(&self, filename: &str) -> Result<(), Error> {
        let serialized = serde_yaml::to_string(&self)
            .map_err(|e| Error::Config(format!("{}: {}", filename, e)))?;

        fs::write(filename, serialized)
            .map_err(|e| Error::Config(format!("{}: {}", filename, e)))?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TreeInner {
    Bk(BkTree),
    Vp(VpTree),
    Linear(LinearIndex),
}

/// A built, immutable index of one kind.
///
/// Queries never mutate the tree, so a built handle can be shared freely
/// across threads as long as each caller brings its own accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    inner: TreeInner,
    stats: BuildStats,
    pub config: TreeConfig,
}

impl Tree {
    /// Builds the configured kind of index over `keys`.
    pub fn build(config: TreeConfig, keys: &[Key]) -> Result<Self, Error> {
        let (inner, stats) = match config.kind {
            TreeKind::Bk => {
                let (tree, stats) = BkTree::build(keys, config.max_leaf_size)?;
                (TreeInner::Bk(tree), stats)
            }
            TreeKind::Vp => {
                let (tree, stats) = VpTree::build(keys, config.max_leaf_size)?;
                (TreeInner::Vp(tree), stats)
            }
            TreeKind::Linear => {
                let (index, stats) = LinearIndex::build(keys)?;
                (TreeInner::Linear(index), stats)
            }
        };

        return Ok(Self { inner, stats, config });
    }

    /// Appends every indexed key within `maxd` of `ref_key` to `out` and
    /// returns the number of keys/nodes examined.
    pub fn query(
        &self,
        ref_key: Key,
        maxd: Distance,
        out: &mut ResultAccumulator,
    ) -> Result<usize, Error> {
        match &self.inner {
            TreeInner::Bk(tree) => tree.query(ref_key, maxd, out),
            TreeInner::Vp(tree) => tree.query(ref_key, maxd, out),
            TreeInner::Linear(index) => index.query(ref_key, maxd, out),
        }
    }

    pub fn kind(&self) -> TreeKind {
        return self.config.kind;
    }

    pub fn node_count(&self) -> usize {
        return self.stats.node_count;
    }

    /// Estimated in-memory size of the built structure, in bytes.
    pub fn tree_size(&self) -> usize {
        return self.stats.tree_size;
    }

    /// The key count held by every leaf, for shape inspection.
    pub fn leaf_lengths(&self) -> Vec<usize> {
        match &self.inner {
            TreeInner::Bk(tree) => tree.leaf_lengths(),
            TreeInner::Vp(tree) => tree.leaf_lengths(),
            TreeInner::Linear(index) => index.leaf_lengths(),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::data::{random_keys, MAX_DISTANCE};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn kind_parses_the_cli_names() {
        assert_eq!(TreeKind::from_name("bk"), Some(TreeKind::Bk));
        assert_eq!(TreeKind::from_name("VP"), Some(TreeKind::Vp));
        assert_eq!(TreeKind::from_name("Linear"), Some(TreeKind::Linear));
        assert_eq!(TreeKind::from_name("ball"), None);

        assert_eq!("bk".parse::<TreeKind>().unwrap(), TreeKind::Bk);
        assert!("quad".parse::<TreeKind>().is_err());
    }

    #[test]
    fn config_yaml_round_trip() {
        let mut config = TreeConfig::default();
        config.kind = TreeKind::Bk;
        config.max_leaf_size = 37;

        let filename = "/tmp/metric_tree_config_test.yaml";
        config.to_file(filename).unwrap();

        let read_back = TreeConfig::from_file(filename).unwrap();
        assert_eq!(read_back, config);
    }

    #[test]
    fn missing_config_file_reports_the_path() {
        let result = TreeConfig::from_file("/tmp/does_not_exist_metric_tree.yaml");

        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("does_not_exist")),
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn build_rejects_empty_keys_for_every_kind() {
        for kind in [TreeKind::Bk, TreeKind::Vp, TreeKind::Linear] {
            let config = TreeConfig { kind, max_leaf_size: 8 };
            let result = Tree::build(config, &[]);
            assert_eq!(result.unwrap_err(), Error::EmptyKeySet);
        }
    }

    #[test]
    fn all_kinds_agree_on_fuzzed_queries() {
        let mut rng = StdRng::seed_from_u64(51);
        let keys = random_keys(&mut rng, 1500);

        let trees: Vec<Tree> = [TreeKind::Bk, TreeKind::Vp, TreeKind::Linear]
            .into_iter()
            .map(|kind| {
                Tree::build(TreeConfig { kind, max_leaf_size: 10 }, &keys).unwrap()
            })
            .collect();

        let mut accs: Vec<ResultAccumulator> =
            trees.iter().map(|_| ResultAccumulator::new()).collect();

        for _ in 0..50 {
            let ref_key: u32 = rng.gen();
            let maxd = rng.gen_range(0..=MAX_DISTANCE);

            for (tree, acc) in trees.iter().zip(accs.iter_mut()) {
                acc.clear();
                tree.query(ref_key, maxd, acc).unwrap();
            }

            let expected = accs[2].sorted();
            assert_eq!(accs[0].sorted(), expected);
            assert_eq!(accs[1].sorted(), expected);
        }
    }

    #[test]
    fn stats_are_exposed_on_the_handle() {
        let mut rng = StdRng::seed_from_u64(52);
        let keys = random_keys(&mut rng, 200);

        let config = TreeConfig { kind: TreeKind::Bk, max_leaf_size: 4 };
        let tree = Tree::build(config, &keys).unwrap();

        assert!(tree.node_count() > 1);
        assert!(tree.tree_size() >= keys.len() * std::mem::size_of::<u32>() / 2);

        let linear = Tree::build(
            TreeConfig { kind: TreeKind::Linear, max_leaf_size: 4 },
            &keys,
        )
        .unwrap();
        assert_eq!(linear.node_count(), 1);
    }

    #[test]
    fn tiny_leaf_size_forces_single_key_leaves() {
        let mut rng = StdRng::seed_from_u64(53);
        let keys = random_keys(&mut rng, 300);

        // Zero is legal and behaves like one: every range splits until a
        // single key remains.
        for max_leaf_size in [0, 1] {
            for kind in [TreeKind::Bk, TreeKind::Vp] {
                let tree = Tree::build(TreeConfig { kind, max_leaf_size }, &keys).unwrap();

                for len in tree.leaf_lengths() {
                    assert_eq!(len, 1);
                }
            }
        }
    }
}
