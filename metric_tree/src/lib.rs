//! Implementation of in-memory metric trees for exact Hamming range search.
//!
//! A fixed population of 32-bit keys is indexed once and then queried many
//! times for "every key within distance r of this key", where the distance is
//! the base-2 Hamming distance. Two tree structures are provided, a BK-tree
//! and a VP-tree, along with a brute-force linear index used as the
//! correctness oracle and performance baseline. Both trees stop splitting
//! once a range fits in a configurable leaf size and fall back to a linear
//! scan inside leaves, so leaf size trades node overhead against scan cost.
//!
//! Trees are build-once: nothing mutates a built tree and queries can run
//! from as many independent callers as desired, each with its own
//! [`accumulator::ResultAccumulator`].
//!
//! TODO
//! - [x] prototype BK and VP construction and querying with tests
//! - [ ] make the key width generic over wider bit-vectors
//! - [ ] smarter pivot selection than "first key of the range"
//!
pub mod accumulator;
pub mod bk;
pub mod data;
pub mod error;
pub mod linear;
pub mod node;
pub mod tree;
pub mod vp;
