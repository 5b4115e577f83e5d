//! Key representation, the Hamming metric, and key formatting helpers.

use rand::Rng;

/// An indexed key: a fixed-width 32-bit vector. Keys are opaque to the trees
/// except through [`distance`]; duplicates are permitted and never merged.
pub type Key = u32;

/// A distance between two keys, always in `[0, MAX_DISTANCE]`.
pub type Distance = u32;

/// The key width in bits, and therefore the largest possible distance.
pub const MAX_DISTANCE: Distance = 32;

/// Base-2 Hamming distance: the number of differing bits between two keys.
///
/// Zero exactly when the keys are equal, symmetric, and satisfies the
/// triangle inequality, which is what the tree pruning relies on.
#[inline]
pub fn distance(x: Key, y: Key) -> Distance {
    return (x ^ y).count_ones();
}

/// A single uniformly random key.
pub fn random_key<R: Rng>(rng: &mut R) -> Key {
    return rng.gen();
}

/// `n` uniformly random keys.
pub fn random_keys<R: Rng>(rng: &mut R, n: usize) -> Vec<Key> {
    return (0..n).map(|_| rng.gen()).collect();
}

/// Renders a key as a 32-character bit string, most significant bit first.
pub fn key_bits(key: Key) -> String {
    return format!("{:032b}", key);
}

/// Renders a key against a reference key: positions where the two agree are
/// masked to `.`, so only the differing bits show. Used by the benchmark
/// harness to print hits relative to the query key.
pub fn key_bits_masked(key: Key, ref_key: Key) -> String {
    let diff = key ^ ref_key;

    let mut s = String::with_capacity(MAX_DISTANCE as usize);
    for i in (0..MAX_DISTANCE).rev() {
        match (diff >> i) & 1 {
            0 => s.push('.'),
            _ => match (key >> i) & 1 {
                0 => s.push('0'),
                _ => s.push('1'),
            },
        }
    }

    return s;
}
