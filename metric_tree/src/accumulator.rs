//! Reusable container for the keys matched by one range query.

use crate::data::Key;
use crate::error::Error;

/// Collects matching keys in traversal order.
///
/// The accumulator is meant to be reused: [`clear`](Self::clear) resets the
/// logical length without releasing the backing storage, so a query loop
/// stops allocating once the buffer has grown to its working size. Results
/// are not deduplicated and not sorted; callers wanting distance order must
/// sort explicitly.
///
/// Not thread-safe. Concurrent queries each need their own accumulator.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultAccumulator {
    keys: Vec<Key>,
}

impl ResultAccumulator {
    pub fn new() -> Self {
        return Self { keys: Vec::new() };
    }

    pub fn with_capacity(n: usize) -> Self {
        return Self { keys: Vec::with_capacity(n) };
    }

    /// Appends a matching key. Amortized O(1): capacity doubles when
    /// exhausted, and a failed growth surfaces as [`Error::OutOfMemory`]
    /// instead of aborting the process.
    pub fn append(&mut self, key: Key) -> Result<(), Error> {
        if self.keys.len() == self.keys.capacity() {
            let grow = match self.keys.capacity() {
                0 => 16,
                cap => cap,
            };
            self.keys.try_reserve(grow)?;
        }

        self.keys.push(key);
        Ok(())
    }

    /// Resets the logical length to zero, keeping the backing storage.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        return self.keys.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.keys.is_empty();
    }

    /// The collected keys, in append order.
    pub fn as_slice(&self) -> &[Key] {
        return &self.keys;
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        return self.keys.iter();
    }

    /// The collected keys sorted ascending, for order-insensitive
    /// comparison against another result set.
    pub fn sorted(&self) -> Vec<Key> {
        let mut v = self.keys.clone();
        v.sort_unstable();
        return v;
    }
}

impl<'a> IntoIterator for &'a ResultAccumulator {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        return self.keys.iter();
    }
}
