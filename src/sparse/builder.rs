use tracing::debug;

use super::{Key, SparseMap, Value};
use crate::Config;

/// Staging front-end for bulk-loading a [`SparseMap`].
///
/// [`add`](Self::add) appends in O(1) amortised time without keeping the keys
/// ordered; [`build`](Self::build) sorts once. When the same key is added more
/// than once, the last write wins.
pub struct SparseMapBuilder<K: Key, V: Value> {
    map: SparseMap<K, V>,
    /// Rows were appended since the last sort.
    needs_sort: bool,
    /// Tombstoned rows are waiting to be removed.
    needs_cleanup: bool,
}

impl<K: Key, V: Value> SparseMapBuilder<K, V> {
    /// Create a builder with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::from_map(SparseMap::with_config(config))
    }

    pub(super) fn from_map(map: SparseMap<K, V>) -> Self {
        let needs_cleanup = map.has_tombstones();
        Self {
            map,
            needs_sort: false,
            needs_cleanup,
        }
    }

    /// Rows staged so far, counting duplicates and tombstones.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Stage `key` with `value`. Staging the value type's tombstone removes
    /// `key` at build time, like [`delete`](Self::delete).
    pub fn add(&mut self, key: K, value: V) {
        self.needs_sort = true;
        if !self.map.push_unsorted(key, value) {
            self.needs_cleanup = true;
        }
    }

    /// Tombstone `key`, returning its live value.
    ///
    /// Deletion needs a binary search, so any pending appends are sorted
    /// first.
    pub fn delete(&mut self, key: K) -> Option<V> {
        if self.needs_sort {
            self.sort();
        }

        let prev = self.map.delete(key);
        if prev.is_some() {
            self.needs_cleanup = true;
        }
        prev
    }

    /// Remove tombstones, sort, and trim the arenas to the final size.
    pub fn build(mut self) -> SparseMap<K, V> {
        let staged = self.map.len();

        let mut tombstones = 0;
        let mut folded = 0;
        if self.needs_cleanup {
            // Fold pending duplicates first, so a tombstone staged last still
            // hides the earlier writes of its key.
            if self.needs_sort {
                folded += self.sort();
            }
            tombstones = self.map.remove_tombstones();
            self.needs_cleanup = false;
            self.needs_sort = true;
        }

        if self.needs_sort {
            folded += self.sort();
        }

        self.map.shrink();

        debug!(
            staged,
            tombstones,
            folded,
            len = self.map.len(),
            "built sparse map"
        );
        self.map
    }

    fn sort(&mut self) -> usize {
        self.needs_sort = false;
        self.map.sort()
    }
}

impl<K: Key, V: Value> Default for SparseMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> Extend<(K, V)> for SparseMapBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}
