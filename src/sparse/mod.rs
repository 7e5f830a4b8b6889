//! Sorted sparse-array maps.
//!
//! A [`SparseMap`] stores its entries as two positionally aligned arenas, one
//! of strictly ascending keys and one of value slots, and finds entries by
//! binary search. Deleting an entry only overwrites its slot with the value
//! type's tombstone, so deletes never shift the columns; tombstones are
//! reclaimed when a [`SparseMapBuilder`] builds the map.
//!
//! Inserting through [`SparseMap::add`] keeps the columns sorted at the cost
//! of an O(n) shift per new key. For bulk loads, append through a
//! [`SparseMapBuilder`] and sort once.
//!
//! ```rust
//! use offheap_sparse::{Config, SparseMapBuilder};
//!
//! let mut builder: SparseMapBuilder<u64, u16> =
//!     SparseMapBuilder::with_config(Config::default().with_preallocate(16));
//! builder.add(100, 1);
//! builder.add(7, 2);
//! builder.delete(100);
//!
//! let map = builder.build();
//! assert_eq!(map.get(7), Some(&2));
//! assert_eq!(map.get(100), None);
//! ```

mod builder;
mod value;

pub use builder::SparseMapBuilder;
pub use value::{Key, Value};

use std::fmt;
use std::hash::Hash;
use std::mem;

use ahash::AHashSet;

use crate::arena::Arena;
use crate::order::{self, Columns};
use crate::Config;

/// Key column and value-slot column, always of equal length.
struct Entries<K, S> {
    keys: Arena<K>,
    slots: Arena<S>,
}

impl<K, S> Entries<K, S> {
    fn allocate(capacity: usize) -> Self {
        Self {
            keys: Arena::allocate(capacity),
            slots: Arena::allocate(capacity),
        }
    }
}

impl<K, S> Columns for Entries<K, S> {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn capacity(&self) -> usize {
        self.keys.capacity()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.keys.swap(a, b);
        self.slots.swap(a, b);
    }

    fn truncate(&mut self, len: usize) {
        self.keys.truncate(len);
        self.slots.truncate(len);
    }

    fn reallocate(&mut self, capacity: usize) {
        self.keys = mem::take(&mut self.keys).grow(capacity);
        self.slots = mem::take(&mut self.slots).grow(capacity);
    }
}

/// An ordered map from unsigned integer keys to values, backed by two
/// off-heap arenas.
///
/// Lookups return `None` both for keys that were never added and for keys
/// whose slot holds the tombstone.
///
/// Dropping the map releases its arenas; [`SparseMap::dispose`] does the same
/// explicitly.
pub struct SparseMap<K: Key, V: Value> {
    entries: Entries<K, V::Slot>,
    grow_factor: f64,
}

impl<K: Key, V: Value> SparseMap<K, V> {
    /// Create a map with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            entries: Entries::allocate(config.preallocate()),
            grow_factor: config.grow_factor(),
        }
    }

    /// Number of stored slots, including tombstones not yet reclaimed.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Index of `key`, or the position it would be inserted at.
    #[inline]
    fn search(&self, key: K) -> Result<usize, usize> {
        let keys = self.entries.keys.as_slice();
        let idx = keys.partition_point(|&k| k < key);
        if idx < keys.len() && keys[idx] == key {
            Ok(idx)
        } else {
            Err(idx)
        }
    }

    pub fn get(&self, key: K) -> Option<&V> {
        let idx = self.search(key).ok()?;
        V::view(&self.entries.slots[idx])
    }

    pub fn contains_key(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Associate `value` with `key`, keeping the keys sorted.
    ///
    /// An existing slot is overwritten in place and its previous live value
    /// returned. A new key is inserted at its sorted position, growing the
    /// arenas first if they are full.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        match self.search(key) {
            Ok(idx) => V::take(self.entries.slots.set(idx, value.occupy())),
            Err(idx) => {
                order::reserve_one(&mut self.entries, self.grow_factor);
                self.entries.keys.insert(idx, key);
                self.entries.slots.insert(idx, value.occupy());
                None
            }
        }
    }

    /// Replace the value for `key` with a tombstone, returning the previous
    /// live value. The key keeps its slot until the map is rebuilt.
    pub fn delete(&mut self, key: K) -> Option<V> {
        let idx = self.search(key).ok()?;
        V::take(self.entries.slots.set(idx, V::VACANT))
    }

    /// Live entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.entries
            .keys
            .iter()
            .zip(self.entries.slots.iter())
            .filter_map(|(&key, slot)| V::view(slot).map(|value| (key, value)))
    }

    /// Call `f` once for every distinct live value, in unspecified order.
    pub fn distinct_values<F>(&self, mut f: F)
    where
        V: Hash + Eq,
        F: FnMut(&V),
    {
        let mut seen = AHashSet::new();
        for value in self.entries.slots.iter().filter_map(V::view) {
            if seen.insert(value) {
                f(value);
            }
        }
    }

    /// Reopen the map for bulk appends and deletes.
    pub fn into_builder(self) -> SparseMapBuilder<K, V> {
        SparseMapBuilder::from_map(self)
    }

    /// Release both arenas.
    pub fn dispose(self) {
        drop(self);
    }

    fn has_tombstones(&self) -> bool {
        self.entries.slots.iter().any(|slot| V::view(slot).is_none())
    }

    /// Append without ordering; the caller owns re-sorting. Returns whether
    /// the stored slot is live, which it is not when `value` is the
    /// tombstone.
    fn push_unsorted(&mut self, key: K, value: V) -> bool {
        order::reserve_one(&mut self.entries, self.grow_factor);
        let slot = value.occupy();
        let live = V::view(&slot).is_some();
        self.entries.keys.push(key);
        self.entries.slots.push(slot);
        live
    }

    /// Physically drop tombstoned rows, returning how many went.
    fn remove_tombstones(&mut self) -> usize {
        order::retain(&mut self.entries, |entries, row| {
            V::view(&entries.slots[row]).is_some()
        })
    }

    /// Sort by key and collapse duplicate keys to their last write.
    fn sort(&mut self) -> usize {
        order::sort_by_key(&mut self.entries, |entries, row| entries.keys[row]);
        order::fold_duplicates(&mut self.entries, |entries, row| entries.keys[row])
    }

    fn shrink(&mut self) {
        order::shrink(&mut self.entries);
    }
}

impl<K: Key, V: Value> Default for SparseMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> FromIterator<(K, V)> for SparseMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let config = Config::default().with_preallocate(iter.size_hint().0);
        let mut builder = SparseMapBuilder::with_config(config);
        builder.extend(iter);
        builder.build()
    }
}

impl<K: Key, V: Value + fmt::Debug> fmt::Debug for SparseMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
