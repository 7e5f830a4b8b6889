//! Inclusive integer ranges mapped to values.
//!
//! A [`RangeStore`] keeps three positionally aligned arenas: range starts
//! (ascending after build), inclusive range ends, and values. Ranges are
//! expected to be disjoint; overlap is neither detected nor resolved.
//!
//! Stores are bulk-loaded through a [`RangeStoreBuilder`], which appends
//! unsorted and sorts by range start once in [`RangeStoreBuilder::build`].
//!
//! ```rust
//! use offheap_sparse::{Config, RangeStoreBuilder};
//!
//! let mut builder = RangeStoreBuilder::with_config(Config::default().with_preallocate(4));
//! builder.add(5u64, 6, "4");
//! builder.add(1, 2, "1");
//! builder.add(3, 4, "3");
//!
//! let store = builder.build();
//! assert_eq!(store.get(4), Some(&"3"));
//! assert_eq!(store.get(7), None);
//! ```

use std::hash::Hash;
use std::mem;
use std::ops::RangeInclusive;

use ahash::AHashSet;
use tracing::debug;

use crate::arena::Arena;
use crate::order::{self, Columns};
use crate::sparse::Key;
use crate::Config;

/// Range store with two 16-bit payload lanes per range, the densest layout
/// for stores that attach a pair of small codes to every range.
pub type DenseRangeStore = RangeStore<u64, (u16, u16)>;

/// Builder for a [`DenseRangeStore`].
pub type DenseRangeStoreBuilder = RangeStoreBuilder<u64, (u16, u16)>;

struct Intervals<K, V> {
    from: Arena<K>,
    end: Arena<K>,
    values: Arena<V>,
}

impl<K, V> Intervals<K, V> {
    fn allocate(capacity: usize) -> Self {
        Self {
            from: Arena::allocate(capacity),
            end: Arena::allocate(capacity),
            values: Arena::allocate(capacity),
        }
    }
}

impl<K, V> Columns for Intervals<K, V> {
    fn len(&self) -> usize {
        self.from.len()
    }

    fn capacity(&self) -> usize {
        self.from.capacity()
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.from.swap(a, b);
        self.end.swap(a, b);
        self.values.swap(a, b);
    }

    fn truncate(&mut self, len: usize) {
        self.from.truncate(len);
        self.end.truncate(len);
        self.values.truncate(len);
    }

    fn reallocate(&mut self, capacity: usize) {
        self.from = mem::take(&mut self.from).grow(capacity);
        self.end = mem::take(&mut self.end).grow(capacity);
        self.values = mem::take(&mut self.values).grow(capacity);
    }
}

/// Disjoint inclusive ranges `[from, to]` mapped to values, resolved by
/// binary search over the range starts.
pub struct RangeStore<K: Key, V> {
    intervals: Intervals<K, V>,
    grow_factor: f64,
}

impl<K: Key, V> RangeStore<K, V> {
    fn with_config(config: Config) -> Self {
        Self {
            intervals: Intervals::allocate(config.preallocate()),
            grow_factor: config.grow_factor(),
        }
    }

    /// Number of ranges.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.intervals.capacity()
    }

    /// Value of the range covering `point`.
    ///
    /// Finds the first range starting at or after `point`; if it does not
    /// cover `point`, the range just before it may still extend over it.
    pub fn get(&self, point: K) -> Option<&V> {
        let idx = self.intervals.from.partition_point(|&from| from < point);
        if idx < self.len() {
            if let Some(value) = self.covering(idx, point) {
                return Some(value);
            }
        }
        if idx > 0 {
            return self.covering(idx - 1, point);
        }
        None
    }

    #[inline]
    fn covering(&self, idx: usize, point: K) -> Option<&V> {
        let covers = self.intervals.from[idx] <= point && point <= self.intervals.end[idx];
        covers.then(|| &self.intervals.values[idx])
    }

    /// Ranges in ascending order of their start.
    pub fn iter(&self) -> impl Iterator<Item = (RangeInclusive<K>, &V)> + '_ {
        let Intervals { from, end, values } = &self.intervals;
        from.iter()
            .zip(end.iter())
            .zip(values.iter())
            .map(|((&start, &stop), value)| (start..=stop, value))
    }

    /// Call `f` once for every distinct value, in unspecified order.
    pub fn distinct_values<F>(&self, f: F)
    where
        V: Hash + Eq,
        F: FnMut(&V),
    {
        distinct_by(self.intervals.values.iter(), |value| value, f);
    }

    /// Release every arena.
    pub fn dispose(self) {
        drop(self);
    }

    fn push_unsorted(&mut self, from: K, to: K, value: V) {
        order::reserve_one(&mut self.intervals, self.grow_factor);
        self.intervals.from.push(from);
        self.intervals.end.push(to);
        self.intervals.values.push(value);
    }

    fn sort(&mut self) {
        order::sort_by_key(&mut self.intervals, |intervals, row| intervals.from[row]);
    }
}

impl<K: Key, A: Copy + Hash + Eq, B: Copy + Hash + Eq> RangeStore<K, (A, B)> {
    /// Call `f` once for every distinct first-lane value.
    pub fn distinct_first<F: FnMut(A)>(&self, f: F) {
        distinct_by(self.intervals.values.iter(), |&(a, _)| a, f);
    }

    /// Call `f` once for every distinct second-lane value.
    pub fn distinct_second<F: FnMut(B)>(&self, f: F) {
        distinct_by(self.intervals.values.iter(), |&(_, b)| b, f);
    }
}

fn distinct_by<'a, T, U, I, P, F>(items: I, project: P, mut f: F)
where
    T: 'a,
    U: Copy + Hash + Eq,
    I: Iterator<Item = &'a T>,
    P: Fn(&'a T) -> U,
    F: FnMut(U),
{
    let mut seen = AHashSet::new();
    for item in items {
        let key = project(item);
        if seen.insert(key) {
            f(key);
        }
    }
}

/// Staging front-end for bulk-loading a [`RangeStore`].
pub struct RangeStoreBuilder<K: Key, V> {
    store: RangeStore<K, V>,
    needs_sort: bool,
}

impl<K: Key, V> RangeStoreBuilder<K, V> {
    /// Create a builder with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            store: RangeStore::with_config(config),
            needs_sort: false,
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Map the inclusive range `[from, to]` to `value`. A range with
    /// `from > to` is stored but never matches.
    pub fn add(&mut self, from: K, to: K, value: V) {
        self.needs_sort = true;
        self.store.push_unsorted(from, to, value);
    }

    /// Sort by range start and trim the arenas to the final size.
    pub fn build(mut self) -> RangeStore<K, V> {
        if self.needs_sort {
            self.store.sort();
            self.needs_sort = false;
        }
        order::shrink(&mut self.store.intervals);

        debug!(len = self.store.len(), "built range store");
        self.store
    }
}

impl<K: Key, V> Default for RangeStoreBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V> Extend<(RangeInclusive<K>, V)> for RangeStoreBuilder<K, V> {
    fn extend<I: IntoIterator<Item = (RangeInclusive<K>, V)>>(&mut self, iter: I) {
        for (range, value) in iter {
            let (from, to) = range.into_inner();
            self.add(from, to, value);
        }
    }
}
