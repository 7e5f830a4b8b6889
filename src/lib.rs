//! # offheap-sparse
//!
//! Compact lookup structures for very large numeric key sets, stored in
//! off-heap arenas instead of per-entry heap allocations.
//!
//! - [`SparseMap`]: sorted parallel key/value arenas with binary search and
//!   tombstone deletes, bulk-loaded through a [`SparseMapBuilder`].
//! - [`RangeStore`]: disjoint inclusive ranges mapped to values, with a dense
//!   two-lane [`DenseRangeStore`] variant.
//! - [`DigitTrie`]: decimal digit masks with `?` wildcards resolved against
//!   numeric keys.
//!
//! Every structure sizes its arenas from a [`Config`]. The default
//! preallocation targets tens of millions of entries, so pass a smaller one
//! for small tables.
//!
//! ## Example
//!
//! ```rust
//! use offheap_sparse::{Config, SparseMap};
//!
//! let mut map: SparseMap<u64, i32> = SparseMap::with_config(Config::default().with_preallocate(8));
//! map.add(42, 1);
//! map.add(7, 2);
//!
//! assert_eq!(map.get(42), Some(&1));
//! assert_eq!(map.delete(7), Some(2));
//! assert_eq!(map.get(7), None);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod arena;
pub mod error;
mod order;
pub mod range;
pub mod sparse;
pub mod trie;

pub use arena::Arena;
pub use error::{Error, Result};
pub use range::{DenseRangeStore, DenseRangeStoreBuilder, RangeStore, RangeStoreBuilder};
pub use sparse::{Key, SparseMap, SparseMapBuilder, Value};
pub use trie::{DigitTrie, Mask, Symbol};

/// Initial arena capacity, in elements, used by [`Config::default`].
pub const DEFAULT_PREALLOCATE: usize = 17_000_000;

/// Capacity multiplier applied when a full arena grows.
pub const DEFAULT_GROW_FACTOR: f64 = 1.25;

/// Sizing for the arenas behind every structure in this crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    preallocate: usize,
    grow_factor: f64,
}

impl Config {
    /// Build a config, rejecting grow factors that are not finite or are
    /// below `1.0`.
    pub fn new(preallocate: usize, grow_factor: f64) -> Result<Self> {
        if !grow_factor.is_finite() || grow_factor < 1.0 {
            return Err(Error::InvalidGrowFactor(grow_factor));
        }
        Ok(Self {
            preallocate,
            grow_factor,
        })
    }

    pub fn with_preallocate(self, preallocate: usize) -> Self {
        Self {
            preallocate,
            ..self
        }
    }

    /// Elements reserved up front by each arena.
    pub fn preallocate(&self) -> usize {
        self.preallocate
    }

    pub fn grow_factor(&self) -> f64 {
        self.grow_factor
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preallocate: DEFAULT_PREALLOCATE,
            grow_factor: DEFAULT_GROW_FACTOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.preallocate(), 17_000_000);
        assert_eq!(config.grow_factor(), 1.25);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::new(10, 1.0).is_ok());
        assert_eq!(Config::new(10, 2.5).unwrap().grow_factor(), 2.5);
        assert_eq!(Config::new(10, 0.5), Err(Error::InvalidGrowFactor(0.5)));
        assert!(Config::new(10, f64::NAN).is_err());
        assert!(Config::new(10, f64::INFINITY).is_err());
    }

    #[test]
    fn test_with_preallocate_keeps_grow_factor() {
        let config = Config::new(1, 3.0).unwrap().with_preallocate(64);
        assert_eq!(config.preallocate(), 64);
        assert_eq!(config.grow_factor(), 3.0);
    }

    #[test]
    fn test_growth_from_small_capacity() {
        let config = Config::new(1, 1.0).unwrap();
        let mut map: SparseMap<u32, u32> = SparseMap::with_config(config);
        for key in 0..100 {
            map.add(key, key);
        }
        assert_eq!(map.len(), 100);
        assert!((0..100).all(|key| map.get(key) == Some(&key)));
    }
}

#[cfg(test)]
mod proptests;
