//! Typed off-heap buffers.
//!
//! An [`Arena`] owns one contiguous region sized for a fixed number of
//! elements and tracks how many of them are live. The region is never resized
//! in place: [`Arena::grow`] and [`Arena::trim_to_size`] consume the arena,
//! map a fresh region, move the live elements across and release the old
//! one. Because both take `self` by value, a stale handle cannot be used after
//! its region has been released, and [`Arena::dispose`] can only run once.
//!
//! Appending into a full arena is a caller error that panics; structures built
//! on top of arenas grow them before appending.

mod region;

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use tracing::debug;

use region::Region;

/// A fixed-capacity buffer of `T` stored outside the Rust heap.
pub struct Arena<T> {
    region: Region,
    len: usize,
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> Arena<T> {
    /// An arena with no capacity. Performs no system call.
    pub fn new() -> Self {
        Self {
            region: Region::empty::<T>(),
            len: 0,
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Reserve a zeroed region for `capacity` elements. The arena starts empty.
    pub fn allocate(capacity: usize) -> Self {
        Self {
            region: Region::map::<T>(capacity),
            len: 0,
            capacity,
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the region can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Bytes reserved for this arena's region.
    pub fn reserved_bytes(&self) -> usize {
        self.region.bytes()
    }

    #[inline]
    fn as_ptr(&self) -> *mut T {
        self.region.as_ptr::<T>()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` elements are initialised and the region
        // outlives the borrow.
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with exclusive access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.as_ptr(), self.len) }
    }

    /// Append `value`.
    ///
    /// # Panics
    /// Panics if the arena is full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.push_within_capacity(value).is_err() {
            panic!("arena capacity exhausted ({} elements)", self.capacity);
        }
    }

    /// Append `value`, handing it back if the arena is full.
    #[inline]
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        // SAFETY: `len < capacity`, so the slot lies inside the region.
        unsafe { self.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Insert `value` at `index`, shifting every later element up by one.
    /// `index == len` appends.
    ///
    /// # Panics
    /// Panics if `index > len` or the arena is full.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(
            index <= self.len,
            "insertion index {index} out of bounds (len {})",
            self.len
        );
        assert!(
            !self.is_full(),
            "arena capacity exhausted ({} elements)",
            self.capacity
        );

        // SAFETY: `index <= len < capacity`; the shifted range ends at `len`,
        // which is inside the region.
        unsafe {
            let at = self.as_ptr().add(index);
            ptr::copy(at, at.add(1), self.len - index);
            at.write(value);
        }
        self.len += 1;
    }

    /// Replace the element at `index`, returning the old one.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> T {
        mem::replace(&mut self.as_mut_slice()[index], value)
    }

    /// Remove the element at `index` by moving the last element into its
    /// place. O(1), but does not preserve ordering.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    pub fn swap_remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index {index} out of bounds (len {})",
            self.len
        );

        self.len -= 1;
        // SAFETY: both `index` and the old last slot are initialised; the
        // last slot is logically dropped by the length decrement above.
        unsafe {
            let base = self.as_ptr();
            let removed = base.add(index).read();
            if index != self.len {
                ptr::copy_nonoverlapping(base.add(self.len), base.add(index), 1);
            }
            removed
        }
    }

    /// Drop every element at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        // SAFETY: the tail was initialised and is no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_ptr().add(len), tail));
        }
    }

    /// Move the live elements into a new region of `capacity` elements and
    /// release the current one.
    ///
    /// # Panics
    /// Panics if `capacity < len`.
    pub fn grow(self, capacity: usize) -> Self {
        assert!(
            capacity >= self.len,
            "cannot reallocate {} elements into capacity {capacity}",
            self.len
        );
        self.reallocate(capacity)
    }

    /// Move the live elements into a region of exactly `len` elements and
    /// release the current one.
    pub fn trim_to_size(self) -> Self {
        let len = self.len;
        self.reallocate(len)
    }

    /// Release the region, dropping every live element.
    pub fn dispose(self) {
        drop(self);
    }

    fn reallocate(mut self, capacity: usize) -> Self {
        debug!(
            len = self.len,
            from = self.capacity,
            to = capacity,
            "reallocating arena"
        );

        let mut target = Self::allocate(capacity);
        // SAFETY: the regions are distinct and `len <= capacity` on both
        // sides. Ownership of the moved elements passes to `target`; zeroing
        // our length keeps `drop(self)` from dropping them again.
        unsafe { ptr::copy_nonoverlapping(self.as_ptr(), target.as_ptr(), self.len) };
        target.len = self.len;
        self.len = 0;
        target
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            // SAFETY: the live prefix is initialised and never touched again.
            unsafe { ptr::drop_in_place(self.as_mut_slice()) };
        }
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Arena<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Arena<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T> IntoIterator for &'a Arena<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// The arena uniquely owns its region, exactly like a `Vec<T>` owns its buffer.
unsafe impl<T: Send> Send for Arena<T> {}
unsafe impl<T: Sync> Sync for Arena<T> {}
