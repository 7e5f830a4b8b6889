//! Ordering primitives over parallel arena columns.
//!
//! Sparse maps and range stores keep one arena per field, positionally
//! aligned. Sorting or compacting them means permuting every column the same
//! way, so the algorithms here only see a [`Columns`] implementation that
//! knows how to swap and truncate all of its arenas at once.

use crate::arena::Arena;

/// A set of equally long arenas that are reordered together.
pub(crate) trait Columns {
    /// Shared length of every column.
    fn len(&self) -> usize;

    /// Shared capacity of every column.
    fn capacity(&self) -> usize;

    /// Swap rows `a` and `b` in every column.
    fn swap(&mut self, a: usize, b: usize);

    /// Drop every row at or after `len`.
    fn truncate(&mut self, len: usize);

    /// Move every column into fresh regions of `capacity` rows.
    fn reallocate(&mut self, capacity: usize);
}

/// Capacity to grow to once `len` rows have filled `capacity`.
///
/// Always strictly larger than `capacity`, even for tiny or empty columns
/// where `grow_factor × len` would not make progress.
pub(crate) fn next_capacity(len: usize, capacity: usize, grow_factor: f64) -> usize {
    let scaled = (len as f64 * grow_factor) as usize;
    scaled.max(capacity.saturating_add(1))
}

/// Grow `columns` if no free row is left.
pub(crate) fn reserve_one<C: Columns>(columns: &mut C, grow_factor: f64) {
    let (len, capacity) = (columns.len(), columns.capacity());
    if len < capacity {
        return;
    }
    columns.reallocate(next_capacity(len, capacity, grow_factor));
}

/// Release unused capacity.
pub(crate) fn shrink<C: Columns>(columns: &mut C) {
    let len = columns.len();
    if len < columns.capacity() {
        columns.reallocate(len);
    }
}

/// Sort rows ascending by `key`, breaking ties by current position.
///
/// Equal keys therefore keep their relative order, which is what lets
/// [`fold_duplicates`] keep the most recent write.
pub(crate) fn sort_by_key<C, K, F>(columns: &mut C, key: F)
where
    C: Columns,
    K: Ord,
    F: Fn(&C, usize) -> K,
{
    let len = columns.len();
    if len < 2 {
        return;
    }

    let mut perm: Arena<usize> = Arena::allocate(len);
    for row in 0..len {
        perm.push(row);
    }
    let view: &C = columns;
    perm.sort_unstable_by_key(|&row| (key(view, row), row));
    apply_permutation(columns, &mut perm);
}

/// Rearrange rows so that row `i` ends up holding what was at `perm[i]`.
///
/// Walks each cycle of the permutation once, marking visited slots by
/// rewriting them as fixed points.
fn apply_permutation<C: Columns>(columns: &mut C, perm: &mut [usize]) {
    for start in 0..perm.len() {
        if perm[start] == start {
            continue;
        }
        let mut cur = start;
        loop {
            let next = perm[cur];
            perm[cur] = cur;
            if next == start {
                break;
            }
            columns.swap(cur, next);
            cur = next;
        }
    }
}

/// Keep only rows for which `keep` holds, preserving their relative order.
/// Returns the number of rows removed.
///
/// `keep` is evaluated once per row, in order, before that row is moved, and
/// may inspect rows after it.
pub(crate) fn retain<C, F>(columns: &mut C, mut keep: F) -> usize
where
    C: Columns,
    F: FnMut(&C, usize) -> bool,
{
    let len = columns.len();
    let mut write = 0;
    for read in 0..len {
        if !keep(columns, read) {
            continue;
        }
        if read != write {
            columns.swap(read, write);
        }
        write += 1;
    }
    columns.truncate(write);
    len - write
}

/// Collapse runs of equal keys in a sorted column set down to their last row.
/// Returns the number of rows removed.
pub(crate) fn fold_duplicates<C, K, F>(columns: &mut C, key: F) -> usize
where
    C: Columns,
    K: PartialEq,
    F: Fn(&C, usize) -> K,
{
    retain(columns, |c, row| row + 1 == c.len() || key(c, row) != key(c, row + 1))
}
