//! Wildcard digit trie.
//!
//! [`DigitTrie`] maps digit [`Mask`]s to values and resolves a numeric key to
//! the value of a matching mask. Every node has ten digit edges and one
//! wildcard edge; each edge consumes exactly one digit of the key.
//!
//! Lookup walks the key's decimal digits most significant first while
//! keeping a frontier of every node reachable so far. From each frontier node
//! the exact-digit edge is followed before the wildcard edge, so when several
//! masks match, the winner is the first one in that order: at the leftmost
//! position where two matching masks differ, the one with the concrete digit
//! wins.
//!
//! ```rust
//! use offheap_sparse::{DigitTrie, Mask};
//!
//! let mut trie = DigitTrie::new();
//! trie.put(&Mask::must_parse("7944???????"), "a");
//! trie.put(&Mask::must_parse("79440??????"), "b");
//!
//! assert_eq!(trie.lookup(79441001101), Some(&"a"));
//! assert_eq!(trie.lookup(79440001101), Some(&"b"));
//! assert_eq!(trie.lookup(7944), None);
//! ```

mod mask;

pub use mask::{Mask, Symbol};

use std::array;
use std::fmt;
use std::mem;

use smallvec::{smallvec, SmallVec};

/// Decimal digits in `u64::MAX`.
pub const MAX_DIGITS: usize = 20;

/// Write the decimal digits of `key` into the tail of `buf`, most
/// significant first, and return them. Zero has no digits.
pub fn decimal_digits(key: u64, buf: &mut [u8; MAX_DIGITS]) -> &[u8] {
    let mut n = key;
    let mut start = MAX_DIGITS;
    while n > 0 {
        start -= 1;
        buf[start] = (n % 10) as u8;
        n /= 10;
    }
    &buf[start..]
}

struct Node<V> {
    value: Option<V>,
    children: [Option<Box<Node<V>>>; 10],
    wildcard: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            value: None,
            children: array::from_fn(|_| None),
            wildcard: None,
        }
    }

    fn edge_mut(&mut self, symbol: Symbol) -> &mut Option<Box<Node<V>>> {
        match symbol {
            Symbol::Digit(d) => &mut self.children[d as usize],
            Symbol::Wildcard => &mut self.wildcard,
        }
    }

    fn edge(&self, symbol: Symbol) -> Option<&Node<V>> {
        match symbol {
            Symbol::Digit(d) => self.children[d as usize].as_deref(),
            Symbol::Wildcard => self.wildcard.as_deref(),
        }
    }
}

type Frontier<'a, V> = SmallVec<[&'a Node<V>; 32]>;

/// Prefix tree over decimal digits with single-digit wildcards.
pub struct DigitTrie<V> {
    root: Node<V>,
    len: usize,
}

impl<V> DigitTrie<V> {
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Number of registered masks.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Register `mask` with `value`, returning the value previously
    /// registered for the exact same mask. `None` means the mask is new.
    pub fn put(&mut self, mask: &Mask, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for &symbol in mask.symbols() {
            node = node
                .edge_mut(symbol)
                .get_or_insert_with(|| Box::new(Node::new()));
        }

        let prev = node.value.replace(value);
        if prev.is_none() {
            self.len += 1;
        }
        prev
    }

    /// Value registered for exactly `mask`.
    pub fn get(&self, mask: &Mask) -> Option<&V> {
        let mut node = &self.root;
        for &symbol in mask.symbols() {
            node = node.edge(symbol)?;
        }
        node.value.as_ref()
    }

    /// Value of the first mask matching `key`'s decimal digits.
    pub fn lookup(&self, key: u64) -> Option<&V> {
        let mut buf = [0u8; MAX_DIGITS];
        let digits = decimal_digits(key, &mut buf);

        let mut frontier: Frontier<'_, V> = smallvec![&self.root];
        let mut next: Frontier<'_, V> = SmallVec::new();
        for &digit in digits {
            next.clear();
            for node in &frontier {
                if let Some(child) = node.children[digit as usize].as_deref() {
                    next.push(child);
                }
                if let Some(child) = node.wildcard.as_deref() {
                    next.push(child);
                }
            }
            mem::swap(&mut frontier, &mut next);
            if frontier.is_empty() {
                return None;
            }
        }

        frontier.iter().find_map(|node| node.value.as_ref())
    }
}

impl<V> Default for DigitTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for DigitTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitTrie")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// Indented dump: one line per edge, `= value` under nodes that hold one.
impl<V: fmt::Display> fmt::Display for DigitTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, &self.root, 0)
    }
}

fn write_node<V: fmt::Display>(f: &mut fmt::Formatter<'_>, node: &Node<V>, depth: usize) -> fmt::Result {
    let pad = depth * 2;
    if let Some(value) = &node.value {
        writeln!(f, "{:pad$}= {value}", "")?;
    }
    for (digit, child) in node.children.iter().enumerate() {
        if let Some(child) = child {
            writeln!(f, "{:pad$}{digit}", "")?;
            write_node(f, child, depth + 1)?;
        }
    }
    if let Some(child) = &node.wildcard {
        writeln!(f, "{:pad$}?", "")?;
        write_node(f, child, depth + 1)?;
    }
    Ok(())
}
