//! Digit masks: fixed-length patterns over decimal digits and `?`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One position of a [`Mask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Matches exactly this digit (`0..=9`).
    Digit(u8),
    /// Matches any single digit.
    Wildcard,
}

impl Symbol {
    fn parse(c: char) -> Option<Self> {
        match c {
            '?' => Some(Symbol::Wildcard),
            '0'..='9' => Some(Symbol::Digit(c as u8 - b'0')),
            _ => None,
        }
    }

    /// Whether this symbol matches `digit`.
    #[inline]
    pub fn matches(self, digit: u8) -> bool {
        match self {
            Symbol::Digit(d) => d == digit,
            Symbol::Wildcard => true,
        }
    }
}

/// A non-empty pattern of digits and `?` wildcards, matched position by
/// position against the decimal digits of a key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mask {
    symbols: Box<[Symbol]>,
}

impl Mask {
    /// Parse `text`, which must match `^[0-9?]+$`.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(Error::EmptyMask);
        }

        let symbols = text
            .char_indices()
            .map(|(position, found)| {
                Symbol::parse(found).ok_or_else(|| Error::InvalidMaskSymbol {
                    mask: text.to_string(),
                    position,
                    found,
                })
            })
            .collect::<Result<Box<[Symbol]>>>()?;

        Ok(Self { symbols })
    }

    /// Parse a mask that is known to be well formed.
    ///
    /// # Panics
    /// Panics if `text` is not a valid mask.
    pub fn must_parse(text: &str) -> Self {
        match Self::parse(text) {
            Ok(mask) => mask,
            Err(err) => panic!("{err}"),
        }
    }

    /// Number of positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false`; parsing rejects empty masks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The concrete digit at position `i`, or `None` for a wildcard.
    ///
    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn digit(&self, i: usize) -> Option<u8> {
        match self.symbols[i] {
            Symbol::Digit(d) => Some(d),
            Symbol::Wildcard => None,
        }
    }

    /// # Panics
    /// Panics if `i >= len`.
    #[inline]
    pub fn is_wildcard(&self, i: usize) -> bool {
        self.symbols[i] == Symbol::Wildcard
    }

    /// Whether `digits` (most significant first) satisfy the mask.
    pub fn matches(&self, digits: &[u8]) -> bool {
        self.symbols.len() == digits.len()
            && self.symbols.iter().zip(digits).all(|(s, &d)| s.matches(d))
    }
}

impl FromStr for Mask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Digit(d) => write!(f, "{d}"),
            Symbol::Wildcard => f.write_str("?"),
        }
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|s| write!(f, "{s}"))
    }
}
