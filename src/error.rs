//! Error types.
//!
//! Lookup misses are not errors; every query returns `Option`. The only
//! recoverable failures are malformed input at the parsing and configuration
//! boundaries. Failures to map or unmap an arena region abort the process
//! instead of surfacing here.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the parsing and configuration entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A mask must contain at least one symbol.
    #[error("invalid mask: mask is empty")]
    EmptyMask,

    /// A mask may only contain decimal digits and `?`.
    #[error("invalid mask {mask:?}: unexpected {found:?} at position {position}")]
    InvalidMaskSymbol {
        /// The rejected input.
        mask: String,
        /// Byte offset of the first offending character.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// Capacity multipliers must be finite and at least `1.0`.
    #[error("invalid grow factor {0}: must be finite and >= 1.0")]
    InvalidGrowFactor(f64),
}
