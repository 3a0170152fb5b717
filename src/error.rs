//! Errors raised while configuring a `ChainedHashMap`

use thiserror::Error;

/// The only failure a map can report: a rejected configuration value.
///
/// Every other operation is total. Validation happens before any state is touched, so a
/// rejected value leaves the map exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The load factor was NaN or outside the open interval `(0, 1)`
    #[error("load factor must be between 0 and 1 (exclusive), got {0}")]
    InvalidLoadFactor(f64),
    /// A bucket table cannot be built with zero slots
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,
}
