//! Tunables for `ChainedHashMap`: load factor, starting capacity and resize behavior

use crate::{ChainedHashMap, error::ConfigError};

/// Number of buckets a map starts with unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 16;

/// Load factor a map starts with unless configured otherwise
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// A load factor known to lie strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LoadFactor(f64);

impl LoadFactor {
    /// Validates `value`. NaN and anything outside `(0, 1)` is rejected.
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidLoadFactor(value))
        }
    }

    /// The raw ratio
    #[must_use]
    pub fn get(self) -> f64 {
        self.0
    }

    /// Returns true once `stored / capacity` is strictly above this factor
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn is_exceeded(self, stored: usize, capacity: usize) -> bool {
        capacity == 0 || (stored as f64) / (capacity as f64) > self.0
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self(DEFAULT_LOAD_FACTOR)
    }
}

impl TryFrom<f64> for LoadFactor {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// What happens to existing chains when the bucket table doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Chains stay at the slot index they already occupy and memoized slots are kept, so
    /// keys hashed before a resize keep their old bucket forever. New keys hash under the
    /// new capacity.
    #[default]
    PreserveSlots,
    /// The memo is dropped and every entry is relinked into the bucket its key hashes to
    /// under the new capacity.
    Rehash,
}

/// Builder for a `ChainedHashMap` with non-default settings.
///
/// ```rust
/// use chainmap::{MapConfig, ResizePolicy};
///
/// let map = MapConfig::new()
///     .initial_capacity(4)
///     .load_factor(0.5)
///     .resize_policy(ResizePolicy::Rehash)
///     .build::<String, u32>()
///     .unwrap();
/// assert_eq!(map.capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Bucket count of the first table
    initial_capacity: usize,
    /// Unvalidated load factor, checked in `build`
    load_factor: f64,
    /// Resize behavior
    resize_policy: ResizePolicy,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MapConfig {
    /// Starts from the defaults: 16 buckets, 0.75 load factor, slot-preserving resize
    #[must_use]
    pub fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            resize_policy: ResizePolicy::default(),
        }
    }

    /// Sets the bucket count of the first table
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the load factor; validated when the map is built
    #[must_use]
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Sets the resize behavior
    #[must_use]
    pub fn resize_policy(mut self, policy: ResizePolicy) -> Self {
        self.resize_policy = policy;
        self
    }

    /// Validates the settings and creates an empty map
    pub fn build<K, V>(self) -> Result<ChainedHashMap<K, V>, ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let load_factor = LoadFactor::new(self.load_factor)?;
        Ok(ChainedHashMap::from_parts(self.initial_capacity, load_factor, self.resize_policy))
    }
}
