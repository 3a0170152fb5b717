//! # Chained Hash Map
//!
//! A Rust implementation of a hash table using separate chaining.
//!
//! `ChainedHashMap` keeps a table of buckets, each holding a doubly-linked chain of the
//! entries that hash to it. Keys are hashed through their textual form: the text is
//! Unicode-normalized (NFC) and lowercased, then run through a polynomial rolling hash
//! modulo the table capacity. The bucket index of every normalized string is memoized.
//!
//! The table starts with 16 buckets and doubles whenever the ratio of entries to buckets
//! exceeds the load factor (0.75 unless changed) after an insertion.
//!
//! ## Basic Usage
//!
//! ```rust
//! use chainmap::ChainedHashMap;
//!
//! // Create a new hash map
//! let mut map = ChainedHashMap::new();
//!
//! // Insert values
//! map.set("apple".to_string(), "red");
//! map.set("banana".to_string(), "yellow");
//!
//! // Retrieve values
//! assert_eq!(map.get("apple"), Some(&"red"));
//! assert!(map.has("banana"));
//!
//! // Update values
//! map.set("apple".to_string(), "light-green");
//! assert_eq!(map.get("apple"), Some(&"light-green"));
//! assert_eq!(map.len(), 2);
//!
//! // Remove values
//! assert!(map.remove("apple"));
//! assert_eq!(map.get("apple"), None);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use chainmap::{ChainedHashMap, ConfigError, MapConfig, ResizePolicy};
//!
//! let mut map: ChainedHashMap<String, u32> = ChainedHashMap::new();
//! assert_eq!(map.set_load_factor(1.0), Err(ConfigError::InvalidLoadFactor(1.0)));
//! assert!(map.set_load_factor(0.5).is_ok());
//!
//! // Relocate every entry when the table grows
//! let map = MapConfig::new()
//!     .resize_policy(ResizePolicy::Rehash)
//!     .build::<String, u32>()
//!     .unwrap();
//! assert_eq!(map.capacity(), 16);
//! ```

/// Index-addressed storage for collision chains
mod chain;
/// The separate-chaining hash map
mod chained_map;
/// Load factor, capacity and resize settings
mod config;
/// Configuration errors
mod error;
/// Key normalization, slot hashing and the slot memo
mod hasher;
/// Coercion of keys to text
mod key;

pub use chain::Chain;
pub use chained_map::{Buckets, ChainedHashMap, Iter, StoredEntry};
pub use config::{DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, LoadFactor, MapConfig, ResizePolicy};
pub use error::ConfigError;
pub use key::KeyText;
