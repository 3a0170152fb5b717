//! Slot hashing with a per-map memo of normalized key strings

use std::{cell::RefCell, collections::HashMap};

use log::trace;
use unicode_normalization::UnicodeNormalization;

use crate::key::KeyText;

/// Multiplier of the polynomial rolling hash
const PRIME: u128 = 31;

/// Maps keys to bucket indices.
///
/// A key's text is NFC-normalized and lowercased before hashing, so `"Apple"` and `"apple"`
/// always share a bucket. The slot computed for a normalized string is remembered and
/// returned on every later request for that string, whatever the capacity is by then.
/// Callers that change capacity and need fresh slots must call [`SlotHasher::forget_all`].
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotHasher {
    /// Normalized key text to the slot it was first hashed to
    memo: RefCell<HashMap<String, usize>>,
}

impl SlotHasher {
    /// Creates a hasher with an empty memo
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the bucket index for `key` in a table of `capacity` slots.
    pub(crate) fn slot<Q: KeyText + ?Sized>(&self, key: &Q, capacity: usize) -> usize {
        let normalized = normalize(&key.key_text());

        if let Some(&slot) = self.memo.borrow().get(&normalized) {
            return slot;
        }

        let slot = polynomial_slot(&normalized, capacity);
        trace!("memo miss for {normalized:?}: slot {slot} of {capacity}");
        self.memo.borrow_mut().insert(normalized, slot);
        slot
    }

    /// Drops every memoized slot
    pub(crate) fn forget_all(&mut self) {
        self.memo.get_mut().clear();
    }

    /// Number of distinct normalized strings remembered
    pub(crate) fn memoized(&self) -> usize {
        self.memo.borrow().len()
    }
}

/// Canonical composition followed by lowercasing
fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// `h = (31 * h + code_point) mod capacity` over the code points of `text`
#[allow(clippy::arithmetic_side_effects)]
fn polynomial_slot(text: &str, capacity: usize) -> usize {
    let Ok(modulus) = u128::try_from(capacity) else {
        return 0;
    };
    if modulus == 0 {
        return 0;
    }

    let hash =
        text.chars().fold(0u128, |hash, ch| (PRIME * hash + u128::from(u32::from(ch))) % modulus);

    // `hash < modulus`, which came from a `usize`
    usize::try_from(hash).unwrap_or_default()
}
