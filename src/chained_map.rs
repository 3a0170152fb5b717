use std::{
    borrow::Borrow,
    fmt,
    iter::FusedIterator,
    slice,
};

use log::debug;

use crate::{
    chain::{Arena, Chain},
    config::{DEFAULT_CAPACITY, LoadFactor, ResizePolicy},
    error::ConfigError,
    hasher::SlotHasher,
    key::KeyText,
};

/// A hash map using separate chaining.
///
/// Each bucket holds a doubly-linked chain of entries. Keys are hashed through their
/// textual form (see [`KeyText`]), normalized to NFC and lowercased, so keys that differ
/// only in case share a bucket while still being distinct keys. Computed bucket indices are
/// memoized per normalized string.
///
/// The table starts with 16 buckets and doubles whenever `len / capacity` exceeds the load
/// factor (0.75 by default) after a `set`. It never shrinks. How existing chains are treated
/// on growth is chosen with [`ResizePolicy`].
///
/// Note: lookups update the hash memo through a `RefCell`, so the map is not `Sync`.
#[derive(Clone)]
pub struct ChainedHashMap<K, V> {
    /// Bucket table; each slot holds the arena index of a chain head
    buckets: Vec<Option<usize>>,
    /// Storage for every chain node
    arena: Arena<K, V>,
    /// Number of live entries
    stored_keys: usize,
    /// Growth threshold
    load_factor: LoadFactor,
    /// What growth does to existing chains
    resize_policy: ResizePolicy,
    /// Key to bucket mapping with its memo
    hasher: SlotHasher,
}

/// The entry a [`ChainedHashMap::set`] call stored or updated
#[derive(Debug)]
pub struct StoredEntry<'a, K, V> {
    /// Key held by the entry
    key: &'a K,
    /// Value held by the entry
    value: &'a mut V,
}

impl<'a, K, V> StoredEntry<'a, K, V> {
    /// The stored key. For an update this is the key that was already present.
    #[must_use]
    pub fn key(&self) -> &K {
        self.key
    }

    /// The stored value
    #[must_use]
    pub fn value(&self) -> &V {
        self.value
    }

    /// Mutable access to the stored value
    pub fn value_mut(&mut self) -> &mut V {
        self.value
    }

    /// Converts into a mutable reference that lives as long as the map borrow
    #[must_use]
    pub fn into_mut(self) -> &'a mut V {
        self.value
    }
}

impl<K, V> Default for ChainedHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ChainedHashMap<K, V> {
    /// Creates an empty map with 16 buckets, a 0.75 load factor and slot-preserving growth
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(DEFAULT_CAPACITY, LoadFactor::default(), ResizePolicy::default())
    }

    /// Creates an empty map with `capacity` buckets (at least one)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(capacity.max(1), LoadFactor::default(), ResizePolicy::default())
    }

    /// Assembles a map from already validated settings
    pub(crate) fn from_parts(
        capacity: usize,
        load_factor: LoadFactor,
        resize_policy: ResizePolicy,
    ) -> Self {
        Self {
            buckets: vec![None; capacity],
            arena: Arena::default(),
            stored_keys: 0,
            load_factor,
            resize_policy,
            hasher: SlotHasher::new(),
        }
    }

    /// Changes the load factor used by later growth checks.
    ///
    /// The value must lie strictly between 0 and 1; anything else, NaN included, is rejected
    /// and leaves the map untouched. A lower factor does not grow the table immediately.
    pub fn set_load_factor(&mut self, load_factor: f64) -> Result<(), ConfigError> {
        self.load_factor = LoadFactor::new(load_factor)?;
        Ok(())
    }

    /// Returns the load factor growth is checked against
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.load_factor.get()
    }

    /// Returns the growth behavior
    #[must_use]
    pub fn resize_policy(&self) -> ResizePolicy {
        self.resize_policy
    }

    /// Returns the number of buckets
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.stored_keys
    }

    /// Returns true if the map holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stored_keys == 0
    }

    /// Number of normalized key strings whose bucket index is memoized
    #[must_use]
    pub fn memo_len(&self) -> usize {
        self.hasher.memoized()
    }

    /// Drops every entry and returns a view of the fresh table.
    ///
    /// The capacity stays where growth left it and the hash memo is kept.
    pub fn clear(&mut self) -> Buckets<'_, K, V> {
        self.buckets = vec![None; self.buckets.len()];
        self.arena.clear();
        self.stored_keys = 0;
        self.buckets()
    }

    /// Per-bucket view of the table, in slot order
    #[must_use]
    pub fn buckets(&self) -> Buckets<'_, K, V> {
        Buckets { slots: self.buckets.iter(), arena: &self.arena }
    }

    /// Length of every chain, in slot order; empty buckets report 0
    #[must_use]
    pub fn chain_lengths(&self) -> Vec<usize> {
        self.buckets().map(|chain| chain.map_or(0, Iterator::count)).collect()
    }

    /// Returns an iterator over the entries, bucket by bucket and head to tail within a
    /// bucket
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: self.buckets(), chain: None }
    }

    /// All keys, in iteration order
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// All values, in iteration order
    #[must_use]
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, value)| value).collect()
    }

    /// All key-value pairs, in iteration order
    #[must_use]
    pub fn entries(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }

    /// Head of the chain at `slot`.
    ///
    /// Slots produced by the hasher are always in range: memoized slots come from an equal
    /// or smaller capacity and the table never shrinks.
    fn head(&self, slot: usize) -> Option<usize> {
        self.buckets.get(slot).copied().flatten()
    }

    /// Points the bucket at `slot` to `head`
    fn set_head(&mut self, slot: usize, head: Option<usize>) {
        if let Some(bucket) = self.buckets.get_mut(slot) {
            *bucket = head;
        }
    }
}

impl<K, V> ChainedHashMap<K, V>
where
    K: KeyText + PartialEq,
{
    /// Bucket index of `key` under the current capacity (or its memoized index)
    fn slot_of<Q: KeyText + ?Sized>(&self, key: &Q) -> usize {
        self.hasher.slot(key, self.buckets.len())
    }

    /// Inserts `key` or overwrites the value of an equal key already present.
    ///
    /// An overwritten entry keeps its position in its chain. The table may grow afterwards.
    ///
    /// Returns the entry holding the key after the call. Growth never moves a node within the
    /// arena, so the entry is always found again.
    pub fn set(&mut self, key: K, value: V) -> Option<StoredEntry<'_, K, V>> {
        let slot = self.slot_of(&key);

        let index = match self.head(slot) {
            None => {
                let index = self.arena.alloc(key, value);
                self.set_head(slot, Some(index));
                self.stored_keys = self.stored_keys.saturating_add(1);
                index
            }
            Some(head) => {
                // Stops at the first equal key, or at the tail when there is none
                let stop = self
                    .arena
                    .find(head, |node| node.key == key || node.next.is_none())
                    .unwrap_or(head);

                if self.arena.node(stop).is_some_and(|node| node.key == key) {
                    if let Some(node) = self.arena.node_mut(stop) {
                        node.value = value;
                    }
                    stop
                } else {
                    let index = self.arena.alloc(key, value);
                    self.arena.link_after(stop, index);
                    self.stored_keys = self.stored_keys.saturating_add(1);
                    index
                }
            }
        };

        self.grow_if_needed();

        self.arena
            .node_mut(index)
            .map(|node| StoredEntry { key: &node.key, value: &mut node.value })
    }

    /// Returns a reference to the value stored under `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        let index = self.locate(key)?;
        self.arena.node(index).map(|node| &node.value)
    }

    /// Returns the stored key and value for `key`
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        let index = self.locate(key)?;
        self.arena.node(index).map(|node| (&node.key, &node.value))
    }

    /// Returns a mutable reference to the value stored under `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        let index = self.locate(key)?;
        self.arena.node_mut(index).map(|node| &mut node.value)
    }

    /// Returns true if an entry with a key equal to `key` is stored
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Removes the entry for `key`. Returns false if there was none.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Removes the entry for `key` and returns its value
    pub fn take<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        let slot = self.slot_of(key);
        let head = self.head(slot)?;
        let (head_matches, successor) =
            self.arena.node(head).map(|node| (matches(&node.key, key), node.next))?;

        let index = if head_matches {
            // Solitary head empties the bucket, otherwise the successor is promoted
            self.set_head(slot, successor);
            if let Some(successor) = successor {
                self.arena.make_head(successor);
            }
            head
        } else {
            successor?;
            let found = self.arena.find(head, |node| matches(&node.key, key))?;
            // Middle nodes join their neighbours, a tail leaves its predecessor as the tail
            self.arena.unlink(found);
            found
        };

        let node = self.arena.release(index)?;
        self.stored_keys = self.stored_keys.saturating_sub(1);
        Some(node.value)
    }

    /// Arena index of the entry whose key equals `key`
    fn locate<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: KeyText + PartialEq + ?Sized,
    {
        let head = self.head(self.slot_of(key))?;
        let node = self.arena.node(head)?;
        if matches(&node.key, key) {
            return Some(head);
        }
        node.next?;
        self.arena.find(head, |node| matches(&node.key, key))
    }

    /// Doubles the table once `len / capacity` is above the load factor
    fn grow_if_needed(&mut self) {
        if self.load_factor.is_exceeded(self.stored_keys, self.buckets.len()) {
            self.grow();
        }
    }

    /// Doubles the bucket table according to the resize policy
    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity.saturating_mul(2);

        match self.resize_policy {
            ResizePolicy::PreserveSlots => {
                // Chains keep their slot index; the new upper half starts empty
                self.buckets.resize(new_capacity, None);
            }
            ResizePolicy::Rehash => self.rehash(new_capacity),
        }

        debug!(
            "grew table from {old_capacity} to {new_capacity} buckets at {} entries ({:?})",
            self.stored_keys, self.resize_policy
        );
    }

    /// Relinks every node into the bucket its key hashes to under `new_capacity`, keeping
    /// bucket-then-chain order
    fn rehash(&mut self, new_capacity: usize) {
        self.hasher.forget_all();
        let old_buckets = std::mem::replace(&mut self.buckets, vec![None; new_capacity]);
        let mut tails: Vec<Option<usize>> = vec![None; new_capacity];

        for head in old_buckets.into_iter().flatten() {
            let mut cursor = Some(head);
            while let Some(index) = cursor {
                let Some(node) = self.arena.node(index) else {
                    break;
                };
                cursor = node.next;
                let slot = self.hasher.slot(&node.key, new_capacity);

                self.arena.detach(index);
                match tails.get(slot).copied().flatten() {
                    Some(tail) => self.arena.link_after(tail, index),
                    None => self.set_head(slot, Some(index)),
                }
                if let Some(tail) = tails.get_mut(slot) {
                    *tail = Some(index);
                }
            }
        }
    }
}

/// Compares a stored key with a possibly borrowed lookup key
fn matches<K, Q>(stored: &K, key: &Q) -> bool
where
    K: Borrow<Q>,
    Q: PartialEq + ?Sized,
{
    stored.borrow() == key
}

impl<K, V> fmt::Debug for ChainedHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Extend<(K, V)> for ChainedHashMap<K, V>
where
    K: KeyText + PartialEq,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashMap<K, V>
where
    K: KeyText + PartialEq,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a ChainedHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Per-bucket view of a table: yields `None` for an empty bucket and its [`Chain`] otherwise
#[derive(Debug, Clone)]
pub struct Buckets<'a, K, V> {
    /// Remaining bucket slots
    slots: slice::Iter<'a, Option<usize>>,
    /// Storage the chains live in
    arena: &'a Arena<K, V>,
}

impl<'a, K, V> Iterator for Buckets<'a, K, V> {
    type Item = Option<Chain<'a, K, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        let slot = self.slots.next()?;
        Some(slot.map(|head| arena.chain(head)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Buckets<'_, K, V> {}

/// Iterator over the entries of a [`ChainedHashMap`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Buckets not visited yet
    buckets: Buckets<'a, K, V>,
    /// Chain currently being walked
    chain: Option<Chain<'a, K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                return Some(entry);
            }
            self.chain = self.buckets.next()?;
        }
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::MapConfig;

    const FIXTURE: [(&str, &str); 12] = [
        ("apple", "red"),
        ("banana", "yellow"),
        ("carrot", "orange"),
        ("dog", "brown"),
        ("elephant", "gray"),
        ("frog", "green"),
        ("grape", "purple"),
        ("hat", "black"),
        ("ice cream", "white"),
        ("jacket", "blue"),
        ("kite", "pink"),
        ("lion", "golden"),
    ];

    fn fixture_map() -> ChainedHashMap<String, String> {
        FIXTURE.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    /// Every chain is a well-formed doubly-linked list and the count matches
    pub(super) fn assert_well_formed<K: KeyText + PartialEq, V>(map: &ChainedHashMap<K, V>) {
        let mut reachable = 0;
        for head in map.buckets.iter().flatten() {
            assert_eq!(map.arena.node(*head).and_then(|node| node.prev), None);
            let mut cursor = Some(*head);
            let mut prev = None;
            while let Some(index) = cursor {
                let node = map.arena.node(index).unwrap();
                assert_eq!(node.prev, prev);
                reachable += 1;
                prev = Some(index);
                cursor = node.next;
            }
        }
        assert_eq!(reachable, map.len());
        assert_eq!(map.entries().len(), map.len());
    }

    /// Two keys with distinct text that land in the same bucket of a 16-slot table
    fn colliding_keys() -> (String, String, String) {
        // "a" = 97 % 16 = 1, "q" = 113 % 16 = 1, "A2" hashes as "a2" -> (31 * 1 + 50) % 16 = 1
        ("a".to_string(), "q".to_string(), "A2".to_string())
    }

    #[test]
    fn test_set_and_get() {
        let mut map = ChainedHashMap::new();
        map.set("key1".to_string(), 1);
        map.set("key2".to_string(), 2);

        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.get("key3"), None);
        assert!(map.has("key1"));
        assert!(!map.has("key3"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_set_returns_stored_entry() {
        let mut map = ChainedHashMap::new();
        let mut entry = map.set("hat".to_string(), "black".to_string()).unwrap();
        assert_eq!(entry.key(), "hat");
        assert_eq!(entry.value(), "black");
        entry.value_mut().push_str("ish");
        assert_eq!(map.get("hat").map(String::as_str), Some("blackish"));

        let entry = map.set("hat".to_string(), "blue-black".to_string()).unwrap();
        *entry.into_mut() += "!";
        assert_eq!(map.get("hat").map(String::as_str), Some("blue-black!"));
    }

    #[test]
    fn test_overwrite_keeps_length() {
        let mut map = fixture_map();
        map.set("hat".to_string(), "blue-black".to_string());
        assert_eq!(map.get("hat").map(String::as_str), Some("blue-black"));
        assert_eq!(map.len(), 12);
    }

    #[test]
    fn test_growth_at_thirteenth_key() {
        let mut map = fixture_map();
        assert_eq!(map.len(), 12);
        assert_eq!(map.capacity(), 16);

        map.set("moon".to_string(), "silver".to_string());
        assert_eq!(map.len(), 13);
        assert_eq!(map.capacity(), 32);

        for (key, value) in FIXTURE {
            assert_eq!(map.get(key).map(String::as_str), Some(value));
        }
        assert_eq!(map.get("moon").map(String::as_str), Some("silver"));
        assert_well_formed(&map);
    }

    #[test]
    fn test_smoke_scenario() {
        let mut map = fixture_map();
        map.set("ice cream".to_string(), "whitish-cream".to_string());
        map.set("hat".to_string(), "blue-black".to_string());
        map.set("frog".to_string(), "dark-green".to_string());
        map.set("moon".to_string(), "silver".to_string());
        map.set("apple".to_string(), "light-green".to_string());
        map.set("dog".to_string(), "black and white".to_string());
        map.set("jacket".to_string(), "blue and white".to_string());

        assert_eq!(map.len(), 13);
        assert_eq!(map.get("dog").map(String::as_str), Some("black and white"));
        assert!(map.remove("moon"));
        assert_eq!(map.len(), 12);
        assert_eq!(map.capacity(), 32);
        assert_well_formed(&map);
    }

    #[test]
    fn test_remove_cases() {
        let (a, q, a2) = colliding_keys();
        let mut map = ChainedHashMap::new();
        map.set(a.clone(), 1);
        map.set(q.clone(), 2);
        map.set(a2.clone(), 3);
        assert_eq!(map.chain_lengths().get(1), Some(&3));

        // middle
        assert!(map.remove(&q));
        assert_eq!(map.keys(), vec![&a, &a2]);
        assert_well_formed(&map);

        // tail
        assert!(map.remove(&a2));
        assert_eq!(map.keys(), vec![&a]);

        // solitary head
        assert!(map.remove(&a));
        assert_eq!(map.chain_lengths().get(1), Some(&0));
        assert!(map.is_empty());
        assert!(!map.remove(&a));
    }

    #[test]
    fn test_remove_head_promotes_successor() {
        let (a, q, a2) = colliding_keys();
        let mut map = ChainedHashMap::new();
        map.set(a.clone(), 1);
        map.set(q.clone(), 2);
        map.set(a2.clone(), 3);

        assert_eq!(map.take(&a), Some(1));
        assert_eq!(map.keys(), vec![&q, &a2]);
        assert_eq!(map.get(&q), Some(&2));
        assert_eq!(map.get(&a2), Some(&3));
        assert_well_formed(&map);
    }

    #[test]
    fn test_get_head_mismatch_without_successor() {
        let (a, q, _) = colliding_keys();
        let mut map = ChainedHashMap::new();
        map.set(a, 1);

        // same bucket as "a", which is a solitary head
        assert_eq!(map.get(&q), None);
        assert!(!map.has(&q));
        assert_eq!(map.get_mut(&q), None);
        assert_eq!(map.get("a"), Some(&1));
    }

    #[test]
    fn test_remove_absent() {
        let (a, q, _) = colliding_keys();
        let mut map = ChainedHashMap::new();
        assert!(!map.remove("nothing"));

        map.set(a, 1);
        // same bucket, head does not match, no successor
        assert!(!map.remove(&q));
        map.set(q, 2);
        // same bucket, walked to the end
        assert!(!map.remove("A2"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_case_variants_are_distinct_keys() {
        let mut map = ChainedHashMap::new();
        map.set("Apple".to_string(), 1);
        map.set("apple".to_string(), 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Apple"), Some(&1));
        assert_eq!(map.get("apple"), Some(&2));
        assert_eq!(map.get("APPLE"), None);
        assert_eq!(map.chain_lengths().iter().filter(|&&len| len == 2).count(), 1);
        assert_eq!(map.memo_len(), 1);
    }

    #[test]
    fn test_absent_key_is_distinct_from_empty_string() {
        let mut map: ChainedHashMap<Option<&str>, i32> = ChainedHashMap::new();
        map.set(None, 1);
        map.set(Some(""), 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&None::<&str>), Some(&1));
        assert_eq!(map.get(&Some("")), Some(&2));
        assert_eq!(map.chain_lengths().first(), Some(&2));
    }

    #[test]
    fn test_non_string_keys() {
        let mut map = ChainedHashMap::new();
        for i in 0..40u32 {
            map.set(i, i * 10);
        }
        assert_eq!(map.len(), 40);
        assert_eq!(map.capacity(), 64);
        assert_eq!(map.get(&7), Some(&70));
        assert!(map.remove(&7));
        assert!(!map.has(&7));
    }

    #[test]
    fn test_signed_zero_keys_are_one_entry() {
        let mut map = ChainedHashMap::new();
        map.set(-0.0f64, 1);
        assert_eq!(map.get(&0.0f64), Some(&1));

        map.set(0.0f64, 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&-0.0f64), Some(&2));
        assert!(map.remove(&0.0f64));
        assert!(map.is_empty());
    }

    #[test]
    fn test_enumeration_order() {
        let (a, q, a2) = colliding_keys();
        let mut map = ChainedHashMap::new();
        // "b" = 98 % 16 = 2, "" = 0
        map.set("b".to_string(), 4);
        map.set(a.clone(), 1);
        map.set(q.clone(), 2);
        map.set(a2.clone(), 3);
        map.set(String::new(), 0);

        let keys: Vec<&str> = map.keys().into_iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["", "a", "q", "A2", "b"]);
        assert_eq!(map.values(), vec![&0, &1, &2, &3, &4]);
        assert_eq!(map.entries().first(), Some(&(&String::new(), &0)));
        assert_eq!(map.iter().count(), 5);
    }

    #[test]
    fn test_set_load_factor() {
        let mut map: ChainedHashMap<String, i32> = ChainedHashMap::new();
        assert_eq!(map.set_load_factor(0.0), Err(ConfigError::InvalidLoadFactor(0.0)));
        assert_eq!(map.set_load_factor(1.0), Err(ConfigError::InvalidLoadFactor(1.0)));
        assert!(map.set_load_factor(f64::NAN).is_err());
        assert_eq!(map.load_factor(), 0.75);

        assert_eq!(map.set_load_factor(0.5), Ok(()));
        assert_eq!(map.load_factor(), 0.5);
    }

    #[test]
    fn test_lower_load_factor_is_not_retroactive() {
        let mut map = fixture_map();
        map.set_load_factor(0.25).unwrap();
        assert_eq!(map.capacity(), 16);

        // 13 / 16 > 0.25 on the next set
        map.set("moon".to_string(), "silver".to_string());
        assert_eq!(map.capacity(), 32);
    }

    #[test]
    fn test_clear_keeps_capacity_and_memo() {
        let mut map = fixture_map();
        map.set("moon".to_string(), "silver".to_string());
        let memoized = map.memo_len();

        let fresh = map.clear();
        assert_eq!(fresh.len(), 32);
        assert!(map.buckets().all(|chain| chain.is_none()));

        assert!(map.is_empty());
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.memo_len(), memoized);
        assert_eq!(map.get("apple"), None);

        map.set("apple".to_string(), "green".to_string());
        assert_eq!(map.get("apple").map(String::as_str), Some("green"));
    }

    #[test]
    fn test_preserve_slots_keeps_memoized_bucket() {
        let mut map = MapConfig::new().initial_capacity(16).build::<String, i32>().unwrap();
        // 'z' = 122 -> 10 under 16 buckets, 26 under 32
        map.set("z".to_string(), 0);
        for i in 0..12 {
            map.set(format!("k{i}"), i);
        }
        assert_eq!(map.capacity(), 32);

        let chains = map.buckets().collect::<Vec<_>>();
        let bucket_10: Vec<&String> =
            chains.get(10).cloned().flatten().into_iter().flatten().map(|(k, _)| k).collect();
        assert!(bucket_10.contains(&&"z".to_string()));
        assert_eq!(map.get("z"), Some(&0));
    }

    #[test]
    fn test_rehash_policy_relocates_entries() {
        let mut map =
            MapConfig::new().resize_policy(ResizePolicy::Rehash).build::<String, i32>().unwrap();
        map.set("z".to_string(), 0);
        for i in 0..12 {
            map.set(format!("k{i}"), i);
        }
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.resize_policy(), ResizePolicy::Rehash);

        let chains: Vec<Vec<&String>> = map
            .buckets()
            .map(|chain| chain.into_iter().flatten().map(|(k, _)| k).collect())
            .collect();
        assert!(chains.get(26).is_some_and(|keys| keys.contains(&&"z".to_string())));

        // every key sits where a fresh hash under the new capacity puts it
        let hasher = SlotHasher::new();
        for (slot, keys) in chains.iter().enumerate() {
            for key in keys {
                assert_eq!(hasher.slot(key.as_str(), 32), slot);
            }
        }
        for i in 0..12 {
            assert_eq!(map.get(&format!("k{i}")), Some(&i));
        }
        assert_well_formed(&map);
    }

    #[test]
    fn test_free_list_reuse() {
        let mut map = ChainedHashMap::new();
        map.set("a".to_string(), 1);
        map.set("b".to_string(), 2);
        assert!(map.remove("a"));
        map.set("c".to_string(), 3);
        assert_eq!(map.arena.node(0).map(|node| node.key.as_str()), Some("c"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_get_mut_and_debug() {
        let mut map = ChainedHashMap::new();
        map.set("key1".to_string(), 1);
        if let Some(value) = map.get_mut("key1") {
            *value += 10;
        }
        assert_eq!(map.get_key_value("key1"), Some((&"key1".to_string(), &11)));
        assert_eq!(format!("{map:?}"), r#"{"key1": 11}"#);
    }

    #[test]
    fn test_with_capacity_and_into_iter() {
        let mut map = ChainedHashMap::with_capacity(0);
        assert_eq!(map.capacity(), 1);
        map.set('x', 1);
        assert_eq!(map.capacity(), 2);
        let mut sum = 0;
        for (_, value) in &map {
            sum += value;
        }
        assert_eq!(sum, 1);
    }
}
