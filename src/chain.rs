//! Storage for collision chains.
//!
//! Every entry of a `ChainedHashMap` lives in one [`Arena`] and is addressed by its index.
//! A chain is a doubly-linked list threaded through the arena with `prev`/`next` indices,
//! so unlinking a node from the middle of a chain is O(1) and no node owns another.
//! Vacated indices are kept on a free list and handed out again before the arena grows.

use std::mem;

/// One key-value pair and its links within a chain
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    /// The key as it was inserted
    pub(crate) key: K,
    /// The value associated with the key
    pub(crate) value: V,
    /// Previous node in the chain; `None` for the chain head
    pub(crate) prev: Option<usize>,
    /// Next node in the chain; `None` for the tail
    pub(crate) next: Option<usize>,
}

/// A position in the arena
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Holds a live node
    Occupied(Node<K, V>),
    /// Free; links to the next free position
    Vacant {
        /// Next entry of the free list
        next_free: Option<usize>,
    },
}

/// Index-addressed node storage shared by all chains of a table
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, V> {
    /// Node storage, including vacated positions
    slots: Vec<Slot<K, V>>,
    /// Most recently vacated position
    free: Option<usize>,
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self { slots: Vec::new(), free: None }
    }
}

impl<K, V> Arena<K, V> {
    /// Stores an unlinked node and returns its index, reusing a vacated position if any
    pub(crate) fn alloc(&mut self, key: K, value: V) -> usize {
        let node = Node { key, value, prev: None, next: None };

        if let Some(index) = self.free {
            if let Some(slot) = self.slots.get_mut(index) {
                if let Slot::Vacant { next_free } = *slot {
                    self.free = next_free;
                    *slot = Slot::Occupied(node);
                    return index;
                }
            }
        }

        self.slots.push(Slot::Occupied(node));
        self.slots.len().saturating_sub(1)
    }

    /// Removes the node at `index` and puts the position on the free list.
    ///
    /// The node's neighbours are not touched; unlink it first.
    pub(crate) fn release(&mut self, index: usize) -> Option<Node<K, V>> {
        let slot = self.slots.get_mut(index)?;
        match mem::replace(slot, Slot::Vacant { next_free: self.free }) {
            Slot::Occupied(node) => {
                self.free = Some(index);
                Some(node)
            }
            vacant @ Slot::Vacant { .. } => {
                *slot = vacant;
                None
            }
        }
    }

    /// Drops every node
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
    }

    /// The live node at `index`
    pub(crate) fn node(&self, index: usize) -> Option<&Node<K, V>> {
        match self.slots.get(index) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// The live node at `index`, mutably
    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut Node<K, V>> {
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Clears both links of the node at `index` without touching its neighbours
    pub(crate) fn detach(&mut self, index: usize) {
        if let Some(node) = self.node_mut(index) {
            node.prev = None;
            node.next = None;
        }
    }

    /// Makes the node at `index` a chain head by clearing its back link
    pub(crate) fn make_head(&mut self, index: usize) {
        if let Some(node) = self.node_mut(index) {
            node.prev = None;
        }
    }

    /// Appends the unlinked node `index` after `tail`
    pub(crate) fn link_after(&mut self, tail: usize, index: usize) {
        if let Some(node) = self.node_mut(tail) {
            node.next = Some(index);
        }
        if let Some(node) = self.node_mut(index) {
            node.prev = Some(tail);
        }
    }

    /// Splices the node at `index` out of its chain, joining its neighbours to each other.
    ///
    /// Returns the former `(prev, next)` links. The caller is responsible for the bucket slot
    /// when the node was a head.
    pub(crate) fn unlink(&mut self, index: usize) -> (Option<usize>, Option<usize>) {
        let Some(node) = self.node_mut(index) else {
            return (None, None);
        };
        let links = (node.prev.take(), node.next.take());
        let (prev, next) = links;

        if let Some(prev) = prev {
            if let Some(node) = self.node_mut(prev) {
                node.next = next;
            }
        }
        if let Some(next) = next {
            if let Some(node) = self.node_mut(next) {
                node.prev = prev;
            }
        }

        links
    }

    /// Walks the chain starting at `head` (inclusive) and returns the first node for which
    /// `stop` holds.
    pub(crate) fn find<F>(&self, head: usize, mut stop: F) -> Option<usize>
    where
        F: FnMut(&Node<K, V>) -> bool,
    {
        let mut cursor = Some(head);
        while let Some(index) = cursor {
            let node = self.node(index)?;
            if stop(node) {
                return Some(index);
            }
            cursor = node.next;
        }
        None
    }

    /// Iterates the chain starting at `head`
    pub(crate) fn chain(&self, head: usize) -> Chain<'_, K, V> {
        Chain { arena: self, cursor: Some(head) }
    }
}

/// The entries of one bucket, head to tail
#[derive(Debug, Clone)]
pub struct Chain<'a, K, V> {
    /// Storage the chain is threaded through
    arena: &'a Arena<K, V>,
    /// Next node to yield
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.node(self.cursor?)?;
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}
