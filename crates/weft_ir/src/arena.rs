//! Append-only arenas for ID-indexed storage of graph entities.
//!
//! Every entity in a [`Design`](crate::design::Design) lives in one of its
//! arenas and is referenced by an opaque ID. Entries are never removed and
//! never reordered, so IDs are stable; "deleted" entities (e.g. detached
//! edges) are left in place and marked incomplete instead.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for the opaque ID types used as arena keys.
pub trait Key: Copy {
    /// Creates a key from a raw index.
    fn from_index(index: u32) -> Self;

    /// Returns the raw index of this key.
    fn index(self) -> u32;
}

/// A dense, append-only container indexed by an opaque ID type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: Key, T> {
    entries: Vec<T>,
    #[serde(skip)]
    _key: PhantomData<I>,
}

impl<I: Key, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            _key: PhantomData,
        }
    }
}

impl<I: Key, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entry and returns its ID.
    pub fn alloc(&mut self, entry: T) -> I {
        let id = I::from_index(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    /// Returns the ID the next [`alloc`](Self::alloc) call will hand out.
    pub fn next_id(&self) -> I {
        I::from_index(self.entries.len() as u32)
    }

    /// Looks up an entry, returning `None` for an out-of-range ID.
    pub fn lookup(&self, id: I) -> Option<&T> {
        self.entries.get(id.index() as usize)
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the arena holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, entry)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (I::from_index(i as u32), e))
    }

    /// Iterates over all IDs in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.entries.len()).map(|i| I::from_index(i as u32))
    }

    /// Iterates over entry references in allocation order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<I: Key, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.entries[id.index() as usize]
    }
}

impl<I: Key, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.entries[id.index() as usize]
    }
}
