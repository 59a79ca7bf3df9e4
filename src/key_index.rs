//! KeyIndex: unique key -> slot map with a debug reentrancy guard.
//!
//! Entries carry their precomputed hash. Besides the key table the index keeps
//! a slot -> hash side map, so an entry can be unlinked knowing only its slot:
//! unlinking never calls `K: Hash`/`K: Eq`.

use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SecondaryMap};
use std::collections::hash_map::RandomState;

#[derive(Debug)]
struct Entry<K> {
    key: K,
    hash: u64,
    slot: DefaultKey,
}

pub struct KeyIndex<K, S = RandomState> {
    hasher: S,
    table: HashTable<Entry<K>>,
    hashes: SecondaryMap<DefaultKey, u64>, // slot -> hash it was linked under
    reentrancy: DebugReentrancy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
}

impl<K> KeyIndex<K>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K> Default for KeyIndex<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> KeyIndex<K, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            table: HashTable::with_capacity(capacity),
            hashes: SecondaryMap::with_capacity(capacity),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Slot currently stored under `q`.
    pub fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.table
            .find(hash, |e| e.key.borrow() == q)
            .map(|e| e.slot)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    /// True when `key` is free, or already belongs to `slot` (which is about
    /// to be replaced) if one is given.
    pub fn is_vacant(&self, key: &K, replacing: Option<DefaultKey>) -> bool {
        match self.find(key) {
            None => true,
            Some(taken) => Some(taken) == replacing,
        }
    }

    pub fn insert(&mut self, key: K, slot: DefaultKey) -> Result<(), InsertError> {
        let _g = self.reentrancy.enter();
        debug_assert!(
            !self.hashes.contains_key(slot),
            "slot linked twice into one index"
        );
        let hash = self.make_hash(&key);
        match self
            .table
            .entry(hash, |e| e.key == key, |e| e.hash)
        {
            hashbrown::hash_table::Entry::Occupied(_) => Err(InsertError::DuplicateKey),
            hashbrown::hash_table::Entry::Vacant(v) => {
                v.insert(Entry { key, hash, slot });
                self.hashes.insert(slot, hash);
                Ok(())
            }
        }
    }

    /// Remove the entry stored under `q`, returning its key and slot.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<(K, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let (entry, _) = self
            .table
            .find_entry(hash, |e| e.key.borrow() == q)
            .ok()?
            .remove();
        self.hashes.remove(entry.slot);
        Some((entry.key, entry.slot))
    }

    /// Remove the entry pointing at `slot`, returning its key. Runs no user code.
    pub fn unlink(&mut self, slot: DefaultKey) -> Option<K> {
        let _g = self.reentrancy.enter();
        let hash = self.hashes.remove(slot)?;
        let (entry, _) = self
            .table
            .find_entry(hash, |e| e.slot == slot)
            .ok()?
            .remove();
        Some(entry.key)
    }

    /// Key remembered for `slot`.
    pub fn slot_key(&self, slot: DefaultKey) -> Option<&K> {
        let _g = self.reentrancy.enter();
        let hash = *self.hashes.get(slot)?;
        self.table.find(hash, |e| e.slot == slot).map(|e| &e.key)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional, |e| e.hash);
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.hashes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, DefaultKey)> + '_ {
        self.table.iter().map(|e| (&e.key, e.slot))
    }
}
