//! Indexer: a KeyIndex paired with the selector that derives its keys.
//!
//! Element-level operations (add, remove by derived key, containment) sit here;
//! `KeyIndex` only ever sees keys and slots. `ErasedIndexer` is the object-safe
//! view the list uses to drive secondary indexes of arbitrary key types.

use crate::error::{HashListError, HashListResult};
use crate::key_index::KeyIndex;
use core::any::{Any, TypeId};
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use slotmap::{DefaultKey, SlotMap};

pub(crate) struct Indexer<T, K, F, S> {
    select: F,
    index: KeyIndex<K, S>,
    _pd: PhantomData<fn(&T)>,
}

impl<T, K, F, S> Indexer<T, K, F, S>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn new(select: F, index: KeyIndex<K, S>) -> Self {
        Self {
            select,
            index,
            _pd: PhantomData,
        }
    }

    /// Index every element of `order` in one pass. Fails on the first
    /// collision; the partially built index is dropped with the error.
    pub(crate) fn build(
        select: F,
        hasher: S,
        order: &[DefaultKey],
        slots: &SlotMap<DefaultKey, T>,
    ) -> HashListResult<Self> {
        let mut indexer = Self::new(
            select,
            KeyIndex::with_capacity_and_hasher(order.len(), hasher),
        );
        for (position, &slot) in order.iter().enumerate() {
            if !indexer.link(&slots[slot], slot) {
                return Err(HashListError::DuplicateKey { position });
            }
        }
        Ok(indexer)
    }

    #[inline]
    pub(crate) fn key_of(&self, value: &T) -> K {
        (self.select)(value)
    }

    pub(crate) fn index(&self) -> &KeyIndex<K, S> {
        &self.index
    }

    pub(crate) fn index_mut(&mut self) -> &mut KeyIndex<K, S> {
        &mut self.index
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    /// Would `value` fit, with `replacing` (if any) about to vacate its key?
    pub(crate) fn accepts(&self, value: &T, replacing: Option<DefaultKey>) -> bool {
        self.index.is_vacant(&self.key_of(value), replacing)
    }

    pub(crate) fn link(&mut self, value: &T, slot: DefaultKey) -> bool {
        let key = self.key_of(value);
        self.index.insert(key, slot).is_ok()
    }

    pub(crate) fn unlink(&mut self, slot: DefaultKey) -> bool {
        self.index.unlink(slot).is_some()
    }

    /// Slot stored under the key `value` derives to, whatever element that is.
    pub(crate) fn find_element(&self, value: &T) -> Option<DefaultKey> {
        self.index.find(&self.key_of(value))
    }

    /// `value` is reachable under its own key and the entry names `slot`.
    pub(crate) fn holds(&self, value: &T, slot: DefaultKey) -> bool {
        self.find_element(value) == Some(slot) && self.index.slot_key(slot).is_some()
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
    }
}

/// Object-safe view of an `Indexer` whose key type has been erased.
pub(crate) trait ErasedIndexer<T> {
    fn key_type(&self) -> TypeId;
    fn key_type_name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn accepts(&self, value: &T, replacing: Option<DefaultKey>) -> bool;
    fn link(&mut self, value: &T, slot: DefaultKey) -> bool;
    fn unlink(&mut self, slot: DefaultKey) -> bool;
    fn holds(&self, value: &T, slot: DefaultKey) -> bool;
    fn reserve(&mut self, additional: usize);
    fn clear(&mut self);
    /// The underlying `KeyIndex<K, S>`, for typed lookups.
    fn index_any(&self) -> &dyn Any;
}

impl<T, K, F, S> ErasedIndexer<T> for Indexer<T, K, F, S>
where
    F: Fn(&T) -> K,
    K: Eq + Hash + 'static,
    S: BuildHasher + 'static,
{
    fn key_type(&self) -> TypeId {
        TypeId::of::<K>()
    }
    fn key_type_name(&self) -> &'static str {
        core::any::type_name::<K>()
    }
    fn len(&self) -> usize {
        Indexer::len(self)
    }
    fn accepts(&self, value: &T, replacing: Option<DefaultKey>) -> bool {
        Indexer::accepts(self, value, replacing)
    }
    fn link(&mut self, value: &T, slot: DefaultKey) -> bool {
        Indexer::link(self, value, slot)
    }
    fn unlink(&mut self, slot: DefaultKey) -> bool {
        Indexer::unlink(self, slot)
    }
    fn holds(&self, value: &T, slot: DefaultKey) -> bool {
        Indexer::holds(self, value, slot)
    }
    fn reserve(&mut self, additional: usize) {
        Indexer::reserve(self, additional)
    }
    fn clear(&mut self) {
        Indexer::clear(self)
    }
    fn index_any(&self) -> &dyn Any {
        &self.index
    }
}
