//! HashList: an ordered sequence kept in lockstep with its key indexes.
//!
//! Elements live in a `SlotMap` arena; the sequence is a `Vec` of slots and
//! every index maps keys to slots. A mutation first asks every index whether it
//! accepts the new keys, and only then touches the arena, the indexes and the
//! sequence, in that order. Removals unlink a slot from every index before it
//! leaves the sequence, and never call back into user code.

use crate::error::{HashListError, HashListResult};
use crate::indexer::{ErasedIndexer, Indexer};
use crate::key_index::KeyIndex;
use core::any::{type_name, Any, TypeId};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use slotmap::{DefaultKey, SecondaryMap, SlotMap};
use std::collections::hash_map::RandomState;

/// An ordered list with O(1) lookup by a derived key.
///
/// The key selector `F` must keep returning the same key for an element while
/// it is stored. Keys must be unique: adding or inserting an element whose key
/// is taken is refused and reported through the return value.
///
/// Further indexes over other key types can be attached with
/// [`create_indexer`](HashList::create_indexer); every mutation is then
/// checked against all of them before anything changes.
///
/// The list is `Send` when its parts are, but never `Sync`.
pub struct HashList<T, K, F, S = RandomState> {
    slots: SlotMap<DefaultKey, T>,
    order: Vec<DefaultKey>,
    primary: Indexer<T, K, F, S>,
    secondary: Vec<Box<dyn ErasedIndexer<T> + Send>>,
}

impl<T, K, F> HashList<T, K, F>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
{
    pub fn new(select: F) -> Self {
        Self::with_hasher(select, RandomState::new())
    }

    pub fn with_capacity(capacity: usize, select: F) -> Self {
        Self::with_capacity_and_hasher(capacity, select, RandomState::new())
    }

    /// Adopt `elements` in order. Fails without producing a list if two of
    /// them share a key.
    pub fn try_from_iter<I>(elements: I, select: F) -> HashListResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        Self::try_from_iter_with_hasher(elements, select, RandomState::new())
    }
}

impl<T, K, F, S> HashList<T, K, F, S> {
    pub fn len(&self) -> usize {
        self.order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.order.capacity()
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.order.get(position).map(|&slot| &self.slots[slot])
    }

    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&T> {
        self.order.last().map(|&slot| &self.slots[slot])
    }

    /// Elements in sequence order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            order: self.order.iter(),
            slots: &self.slots,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        let Self {
            mut slots, order, ..
        } = self;
        order
            .into_iter()
            .filter_map(|slot| slots.remove(slot))
            .collect()
    }

    /// Number of secondary indexers attached.
    pub fn indexer_count(&self) -> usize {
        self.secondary.len()
    }

    pub fn has_indexer<K2: 'static>(&self) -> bool {
        self.secondary
            .iter()
            .any(|ix| ix.key_type() == TypeId::of::<K2>())
    }

    /// Drop every secondary indexer; the primary key index stays.
    pub fn clear_indexers(&mut self) {
        if !self.secondary.is_empty() {
            log::debug!("dropping {} secondary indexers", self.secondary.len());
        }
        self.secondary.clear();
    }

    pub fn remove_indexer<K2: 'static>(&mut self) -> bool {
        match self
            .secondary
            .iter()
            .position(|ix| ix.key_type() == TypeId::of::<K2>())
        {
            Some(i) => {
                let ix = self.secondary.remove(i);
                log::debug!("removed indexer keyed by `{}`", ix.key_type_name());
                true
            }
            None => false,
        }
    }

    fn position_of(&self, slot: DefaultKey) -> Option<usize> {
        self.order.iter().position(|&s| s == slot)
    }
}

impl<T, K, F, S> HashList<T, K, F, S>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(select: F, hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, select, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, select: F, hasher: S) -> Self {
        Self {
            slots: SlotMap::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            primary: Indexer::new(
                select,
                KeyIndex::with_capacity_and_hasher(capacity, hasher),
            ),
            secondary: Vec::new(),
        }
    }

    pub fn try_from_iter_with_hasher<I>(elements: I, select: F, hasher: S) -> HashListResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let elements = elements.into_iter();
        let mut slots = SlotMap::with_capacity(elements.size_hint().0);
        let order: Vec<DefaultKey> = elements.map(|value| slots.insert(value)).collect();
        let primary = Indexer::build(select, hasher, &order, &slots).map_err(|e| {
            log::debug!("refusing to adopt {} elements: {}", order.len(), e);
            e
        })?;
        Ok(Self {
            slots,
            order,
            primary,
            secondary: Vec::new(),
        })
    }

    /// Key the primary selector derives for `value`.
    pub fn key_of(&self, value: &T) -> K {
        self.primary.key_of(value)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.order.reserve(additional);
        self.slots.reserve(additional);
        self.primary.reserve(additional);
        for ix in &mut self.secondary {
            ix.reserve(additional);
        }
    }

    pub fn shrink_to_fit(&mut self) {
        self.order.shrink_to_fit();
    }

    pub fn get_by_key<Q>(&self, key: &Q) -> Option<&T>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.primary.index().find(key)?;
        self.slots.get(slot)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.primary.index().contains_key(key)
    }

    /// True if `value`'s key is present and the element stored under it
    /// equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.primary
            .find_element(value)
            .is_some_and(|slot| self.slots[slot] == *value)
    }

    /// Position of the stored element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let slot = self.primary.find_element(value)?;
        if self.slots[slot] != *value {
            return None;
        }
        self.position_of(slot)
    }

    /// Append `value`. Returns `false`, leaving the list untouched, if any
    /// index already holds one of its keys.
    pub fn add(&mut self, value: T) -> bool {
        self.insert_unchecked(self.len(), value)
    }

    /// Add each element in turn, skipping those whose keys are taken. Returns
    /// whether every element was added.
    pub fn add_range<I>(&mut self, elements: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let elements = elements.into_iter();
        self.reserve(elements.size_hint().0);
        elements.fold(true, |all, value| self.add(value) & all)
    }

    /// Insert `value` at `position` (`len()` appends). `Ok(false)` when a key
    /// is taken.
    pub fn insert(&mut self, position: usize, value: T) -> HashListResult<bool> {
        self.check_insert_position(position)?;
        Ok(self.insert_unchecked(position, value))
    }

    /// Insert elements one by one starting at `position`. Refused elements are
    /// skipped without advancing the cursor, so accepted ones stay contiguous
    /// and in input order.
    pub fn insert_range<I>(&mut self, position: usize, elements: I) -> HashListResult<bool>
    where
        I: IntoIterator<Item = T>,
    {
        self.check_insert_position(position)?;
        let mut cursor = position;
        let mut all = true;
        for value in elements {
            if self.insert_unchecked(cursor, value) {
                cursor += 1;
            } else {
                all = false;
            }
        }
        Ok(all)
    }

    /// Overwrite the element at `position`, returning the old one. The old
    /// element's keys are released before the new ones are taken, so the new
    /// value may reuse them. `Ok(None)` when a key belongs to another element.
    pub fn replace(&mut self, position: usize, value: T) -> HashListResult<Option<T>> {
        let slot = self.slot_at(position)?;
        let key = self.primary.key_of(&value);
        if !self.admits(&value, &key, Some(slot)) {
            return Ok(None);
        }
        self.unlink(slot);
        let old = core::mem::replace(&mut self.slots[slot], value);
        self.link(slot, key);
        Ok(Some(old))
    }

    /// Remove whatever element is stored under `value`'s key. That element may
    /// differ from `value` in every other respect; it is the one returned.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let key = self.primary.key_of(value);
        self.remove_key(&key)
    }

    pub fn remove_key<Q>(&mut self, key: &Q) -> Option<T>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (_, slot) = self.primary.index_mut().remove(key)?;
        for ix in &mut self.secondary {
            ix.unlink(slot);
        }
        if let Some(position) = self.position_of(slot) {
            self.order.remove(position);
        }
        self.slots.remove(slot)
    }

    pub fn remove_at(&mut self, position: usize) -> HashListResult<T> {
        let slot = self.slot_at(position)?;
        self.unlink(slot);
        self.order.remove(position);
        Ok(self
            .slots
            .remove(slot)
            .expect("slot in the sequence must be live"))
    }

    /// Remove `count` elements starting at `start`. Nothing changes when the
    /// range does not fit.
    pub fn remove_range(&mut self, start: usize, count: usize) -> HashListResult<()> {
        let len = self.len();
        let end = match start.checked_add(count) {
            Some(end) if end <= len => end,
            _ => return Err(HashListError::RangeOutOfRange { start, count, len }),
        };
        for position in (start..end).rev() {
            let slot = self.order[position];
            self.unlink(slot);
        }
        for slot in self.order.drain(start..end) {
            self.slots.remove(slot);
        }
        log::trace!("removed range {start}..{end}");
        Ok(())
    }

    /// Remove every element matching `predicate`, keeping the rest in order.
    /// The predicate sees each element exactly once, in sequence order, before
    /// anything is removed. Returns how many were removed.
    pub fn remove_all<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let slots = &self.slots;
        let doomed: Vec<DefaultKey> = self
            .order
            .iter()
            .copied()
            .filter(|&slot| predicate(&slots[slot]))
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        for &slot in &doomed {
            self.unlink(slot);
            self.slots.remove(slot);
        }
        let slots = &self.slots;
        self.order.retain(|&slot| slots.contains_key(slot));
        log::trace!("removed {} matching elements", doomed.len());
        doomed.len()
    }

    /// Empty the sequence and every index. Secondary indexers stay attached.
    pub fn clear(&mut self) {
        self.order.clear();
        self.slots.clear();
        self.primary.clear();
        for ix in &mut self.secondary {
            ix.clear();
        }
    }

    /// Check that the sequence and every index agree: equal sizes, and each
    /// element reachable under its own recomputed key. For tests and debugging.
    pub fn is_valid(&self) -> bool {
        let len = self.order.len();
        if self.slots.len() != len
            || self.primary.len() != len
            || self.secondary.iter().any(|ix| ix.len() != len)
        {
            return false;
        }
        let mut seen = SecondaryMap::with_capacity(len);
        self.order.iter().all(|&slot| {
            let Some(value) = self.slots.get(slot) else {
                return false;
            };
            seen.insert(slot, ()).is_none()
                && self.primary.holds(value, slot)
                && self.secondary.iter().all(|ix| ix.holds(value, slot))
        })
    }

    fn check_insert_position(&self, position: usize) -> HashListResult<()> {
        let len = self.len();
        if position > len {
            return Err(HashListError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        Ok(())
    }

    fn slot_at(&self, position: usize) -> HashListResult<DefaultKey> {
        self.order
            .get(position)
            .copied()
            .ok_or(HashListError::IndexOutOfRange {
                index: position,
                len: self.len(),
            })
    }

    /// Would every index take `value`? `replacing` is a slot about to give up
    /// its keys.
    fn admits(&self, value: &T, key: &K, replacing: Option<DefaultKey>) -> bool {
        self.primary.index().is_vacant(key, replacing)
            && self.secondary.iter().all(|ix| ix.accepts(value, replacing))
    }

    fn insert_unchecked(&mut self, position: usize, value: T) -> bool {
        let key = self.primary.key_of(&value);
        if !self.admits(&value, &key, None) {
            return false;
        }
        let slot = self.slots.insert(value);
        self.link(slot, key);
        self.order.insert(position, slot);
        true
    }

    // Only called after `admits` approved the value stored at `slot`.
    fn link(&mut self, slot: DefaultKey, key: K) {
        let value = &self.slots[slot];
        let linked = self.primary.index_mut().insert(key, slot).is_ok();
        debug_assert!(linked, "primary index refused an admitted key");
        for ix in &mut self.secondary {
            let linked = ix.link(value, slot);
            debug_assert!(linked, "secondary index refused an admitted key");
        }
    }

    fn unlink(&mut self, slot: DefaultKey) {
        let unlinked = self.primary.unlink(slot);
        debug_assert!(unlinked, "stored slot missing from primary index");
        for ix in &mut self.secondary {
            ix.unlink(slot);
        }
    }

    fn remove_slot(&mut self, slot: DefaultKey) -> Option<T> {
        let position = self.position_of(slot)?;
        self.unlink(slot);
        self.order.remove(position);
        self.slots.remove(slot)
    }
}

impl<T, K, F, S> HashList<T, K, F, S>
where
    T: 'static,
    F: Fn(&T) -> K,
    K: Eq + Hash + 'static,
    S: BuildHasher + Clone + 'static,
{
    /// Attach an index over keys of type `K2`, built from the current
    /// contents. Fails with `DuplicateIndexer` if `K2` is already indexed
    /// (the primary key type included) and with `DuplicateKey` if two stored
    /// elements share a `K2` key; in both cases nothing is attached.
    pub fn create_indexer<K2, F2>(&mut self, select: F2) -> HashListResult<()>
    where
        K2: Eq + Hash + Send + 'static,
        F2: Fn(&T) -> K2 + Send + 'static,
        S: Send,
    {
        if TypeId::of::<K2>() == TypeId::of::<K>() || self.has_indexer::<K2>() {
            return Err(HashListError::DuplicateIndexer {
                key_type: type_name::<K2>(),
            });
        }
        let hasher = self.primary.index().hasher().clone();
        let indexer = Indexer::build(select, hasher, &self.order, &self.slots).map_err(|e| {
            log::debug!("refusing indexer keyed by `{}`: {}", type_name::<K2>(), e);
            e
        })?;
        log::debug!("created indexer keyed by `{}`", type_name::<K2>());
        self.secondary.push(Box::new(indexer));
        Ok(())
    }

    /// Element stored under `key` in the index over `K2`, the primary
    /// included. `None` if no such index exists or the key is absent.
    pub fn get_by<K2>(&self, key: &K2) -> Option<&T>
    where
        K2: Eq + Hash + 'static,
    {
        let slot = self.key_index::<K2>()?.find(key)?;
        self.slots.get(slot)
    }

    pub fn remove_by<K2>(&mut self, key: &K2) -> Option<T>
    where
        K2: Eq + Hash + 'static,
    {
        let slot = self.key_index::<K2>()?.find(key)?;
        self.remove_slot(slot)
    }

    fn key_index<K2: 'static>(&self) -> Option<&KeyIndex<K2, S>> {
        let primary: &dyn Any = self.primary.index();
        primary.downcast_ref().or_else(|| {
            self.secondary
                .iter()
                .find_map(|ix| ix.index_any().downcast_ref())
        })
    }
}

impl<T, K, F, S> Index<usize> for HashList<T, K, F, S> {
    type Output = T;

    /// Panics if `position >= len()`.
    fn index(&self, position: usize) -> &T {
        &self.slots[self.order[position]]
    }
}

impl<T, K, F, S> Extend<T> for HashList<T, K, F, S>
where
    F: Fn(&T) -> K,
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Elements whose keys are taken are skipped.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<T: fmt::Debug, K, F, S> fmt::Debug for HashList<T, K, F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Iterator over the elements of a `HashList` in sequence order.
pub struct Iter<'a, T> {
    order: core::slice::Iter<'a, DefaultKey>,
    slots: &'a SlotMap<DefaultKey, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            order: self.order.clone(),
            slots: self.slots,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.order.next().map(move |&slot| &slots[slot])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        self.order.next_back().map(move |&slot| &slots[slot])
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T, K, F, S> IntoIterator for &'a HashList<T, K, F, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, K, F, S> IntoIterator for HashList<T, K, F, S> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}
