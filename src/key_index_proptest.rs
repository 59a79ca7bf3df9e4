#![cfg(test)]

// Property tests for KeyIndex kept inside the crate so they do not need the
// bench_internal feature to reach the module.

use crate::key_index::{InsertError, KeyIndex};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use slotmap::{DefaultKey, SlotMap};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
    Unlink(usize),
    Find(usize),
    Contains(String),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Insert),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Unlink),
            2 => idx.clone().prop_map(Op::Find),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against HashMap<Key, slot>:
// - Duplicate keys are rejected; a rejected slot is never linked.
// - `find`/`contains_key` parity with the model.
// - `remove(key)` and `unlink(slot)` agree with the model and forget the slot.
// - `slot_key` names the key each live slot was linked under.
// - `iter` yields each live entry exactly once.
fn run_scenario<S: BuildHasher>(
    mut sut: KeyIndex<Key, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut arena: SlotMap<DefaultKey, ()> = SlotMap::new();
    let mut model: HashMap<Key, DefaultKey> = HashMap::new();
    let mut dead: Vec<DefaultKey> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(i) => {
                let k = key_from(&pool, i);
                let slot = arena.insert(());
                match sut.insert(k.clone(), slot) {
                    Ok(()) => {
                        prop_assert!(!model.contains_key(&k), "insert must fail on duplicate");
                        model.insert(k, slot);
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(model.contains_key(&k), "duplicate only when key exists");
                        prop_assert!(sut.slot_key(slot).is_none());
                        dead.push(slot);
                    }
                }
            }
            Op::Remove(i) => {
                let k = key_from(&pool, i);
                let removed = sut.remove(&k);
                match model.remove(&k) {
                    Some(slot) => {
                        prop_assert_eq!(removed, Some((k, slot)));
                        dead.push(slot);
                    }
                    None => prop_assert!(removed.is_none()),
                }
            }
            Op::Unlink(i) => {
                let k = key_from(&pool, i);
                if let Some(slot) = model.remove(&k) {
                    prop_assert_eq!(sut.unlink(slot), Some(k));
                    prop_assert_eq!(sut.unlink(slot), None);
                    dead.push(slot);
                } else {
                    prop_assert!(sut.find(&k).is_none());
                }
            }
            Op::Find(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.find(&k), model.get(&k).copied());
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Iterate => {
                let seen: BTreeSet<_> = sut.iter().map(|(k, slot)| (k.clone(), slot)).collect();
                let expected: BTreeSet<_> = model.iter().map(|(k, &slot)| (k.clone(), slot)).collect();
                prop_assert_eq!(seen.len(), sut.len());
                prop_assert_eq!(seen, expected);
            }
            Op::Clear => {
                sut.clear();
                dead.extend(model.drain().map(|(_, slot)| slot));
            }
        }

        // Post-conditions after each op
        for &slot in &dead {
            prop_assert!(sut.slot_key(slot).is_none());
        }
        for (k, &slot) in &model {
            prop_assert_eq!(sut.slot_key(slot), Some(k));
        }
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(KeyIndex::new(), pool, ops)?;
    }
}

// Collision variant: a constant hasher forces every key into one probe
// sequence, stressing equality resolution and slot-based unlinking.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(KeyIndex::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
