// HashList property tests.
//
// Model: a plain Vec of items, where an item is accepted only if no stored
// item shares its primary key (`key`) or, when the secondary indexer is
// attached, its tag. Keys and tags come from small ranges so collisions are
// frequent.
//
// After every operation:
// - the list equals the model element for element, in order;
// - `is_valid()` holds;
// - every model item is reachable by key (and by tag when indexed).
use hash_list::{HashList, HashListError};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Item {
    key: u8,
    tag: u16,
}

type Items = HashList<Item, u8, fn(&Item) -> u8>;

fn by_key(item: &Item) -> u8 {
    item.key
}

#[derive(Clone, Debug)]
enum Op {
    Add(Item),
    AddRange(Vec<Item>),
    Insert(usize, Item),
    InsertRange(usize, Vec<Item>),
    Remove(Item),
    RemoveKey(u8),
    RemoveAt(usize),
    RemoveRange(usize, usize),
    RemoveAllKeyMod(u8),
    Replace(usize, Item),
    Clear,
}

fn arb_item() -> impl Strategy<Value = Item> {
    (0u8..12, 0u16..12).prop_map(|(key, tag)| Item { key, tag })
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => arb_item().prop_map(Op::Add),
        2 => proptest::collection::vec(arb_item(), 0..4).prop_map(Op::AddRange),
        3 => (0usize..16, arb_item()).prop_map(|(p, i)| Op::Insert(p, i)),
        2 => (0usize..16, proptest::collection::vec(arb_item(), 0..4))
            .prop_map(|(p, v)| Op::InsertRange(p, v)),
        2 => arb_item().prop_map(Op::Remove),
        2 => (0u8..12).prop_map(Op::RemoveKey),
        2 => (0usize..16).prop_map(Op::RemoveAt),
        1 => (0usize..16, 0usize..6).prop_map(|(s, c)| Op::RemoveRange(s, c)),
        1 => (2u8..5).prop_map(Op::RemoveAllKeyMod),
        2 => (0usize..16, arb_item()).prop_map(|(p, i)| Op::Replace(p, i)),
        1 => Just(Op::Clear),
    ]
}

struct Model {
    items: Vec<Item>,
    tags_indexed: bool,
}

impl Model {
    fn admits(&self, item: &Item, skip: Option<usize>) -> bool {
        self.items.iter().enumerate().all(|(i, other)| {
            Some(i) == skip || (other.key != item.key && !(self.tags_indexed && other.tag == item.tag))
        })
    }

    fn insert(&mut self, position: usize, item: Item) -> bool {
        let ok = self.admits(&item, None);
        if ok {
            self.items.insert(position, item);
        }
        ok
    }
}

fn apply(sut: &mut Items, model: &mut Model, op: Op) -> Result<(), TestCaseError> {
    let len = model.items.len();
    match op {
        Op::Add(item) => {
            let expected = model.insert(len, item);
            prop_assert_eq!(sut.add(item), expected);
        }
        Op::AddRange(items) => {
            let mut all = true;
            for item in items.iter().copied() {
                let at = model.items.len();
                all &= model.insert(at, item);
            }
            prop_assert_eq!(sut.add_range(items), all);
        }
        Op::Insert(position, item) => {
            if position > len {
                prop_assert_eq!(
                    sut.insert(position, item),
                    Err(HashListError::IndexOutOfRange { index: position, len })
                );
            } else {
                let expected = model.insert(position, item);
                prop_assert_eq!(sut.insert(position, item), Ok(expected));
            }
        }
        Op::InsertRange(position, items) => {
            if position > len {
                prop_assert!(sut.insert_range(position, items).is_err());
            } else {
                let mut cursor = position;
                let mut all = true;
                for item in items.iter().copied() {
                    if model.insert(cursor, item) {
                        cursor += 1;
                    } else {
                        all = false;
                    }
                }
                prop_assert_eq!(sut.insert_range(position, items), Ok(all));
            }
        }
        Op::Remove(probe) => {
            let expected = model
                .items
                .iter()
                .position(|i| i.key == probe.key)
                .map(|p| model.items.remove(p));
            prop_assert_eq!(sut.remove(&probe), expected);
        }
        Op::RemoveKey(key) => {
            let expected = model
                .items
                .iter()
                .position(|i| i.key == key)
                .map(|p| model.items.remove(p));
            prop_assert_eq!(sut.remove_key(&key), expected);
        }
        Op::RemoveAt(position) => {
            if position < len {
                let expected = model.items.remove(position);
                prop_assert_eq!(sut.remove_at(position), Ok(expected));
            } else {
                prop_assert!(sut.remove_at(position).is_err());
            }
        }
        Op::RemoveRange(start, count) => {
            if start + count <= len {
                model.items.drain(start..start + count);
                prop_assert_eq!(sut.remove_range(start, count), Ok(()));
            } else {
                prop_assert!(sut.remove_range(start, count).is_err());
            }
        }
        Op::RemoveAllKeyMod(m) => {
            let before = model.items.len();
            model.items.retain(|i| i.key % m != 0);
            let removed = before - model.items.len();
            prop_assert_eq!(sut.remove_all(|i| i.key % m == 0), removed);
        }
        Op::Replace(position, item) => {
            if position < len {
                let expected = if model.admits(&item, Some(position)) {
                    Some(core::mem::replace(&mut model.items[position], item))
                } else {
                    None
                };
                prop_assert_eq!(sut.replace(position, item), Ok(expected));
            } else {
                prop_assert!(sut.replace(position, item).is_err());
            }
        }
        Op::Clear => {
            model.items.clear();
            sut.clear();
        }
    }
    Ok(())
}

fn check(sut: &Items, model: &Model) -> Result<(), TestCaseError> {
    prop_assert!(sut.is_valid());
    prop_assert_eq!(sut.len(), model.items.len());
    prop_assert!(sut.iter().eq(model.items.iter()));
    for item in &model.items {
        prop_assert_eq!(sut.get_by_key(&item.key), Some(item));
        prop_assert!(sut.contains(item));
        if model.tags_indexed {
            prop_assert_eq!(sut.get_by(&item.tag), Some(item));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    // Single-index form against the Vec model.
    #[test]
    fn prop_matches_vec_model(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: Items = HashList::new(by_key);
        let mut model = Model { items: Vec::new(), tags_indexed: false };
        for op in ops {
            apply(&mut sut, &mut model, op)?;
            check(&sut, &model)?;
        }
    }

    // With a secondary indexer over `tag`: an operation colliding in either
    // index is refused as a whole.
    #[test]
    fn prop_matches_vec_model_with_secondary_index(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let mut sut: Items = HashList::new(by_key);
        sut.create_indexer(|i: &Item| i.tag).unwrap();
        let mut model = Model { items: Vec::new(), tags_indexed: true };
        for op in ops {
            apply(&mut sut, &mut model, op)?;
            check(&sut, &model)?;
        }
    }

    // Adoption succeeds exactly when keys are distinct, and keeps order.
    #[test]
    fn prop_adoption_atomic(items in proptest::collection::vec(arb_item(), 0..16)) {
        let first_dup = (0..items.len()).find(|&p| items[..p].iter().any(|i| i.key == items[p].key));
        match Items::try_from_iter(items.clone(), by_key) {
            Ok(list) => {
                prop_assert!(first_dup.is_none());
                prop_assert!(list.is_valid());
                prop_assert_eq!(list.into_vec(), items);
            }
            Err(e) => {
                prop_assert_eq!(Some(e), first_dup.map(|position| HashListError::DuplicateKey { position }));
            }
        }
    }
}
