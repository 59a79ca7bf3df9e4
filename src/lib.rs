//! hash-list: an ordered, positionally indexed list with O(1) lookup by a
//! derived key.
//!
//! ```
//! use hash_list::HashList;
//!
//! #[derive(Debug, PartialEq)]
//! struct Person {
//!     id: u32,
//!     name: &'static str,
//! }
//!
//! let mut people = HashList::new(|p: &Person| p.id);
//! assert!(people.add(Person { id: 1, name: "Ada" }));
//! assert!(people.add(Person { id: 2, name: "Grace" }));
//! // Same key: refused, nothing changes.
//! assert!(!people.add(Person { id: 1, name: "Alan" }));
//!
//! assert_eq!(people[1].name, "Grace");
//! assert_eq!(people.get_by_key(&1).map(|p| p.name), Some("Ada"));
//! assert!(people.is_valid());
//! ```
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep an ordered sequence and one or more hash indexes in exact
//!   agreement across every mutation, including bulk operations that skip
//!   colliding elements part-way through.
//! - Layers:
//!   - KeyIndex<K, S>: structural key -> slot table (hashbrown `HashTable`)
//!     with precomputed hashes, a slot -> hash side map, and a debug-only
//!     reentrancy guard.
//!   - Indexer<T, K, F, S>: a KeyIndex plus the selector `F: Fn(&T) -> K`;
//!     element-level add/remove/contains. Type-erased as `ErasedIndexer<T>`
//!     for secondary indexes.
//!   - HashList<T, K, F, S>: public container. Elements live in a `SlotMap`
//!     arena, the order is a `Vec` of slots, and each index maps keys to
//!     slots.
//!
//! Invariants (outside of a running `&mut self` method)
//! - Every index holds exactly one entry per element of the sequence.
//! - Each element is reachable from every index under its own key, and the
//!   entry names the element's own slot.
//! - Keys are unique within an index.
//! - Each index keeps the key computed at insertion until the element leaves.
//!
//! Ordering discipline
//! - Insertions ask every index first and touch nothing if any refuses; only
//!   then is the element stored, linked into each index and placed in the
//!   sequence.
//! - Removals unlink the slot from every index, then drop it from the
//!   sequence. Unlinking goes through the stored hash and compares slots, so
//!   it never runs `K: Hash`, `K: Eq` or a selector.
//! - Bulk removals evaluate their predicate over the whole sequence before the
//!   first removal.
//!
//! Constraints
//! - Single-threaded: `Send` when the parts are, never `Sync`.
//! - The selector must be deterministic for stored elements. Breaking that is
//!   not detected; `is_valid()` will report it.
//! - Refused insertions (taken key) are ordinary outcomes reported as `false`
//!   or `None`. Bounds violations and adoption of colliding input are errors.
//!
//! Notes and non-goals
//! - No ordering by key, no range queries, no persistence.
//! - No mutable element access: a stored element changes only through
//!   `replace`, which moves its index entries along with it.
//! - HashList does not implement `Clone`.

mod error;
mod hash_list;
mod indexer;
#[cfg(feature = "bench_internal")]
pub mod key_index;
#[cfg(not(feature = "bench_internal"))]
#[allow(dead_code)]
mod key_index;
mod key_index_proptest;
mod reentrancy;

// Public surface
pub use error::{HashListError, HashListResult};
pub use hash_list::{HashList, Iter};
