//! chained-hashmap: a single-threaded hash table using separate chaining
//! and a load-factor driven growth policy.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a plain associative container with amortized O(1) insert,
//!   lookup and removal whose bucket layout stays observable for
//!   diagnostics.
//! - Layers:
//!   - Chain (`chain`): per-bucket singly-linked lists threaded through a
//!     `SlotMap` arena. O(1) tail append, O(1) unlink given the
//!     predecessor.
//!   - ChainedHashMap (`table`): the bucket array, the public operations
//!     and the growth policy.
//!   - TableConfig (`config`): construction options and their defaults.
//!
//! Constraints
//! - Single-threaded; callers needing shared mutation wrap the table in a
//!   lock of their choice.
//! - Keys are unique: inserting an existing key overwrites its value in
//!   place and leaves `len` unchanged.
//! - Capacity is always positive and never shrinks.
//!
//! Growth policy
//! - After an insert adds a new entry, if `len / capacity` is strictly
//!   greater than the threshold, the bucket array doubles and every entry
//!   is relinked under the new capacity before `insert` returns. Exactly
//!   one doubling happens per insert, so the capacity is always
//!   `initial * 2^n`. When `threshold * capacity >= 1` that doubling
//!   restores `len / capacity <= threshold`; smaller products converge
//!   over later inserts instead.
//! - Relinking is an internal routine, not a replay of `insert`, so it
//!   never re-enters the growth check.
//!
//! Hasher and rehashing invariants
//! - Each entry stores its precomputed `u64` hash; bucket placement is
//!   `hash % capacity`. Growth uses the stored hash, so `K: Hash` is never
//!   invoked after insertion.
//!
//! Teardown
//! - Entries are owned by the arena, not by their predecessors, so dropping
//!   a table with arbitrarily long chains never recurses.
//!
//! Raw bucket access
//! - `bucket`, `bucket_mut`, `bucket_entry` and `chain_len` expose the
//!   current layout. Views borrow the table and cannot survive a mutating
//!   call; the layout itself changes whenever the table grows.
//!
//! Notes and non-goals
//! - No shrinking on removal.
//! - `iter` yields bucket order then chain order; `iter_mut` order is
//!   unspecified.
//!
//! Example
//! ```
//! use chained_hashmap::{BucketError, ChainedHashMap, TableConfig};
//!
//! let mut table: ChainedHashMap<String, u32> = TableConfig::new()
//!     .capacity(4)
//!     .load_factor_threshold(0.75)
//!     .build()
//!     .unwrap();
//! table.insert("a".to_string(), 1);
//! table.insert("a".to_string(), 2);
//! assert_eq!(table.find("a"), Some(&2));
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.erase("a"), Some(2));
//! assert!(matches!(table.bucket(4), Err(BucketError::OutOfRange { .. })));
//! ```

mod chain;
pub mod config;
mod error;
pub mod table;
mod table_proptest;

// Public surface
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD};
pub use error::{BucketError, ConfigError};
pub use table::{BucketView, BucketViewMut, ChainedHashMap};
