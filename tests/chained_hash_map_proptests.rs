// ChainedHashMap property tests (public API only).
//
// Property 1: uniqueness. Inserting the same key twice keeps len unchanged and
//  the second value wins.
// Property 2: round-trip and deletion. A fresh key is found after insert and
//  absent after erase; erase shrinks len by exactly one, and erasing an absent
//  key leaves every other mapping untouched.
// Property 3: growth. Every insert doubles capacity at most once, capacity ==
//  initial * 2^n, and len / capacity <= threshold whenever
//  threshold * initial capacity >= 1.
// Property 4: rehash preserves content. Whenever an insert grows the table,
//  every previously present key maps to the same value and the grown len is
//  the old len plus the new key.
use chained_hashmap::{ChainedHashMap, TableConfig};
use proptest::prelude::*;
use std::collections::HashMap;

fn table(capacity: usize, threshold: f64) -> ChainedHashMap<u32, u32> {
    TableConfig::new()
        .capacity(capacity)
        .load_factor_threshold(threshold)
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_uniqueness(keys in proptest::collection::vec(0u32..50, 1..60), k in 0u32..50, v1 in any::<u32>(), v2 in any::<u32>()) {
        let mut m = table(10, 0.5);
        for x in keys {
            m.insert(x, x);
        }
        m.insert(k, v1);
        let len = m.len();
        prop_assert_eq!(m.insert(k, v2), Some(v1));
        prop_assert_eq!(m.len(), len);
        prop_assert_eq!(m.find(&k), Some(&v2));
    }

    #[test]
    fn prop_round_trip_and_deletion(
        pairs in proptest::collection::hash_map(any::<u32>(), any::<u32>(), 1..100),
        absent in any::<u32>(),
    ) {
        prop_assume!(!pairs.contains_key(&absent));
        let mut m = table(4, 0.75);
        for (&k, &v) in &pairs {
            prop_assert_eq!(m.insert(k, v), None);
            prop_assert_eq!(m.find(&k), Some(&v));
        }

        let before = m.len();
        prop_assert_eq!(m.erase(&absent), None);
        prop_assert_eq!(m.len(), before);
        for (k, v) in &pairs {
            prop_assert_eq!(m.find(k), Some(v));
        }

        let mut expected = pairs.len();
        for (k, v) in &pairs {
            prop_assert_eq!(m.erase(k), Some(*v));
            expected -= 1;
            prop_assert_eq!(m.len(), expected);
            prop_assert!(m.find(k).is_none());
        }
        prop_assert!(m.is_empty());
    }

    #[test]
    fn prop_growth_invariant(
        keys in proptest::collection::vec(any::<u32>(), 1..200),
        capacity in 1usize..32,
        threshold in 0.01f64..=1.0,
    ) {
        let mut m = table(capacity, threshold);
        let bounded = threshold * capacity as f64 >= 1.0;
        for k in keys {
            let capacity_before = m.capacity();
            m.insert(k, k);
            prop_assert!(m.capacity() == capacity_before || m.capacity() == capacity_before * 2);
            if bounded {
                prop_assert!(m.load_factor() <= threshold);
            }
            prop_assert_eq!(m.capacity() % capacity, 0);
            prop_assert!((m.capacity() / capacity).is_power_of_two());
        }
    }

    #[test]
    fn prop_rehash_preserves_content(keys in proptest::collection::vec(any::<u32>(), 1..200)) {
        let mut m = table(1, 0.5);
        let mut model: HashMap<u32, u32> = HashMap::new();
        for (i, k) in keys.into_iter().enumerate() {
            let v = i as u32;
            let capacity_before = m.capacity();
            let len_before = m.len();
            let is_new = !model.contains_key(&k);
            m.insert(k, v);
            model.insert(k, v);
            if m.capacity() != capacity_before {
                prop_assert!(is_new, "only a new key can trigger growth");
                prop_assert_eq!(m.len(), len_before + 1);
            }
            for (mk, mv) in &model {
                prop_assert_eq!(m.find(mk), Some(mv));
            }
        }
    }
}
