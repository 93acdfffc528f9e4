#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so they can run the
// structural self-check after every operation.

use crate::config::TableConfig;
use crate::error::BucketError;
use crate::table::testing::{ConstState, IdentityState};
use crate::table::ChainedHashMap;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations so failing cases shrink to small key sets.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Erase(usize),
    Find(usize),
    Bump(usize, i32),
    Bucket(usize),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<Op>)> {
    proptest::collection::vec(any::<u64>(), 1..=16).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            3 => idx.clone().prop_map(Op::Erase),
            2 => idx.clone().prop_map(Op::Find),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => (0usize..64).prop_map(Op::Bucket),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_against_model<S: BuildHasher>(
    mut sut: ChainedHashMap<u64, i32, S>,
    pool: &[u64],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<u64, i32> = HashMap::new();
    let threshold = sut.load_factor_threshold();
    let initial_capacity = sut.capacity();
    // A single doubling per insert restores the bound once threshold * capacity >= 1.
    let bounded = threshold * initial_capacity as f64 >= 1.0;

    for op in ops {
        let capacity_before = sut.capacity();
        match op {
            Op::Insert(i, v) => {
                let k = pool[i];
                prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
            }
            Op::Erase(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.erase(&k), model.remove(&k));
            }
            Op::Find(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.find(&k), model.get(&k));
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
            }
            Op::Bump(i, d) => {
                let k = pool[i];
                match (sut.find_mut(&k), model.get_mut(&k)) {
                    (Some(a), Some(b)) => {
                        *a = a.wrapping_add(d);
                        *b = b.wrapping_add(d);
                    }
                    (None, None) => {}
                    (a, b) => prop_assert!(false, "find_mut disagrees: {:?} vs {:?}", a, b),
                }
            }
            Op::Bucket(index) => match sut.bucket(index) {
                Ok(view) => {
                    prop_assert!(index < sut.capacity());
                    prop_assert_eq!(model.get(view.key()), Some(view.value()));
                }
                Err(BucketError::OutOfRange { capacity, .. }) => {
                    prop_assert!(index >= capacity);
                    prop_assert_eq!(capacity, sut.capacity());
                }
                Err(BucketError::Empty { .. }) => {
                    prop_assert_eq!(sut.chain_len(index), Ok(0));
                }
            },
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.capacity() >= capacity_before, "capacity never shrinks");
        prop_assert!(
            sut.capacity() == capacity_before || sut.capacity() == capacity_before * 2,
            "at most one doubling per operation"
        );
        if bounded {
            prop_assert!(sut.load_factor() <= threshold);
        }
        let ratio = sut.capacity() / initial_capacity;
        prop_assert_eq!(sut.capacity() % initial_capacity, 0);
        prop_assert!(ratio.is_power_of_two());
    }

    let mut seen: Vec<(u64, i32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
    let mut expected: Vec<(u64, i32)> = model.into_iter().collect();
    seen.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(seen, expected);
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - insert/erase/find/find_mut agree with the model, including returned values.
// - Every entry sits in bucket `hash % capacity`; chain tails are consistent;
//   len equals the number of reachable entries.
// - Capacity only grows, always by powers of two over the initial capacity,
//   at most one doubling per operation, and the load factor never exceeds the
//   threshold once threshold * capacity >= 1.
// - Indexed access distinguishes out-of-range from empty buckets.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_default_hasher(
        (pool, ops) in arb_scenario(),
        capacity in 1usize..=8,
        threshold in prop_oneof![Just(0.5f64), Just(1.0f64), 0.05f64..=1.0],
    ) {
        let sut = TableConfig::new()
            .capacity(capacity)
            .load_factor_threshold(threshold)
            .build()
            .unwrap();
        run_against_model(sut, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_identity_hasher(
        (pool, ops) in arb_scenario(),
        capacity in 1usize..=8,
    ) {
        let sut = TableConfig::new()
            .capacity(capacity)
            .hasher(IdentityState)
            .build()
            .unwrap();
        run_against_model(sut, &pool, ops)?;
    }

    // Worst case: every key collides into bucket 0.
    #[test]
    fn prop_state_machine_single_chain((pool, ops) in arb_scenario()) {
        let sut = TableConfig::new()
            .capacity(4)
            .load_factor_threshold(1.0)
            .hasher(ConstState)
            .build()
            .unwrap();
        run_against_model(sut, &pool, ops)?;
    }
}
