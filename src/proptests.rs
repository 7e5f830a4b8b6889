use super::*;

use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::trie::decimal_digits;

fn small_config() -> Config {
    Config::new(1, DEFAULT_GROW_FACTOR).unwrap()
}

fn assert_sorted<K: Key, V: Value>(map: &SparseMap<K, V>) {
    let keys: Vec<K> = map.iter().map(|(k, _)| k).collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "keys must be strictly ascending"
    );
}

#[derive(Debug, Clone)]
enum Op {
    Add(u16, u32),
    Delete(u16),
    Get(u16),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key space so overwrites and deletes of live keys are common.
    let key = 0u16..512;
    let op = prop_oneof![
        50 => (key.clone(), 0u32..u32::MAX).prop_map(|(k, v)| Op::Add(k, v)),
        25 => key.clone().prop_map(Op::Delete),
        25 => key.prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn apply_builder_ops(
    b: &mut SparseMapBuilder<u16, u32>,
    m: &mut BTreeMap<u16, u32>,
    ops: Vec<Op>,
) -> TestCaseResult {
    for op in ops {
        match op {
            Op::Add(key, value) => {
                b.add(key, value);
                m.insert(key, value);
            }
            Op::Delete(key) => {
                prop_assert_eq!(b.delete(key), m.remove(&key));
            }
            Op::Get(_) => {}
        }
    }
    Ok(())
}

fn check_built(s: &SparseMap<u16, u32>, m: &BTreeMap<u16, u32>) -> TestCaseResult {
    assert_sorted(s);
    prop_assert_eq!(s.len(), m.len());
    prop_assert_eq!(s.capacity(), m.len());
    for key in 0u16..512 {
        prop_assert_eq!(s.get(key), m.get(&key));
    }
    Ok(())
}

fn trie_case() -> impl Strategy<Value = (Vec<(String, u32)>, Vec<u64>)> {
    let symbol = prop_oneof![Just('1'), Just('2'), Just('3'), Just('?')];
    let mask = prop::collection::vec(symbol, 1..=4).prop_map(|s| s.into_iter().collect::<String>());
    let masks = prop::collection::vec((mask, any::<u32>()), 0..=40);
    let key = prop_oneof![
        9 => prop::collection::vec(1u64..=4, 1..=5)
            .prop_map(|digits| digits.into_iter().fold(0, |n, d| n * 10 + d)),
        1 => any::<u64>(),
    ];
    (masks, prop::collection::vec(key, 1..=100))
}

/// Among the masks that match `key`, the one whose first differing position
/// holds a concrete digit rather than a wildcard.
fn reference_lookup(masks: &BTreeMap<String, u32>, key: u64) -> Option<u32> {
    let mut buf = [0u8; trie::MAX_DIGITS];
    let digits = decimal_digits(key, &mut buf);
    masks
        .iter()
        .filter(|(text, _)| Mask::must_parse(text).matches(digits))
        .min_by_key(|(text, _)| text.bytes().map(|b| b == b'?').collect::<Vec<bool>>())
        .map(|(_, &value)| value)
}

fn intervals_strategy() -> impl Strategy<Value = Vec<(RangeInclusive<u32>, u16)>> {
    prop::collection::vec((0u32..50, 0u32..50, any::<u16>()), 0..=200)
        .prop_map(|spans| {
            let mut next = 0u32;
            spans
                .into_iter()
                .map(|(gap, width, value)| {
                    let from = next + gap;
                    let to = from + width;
                    next = to + 1;
                    (from..=to, value)
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_sparse_map_equivalence(ops in ops_strategy()) {
        let mut s: SparseMap<u16, u32> = SparseMap::with_config(small_config());
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(key, value) => {
                    prop_assert_eq!(s.add(key, value), m.insert(key, value));
                }
                Op::Delete(key) => {
                    prop_assert_eq!(s.delete(key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(s.get(key), m.get(&key));
                }
            }
        }

        assert_sorted(&s);
        let got: Vec<(u16, u32)> = s.iter().map(|(k, v)| (k, *v)).collect();
        let want: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_builder_equivalence(ops in ops_strategy(), more in ops_strategy()) {
        let mut b: SparseMapBuilder<u16, u32> = SparseMapBuilder::with_config(small_config());
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        apply_builder_ops(&mut b, &mut m, ops)?;
        let s = b.build();
        check_built(&s, &m)?;

        // Reopen the built map; deletes from the first round must stay gone
        // and re-added keys must come back with their new values.
        let mut b = s.into_builder();
        apply_builder_ops(&mut b, &mut m, more)?;
        let s = b.build();
        check_built(&s, &m)?;
    }

    #[test]
    fn prop_range_store_matches_scan(
        intervals in intervals_strategy(),
        probes in prop::collection::vec(0u32..12_000, 1..=200),
    ) {
        let mut b: RangeStoreBuilder<u32, u16> = RangeStoreBuilder::with_config(small_config());
        b.extend(intervals.iter().cloned());
        let s = b.build();
        prop_assert_eq!(s.len(), intervals.len());

        for point in probes {
            let want = intervals
                .iter()
                .find(|(range, _)| range.contains(&point))
                .map(|(_, value)| value);
            prop_assert_eq!(s.get(point), want);
        }
    }

    #[test]
    fn prop_trie_matches_reference(case in trie_case()) {
        let (masks, keys) = case;
        let mut t = DigitTrie::new();
        let mut m: BTreeMap<String, u32> = BTreeMap::new();
        for (text, value) in masks {
            let prev = t.put(&Mask::must_parse(&text), value);
            prop_assert_eq!(prev, m.insert(text, value));
        }
        prop_assert_eq!(t.len(), m.len());

        for key in keys {
            prop_assert_eq!(t.lookup(key).copied(), reference_lookup(&m, key));
        }
    }

    #[test]
    fn prop_arena_grow_preserves_contents(
        values in prop::collection::vec(any::<u64>(), 0..=300),
        extra in 0usize..100,
    ) {
        let mut a = Arena::allocate(values.len());
        for &v in &values {
            a.push(v);
        }
        prop_assert!(a.is_full());

        let a = a.grow(values.len() + extra);
        prop_assert_eq!(a.capacity(), values.len() + extra);
        prop_assert_eq!(a.as_slice(), values.as_slice());

        let a = a.trim_to_size();
        prop_assert_eq!(a.capacity(), values.len());
        prop_assert_eq!(&*a, values.as_slice());
    }
}
