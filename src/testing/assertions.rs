//! Assertion functions for checking pipeline outputs.

use crate::kv::ResultMapping;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that a result mapping holds exactly `expected`, in any order.
///
/// # Panics
///
/// Panics listing missing, extra and mismatched keys if they differ.
///
/// # Example
///
/// ```
/// use ironreduce::testing::assert_mapping_eq;
///
/// let out = ironreduce::word_count(&["x y x"]).unwrap();
/// assert_mapping_eq(&out, &[("y".to_string(), 1), ("x".to_string(), 2)]);
/// ```
pub fn assert_mapping_eq<K, O>(actual: &ResultMapping<K, O>, expected: &[(K, O)])
where
    K: Debug + Eq + Hash,
    O: Debug + PartialEq,
{
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();
    for (k, e) in expected {
        match actual.get(k) {
            None => missing.push(k),
            Some(a) if a != e => mismatched.push((k, e, a)),
            Some(_) => {}
        }
    }
    let extra: Vec<&K> = actual
        .keys()
        .filter(|k| !expected.iter().any(|(e, _)| e == *k))
        .collect();

    assert!(
        missing.is_empty() && mismatched.is_empty() && extra.is_empty(),
        "Result mapping mismatch:\n  Missing keys: {missing:?}\n  Extra keys: {extra:?}\n  Mismatched (key, expected, actual): {mismatched:?}"
    );
}

/// Assert that the values of a summing job add up to the number of records
/// the mappers emitted, i.e. nothing was lost or duplicated across shuffle.
///
/// # Panics
///
/// Panics if the totals differ.
pub fn assert_conserved<K>(mapping: &ResultMapping<K, u64>, emitted: usize)
where
    K: Eq + Hash,
{
    let total: u64 = mapping.iter().map(|(_, v)| *v).sum();
    assert_eq!(
        total, emitted as u64,
        "Conservation violated: reduced total {total} != {emitted} emitted values"
    );
}

/// Assert that every key in `mapping` satisfies `pred`.
///
/// # Panics
///
/// Panics naming the first offending key.
pub fn assert_all_keys<K, O, F>(mapping: &ResultMapping<K, O>, pred: F)
where
    K: Debug + Eq + Hash,
    F: Fn(&K) -> bool,
{
    if let Some(bad) = mapping.keys().find(|k| !pred(*k)) {
        panic!("Key {bad:?} did not satisfy the predicate");
    }
}
