//! Mapper and reducer traits plus a few stock reducers.
//!
//! Both traits have blanket impls for plain closures, so the common case is
//! simply:
//!
//! ```
//! use ironreduce::*;
//!
//! let job = MapReduce::new(
//!     |n: &u32| {
//!         let parity = if n % 2 == 0 { "even" } else { "odd" };
//!         vec![KeyValue::new(parity.to_string(), u64::from(*n))]
//!     },
//!     SumReducer,
//! );
//! let out = job.run(&[1u32, 2, 3, 4]).unwrap();
//! assert_eq!(out.get(&"even".to_string()), Some(&6));
//! ```

use crate::kv::KeyValue;
use std::iter::Sum;

/// Transforms one input record into zero or more key-value records.
///
/// Invoked once per record, possibly on many threads at once. Implementations
/// must not rely on shared mutable state.
pub trait Mapper<R: ?Sized, K, V>: Send + Sync {
    fn map(&self, record: &R) -> Vec<KeyValue<K, V>>;
}

impl<R: ?Sized, K, V, F> Mapper<R, K, V> for F
where
    F: Fn(&R) -> Vec<KeyValue<K, V>> + Send + Sync,
{
    fn map(&self, record: &R) -> Vec<KeyValue<K, V>> {
        self(record)
    }
}

/// Transforms one key and all of its values into a single output record.
///
/// Invoked once per distinct key. Value order is arrival order unless the
/// runner is configured with [`crate::ValueOrder::RecordIndex`], so the
/// reduction should be commutative otherwise.
pub trait Reducer<K, V, O>: Send + Sync {
    fn reduce(&self, key: K, values: Vec<V>) -> KeyValue<K, O>;
}

impl<K, V, O, F> Reducer<K, V, O> for F
where
    F: Fn(K, Vec<V>) -> KeyValue<K, O> + Send + Sync,
{
    fn reduce(&self, key: K, values: Vec<V>) -> KeyValue<K, O> {
        self(key, values)
    }
}

/// Sum of values per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumReducer;

impl<K, V> Reducer<K, V, V> for SumReducer
where
    V: Sum<V>,
{
    fn reduce(&self, key: K, values: Vec<V>) -> KeyValue<K, V> {
        KeyValue {
            key,
            value: values.into_iter().sum(),
        }
    }
}

/// Number of values per key, ignoring the values themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountReducer;

impl<K, V> Reducer<K, V, u64> for CountReducer {
    fn reduce(&self, key: K, values: Vec<V>) -> KeyValue<K, u64> {
        KeyValue {
            key,
            value: values.len() as u64,
        }
    }
}

/// Maximum value per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxReducer;

impl<K, V> Reducer<K, V, V> for MaxReducer
where
    V: Ord + Default,
{
    fn reduce(&self, key: K, values: Vec<V>) -> KeyValue<K, V> {
        // shuffle never produces an empty group
        let value = values.into_iter().max().unwrap_or_default();
        KeyValue { key, value }
    }
}
