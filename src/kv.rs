//! Key-value records and the result mapping handed back by the driver.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt::Debug;
use std::hash::Hash;

/// Bound for anything used as a shuffle key.
///
/// Keys cross thread boundaries, are hashed into groups, and are cloned
/// when a task fails so the failure can name its unit.
pub trait KeyBound: 'static + Send + Sync + Clone + Eq + Hash + Debug {}
impl<T> KeyBound for T where T: 'static + Send + Sync + Clone + Eq + Hash + Debug {}

/// The atomic unit passed between phases.
///
/// Defaults to the word-count shape `{ key: String, value: u64 }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue<K = String, V = u64> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValue<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// Final key to reduced value mapping.
///
/// Built by the result collector and never mutated after it is returned;
/// the public API is read-only. Ordering is unspecified, use
/// [`ResultMapping::into_sorted_vec`] or [`crate::io::sorted_entries`] when
/// presenting it.
#[derive(Clone, Debug)]
pub struct ResultMapping<K, O> {
    entries: HashMap<K, O>,
}

impl<K: Eq + Hash, O: PartialEq> PartialEq for ResultMapping<K, O> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq + Hash, O: Eq> Eq for ResultMapping<K, O> {}

impl<K: Eq + Hash, O> ResultMapping<K, O> {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(n),
        }
    }

    /// Insert a reduced record, handing the key back if it is already taken.
    pub(crate) fn insert_unique(&mut self, kv: KeyValue<K, O>) -> Result<(), K> {
        if self.entries.contains_key(&kv.key) {
            return Err(kv.key);
        }
        self.entries.insert(kv.key, kv.value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&O> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, O> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> HashMap<K, O> {
        self.entries
    }
}

impl<K: Ord + Eq + Hash, O> ResultMapping<K, O> {
    /// Drain the mapping into a key-sorted vector.
    pub fn into_sorted_vec(self) -> Vec<(K, O)> {
        let mut v: Vec<(K, O)> = self.entries.into_iter().collect();
        v.sort_by(|a, b| a.0.cmp(&b.0));
        v
    }
}

impl<K, O> IntoIterator for ResultMapping<K, O> {
    type Item = (K, O);
    type IntoIter = hash_map::IntoIter<K, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, O> IntoIterator for &'a ResultMapping<K, O> {
    type Item = (&'a K, &'a O);
    type IntoIter = hash_map::Iter<'a, K, O>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Eq + Hash, O> From<ResultMapping<K, O>> for HashMap<K, O> {
    fn from(m: ResultMapping<K, O>) -> Self {
        m.entries
    }
}
