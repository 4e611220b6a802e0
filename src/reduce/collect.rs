//! Materializing consumers.
//!
//! These keep clones of the elements they see, so they need the whole sequence and
//! `T: Clone`.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use crate::error::ReduceError;
use crate::sink::{Consumer, Sink};

/// Every element, in order. Created by [`to_vec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToVec;

/// Sink for [`ToVec`].
#[derive(Debug)]
pub struct ToVecSink<T> {
    items: Vec<T>,
}

/// Collect every element into a `Vec`.
pub fn to_vec() -> ToVec {
    ToVec
}

impl<T: Clone> Consumer<T> for ToVec {
    type Output = Vec<T>;
    type Sink = ToVecSink<T>;

    fn create_sink(&self) -> ToVecSink<T> {
        ToVecSink { items: Vec::new() }
    }
}

impl<T: Clone> Sink<T> for ToVecSink<T> {
    type Output = Vec<T>;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.items.push(item.clone());
        Ok(())
    }

    fn finish(self) -> Result<Vec<T>, ReduceError> {
        Ok(self.items)
    }
}

/// The set of distinct elements. Created by [`to_hash_set`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToHashSet;

/// Sink for [`ToHashSet`].
#[derive(Debug)]
pub struct ToHashSetSink<T> {
    items: HashSet<T>,
}

/// Collect every element into a `HashSet`.
pub fn to_hash_set() -> ToHashSet {
    ToHashSet
}

impl<T: Clone + Eq + Hash> Consumer<T> for ToHashSet {
    type Output = HashSet<T>;
    type Sink = ToHashSetSink<T>;

    fn create_sink(&self) -> ToHashSetSink<T> {
        ToHashSetSink {
            items: HashSet::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Sink<T> for ToHashSetSink<T> {
    type Output = HashSet<T>;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if !self.items.contains(item) {
            self.items.insert(item.clone());
        }
        Ok(())
    }

    fn finish(self) -> Result<HashSet<T>, ReduceError> {
        Ok(self.items)
    }
}

/// A map built from each element. Created by [`to_hash_map`].
pub struct ToHashMap<FK, FV> {
    key: Arc<FK>,
    value: Arc<FV>,
}

/// Sink for [`ToHashMap`].
pub struct ToHashMapSink<FK, FV, K, V> {
    key: Arc<FK>,
    value: Arc<FV>,
    map: HashMap<K, V>,
}

opaque_debug!(ToHashMap<FK, FV>);
opaque_debug!(ToHashMapSink<FK, FV, K, V>);

/// Build a `HashMap` with one entry per element.
///
/// Fails with [`ReduceError::DuplicateKey`] as soon as two elements map to the same
/// key.
///
/// ```
/// use onepass::reduce::to_hash_map;
/// use onepass::SourceExt;
///
/// let users = vec![(1, "ada"), (2, "grace")];
/// let (by_id,) = users
///     .request(to_hash_map(|u: &(i32, &str)| u.0, |u: &(i32, &str)| u.1.to_uppercase()))
///     .evaluate()
///     .unwrap();
///
/// assert_eq!(by_id[&2], "GRACE");
/// ```
pub fn to_hash_map<T, K, V, FK, FV>(key: FK, value: FV) -> ToHashMap<FK, FV>
where
    K: Eq + Hash,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> V,
{
    ToHashMap {
        key: Arc::new(key),
        value: Arc::new(value),
    }
}

impl<T, K, V, FK, FV> Consumer<T> for ToHashMap<FK, FV>
where
    K: Eq + Hash,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> V,
{
    type Output = HashMap<K, V>;
    type Sink = ToHashMapSink<FK, FV, K, V>;

    fn create_sink(&self) -> Self::Sink {
        ToHashMapSink {
            key: Arc::clone(&self.key),
            value: Arc::clone(&self.value),
            map: HashMap::new(),
        }
    }
}

impl<T, K, V, FK, FV> Sink<T> for ToHashMapSink<FK, FV, K, V>
where
    K: Eq + Hash,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> V,
{
    type Output = HashMap<K, V>;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        let key = (self.key)(item);
        if self.map.contains_key(&key) {
            return Err(ReduceError::DuplicateKey);
        }
        self.map.insert(key, (self.value)(item));
        Ok(())
    }

    fn finish(self) -> Result<HashMap<K, V>, ReduceError> {
        Ok(self.map)
    }
}

/// Elements grouped by key. Created by [`group_by`].
pub struct GroupBy<F> {
    key: Arc<F>,
}

/// Sink for [`GroupBy`].
pub struct GroupBySink<F, K, T> {
    key: Arc<F>,
    groups: HashMap<K, Vec<T>>,
}

opaque_debug!(GroupBy<F>);
opaque_debug!(GroupBySink<F, K, T>);

/// Group elements by `key`; each group keeps source order.
pub fn group_by<T, K, F>(key: F) -> GroupBy<F>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    GroupBy { key: Arc::new(key) }
}

impl<T, K, F> Consumer<T> for GroupBy<F>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    type Output = HashMap<K, Vec<T>>;
    type Sink = GroupBySink<F, K, T>;

    fn create_sink(&self) -> Self::Sink {
        GroupBySink {
            key: Arc::clone(&self.key),
            groups: HashMap::new(),
        }
    }
}

impl<T, K, F> Sink<T> for GroupBySink<F, K, T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    type Output = HashMap<K, Vec<T>>;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        self.groups
            .entry((self.key)(item))
            .or_default()
            .push(item.clone());
        Ok(())
    }

    fn finish(self) -> Result<HashMap<K, Vec<T>>, ReduceError> {
        Ok(self.groups)
    }
}

/// Distinct elements in order of first occurrence. Created by [`distinct`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Distinct;

/// Sink for [`Distinct`].
#[derive(Debug)]
pub struct DistinctSink<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

/// Distinct elements, keeping the first occurrence of each.
pub fn distinct() -> Distinct {
    Distinct
}

impl<T: Clone + Eq + Hash> Consumer<T> for Distinct {
    type Output = Vec<T>;
    type Sink = DistinctSink<T>;

    fn create_sink(&self) -> DistinctSink<T> {
        DistinctSink {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Sink<T> for DistinctSink<T> {
    type Output = Vec<T>;

    fn accept(&mut self, item: &T) -> Result<(), ReduceError> {
        if self.seen.insert(item.clone()) {
            self.items.push(item.clone());
        }
        Ok(())
    }

    fn finish(self) -> Result<Vec<T>, ReduceError> {
        Ok(self.items)
    }
}
