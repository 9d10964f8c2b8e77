//! Persistent collections with structural sharing.
//!
//! These are thin wrappers around the `im` crate's persistent data structures.
//! Rows are cloned every time an entity is hydrated, exported, or mapped, so
//! O(1) cloning keeps lazy sets cheap to fan out over.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

/// Persistent vector with structural sharing.
///
/// Backs [`Value::Vec`](crate::Value::Vec). Exported collections and error
/// lists are built once and then only read, so the surface is read-only.
#[derive(Clone)]
pub struct StVec<T>(im::Vector<T>)
where
    T: Clone;

impl<T: Clone> StVec<T> {
    /// Creates an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self(im::Vector::new())
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the vector is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets an element by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    /// Returns an iterator over the elements in order.
    pub fn iter(&self) -> im::vector::Iter<'_, T> {
        self.0.iter()
    }
}

impl<T: Clone> Default for StVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for StVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.0).finish()
    }
}

impl<T: Clone + PartialEq> PartialEq for StVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Clone + Eq> Eq for StVec<T> {}

impl<T: Clone + Hash> Hash for StVec<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        self.0.iter().for_each(|item| item.hash(state));
    }
}

impl<T: Clone> FromIterator<T> for StVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Clone> IntoIterator for StVec<T> {
    type Item = T;
    type IntoIter = im::vector::ConsumingIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T: Clone> IntoIterator for &'a StVec<T> {
    type Item = &'a T;
    type IntoIter = im::vector::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Persistent ordered map with structural sharing.
///
/// Keys iterate in ascending order, which keeps exported rows and their
/// serialized forms deterministic regardless of how a backend produced them.
/// Every write returns a new map; the receiver is never changed.
#[derive(Clone)]
pub struct StMap<K, V>(im::OrdMap<K, V>)
where
    K: Clone + Ord,
    V: Clone;

impl<K: Clone + Ord, V: Clone> StMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self(im::OrdMap::new())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    /// Returns true if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    /// Returns a new map with `key` set to `value`.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        Self(self.0.update(key, value))
    }

    /// Returns a new map without `key`.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        Self(self.0.without(key))
    }

    /// Returns an iterator over entries in key order.
    pub fn iter(&self) -> im::ordmap::Iter<'_, K, V> {
        self.0.iter()
    }

    /// Returns an iterator over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.0.keys()
    }

    /// Returns an iterator over values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.values()
    }

    /// Returns `self` with every entry of `patch` written over it.
    ///
    /// Entries of `patch` always win, whatever the relative sizes.
    #[must_use]
    pub fn merge(&self, patch: &Self) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &patch.0 {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    /// Returns the entries whose key satisfies `keep`.
    #[must_use]
    pub fn select(&self, mut keep: impl FnMut(&K) -> bool) -> Self {
        self.0
            .iter()
            .filter(|(k, _)| keep(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> StMap<K, V> {
    /// Returns true if every entry of `conditions` is present with an equal
    /// value. Empty conditions match any map.
    #[must_use]
    pub fn satisfies(&self, conditions: &Self) -> bool {
        conditions
            .iter()
            .all(|(k, v)| self.0.get(k).is_some_and(|own| own == v))
    }
}

impl<K: Clone + Ord, V: Clone> Default for StMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Ord + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for StMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(&self.0).finish()
    }
}

impl<K: Clone + Ord, V: Clone + PartialEq> PartialEq for StMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K: Clone + Ord, V: Clone + Eq> Eq for StMap<K, V> {}

impl<K: Clone + Ord + Hash, V: Clone + Hash> Hash for StMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in &self.0 {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: Clone + Ord, V: Clone> FromIterator<(K, V)> for StMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, K: Clone + Ord, V: Clone> IntoIterator for &'a StMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = im::ordmap::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
