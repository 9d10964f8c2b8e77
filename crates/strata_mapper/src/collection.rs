//! Ordered, index-addressable collections with fan-out and format export.
//!
//! A [`Collection`] behaves as a sparse, order-preserving associative
//! sequence: items keep the key they were stored under (integer or name),
//! appends take the next free integer key, and removals leave gaps. Besides
//! index access it keeps an internal traversal position (`current`, `next`,
//! `prev`, `rewind`, `end`) that stays consistent when items are removed.

use std::cmp::Ordering;
use std::fmt;

use log::{debug, warn};
use strata_foundation::{Key, Result, Row, StVec, Value};

use crate::element::Element;
use crate::format::{Format, FormatOptions, FormatRegistry, Formats};

/// Options for [`Collection::invoke`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Wrap results in a new collection.
    pub collect: bool,
    /// Flatten per-item vector results into one sequence.
    pub merge: bool,
}

impl InvokeOptions {
    /// Creates options returning a plain result list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            collect: false,
            merge: false,
        }
    }

    /// Sets result collection.
    #[must_use]
    pub const fn collect(mut self, collect: bool) -> Self {
        self.collect = collect;
        self
    }

    /// Sets result merging.
    #[must_use]
    pub const fn merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }
}

/// Result of a fan-out call.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Per-item results in item order.
    Values(Vec<Value>),
    /// Per-item results wrapped in a collection.
    Collection(Collection<Value>),
}

impl Invocation {
    /// Returns the results as a list, whichever form they were produced in.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Values(values) => values,
            Self::Collection(collection) => collection.into_values(),
        }
    }

    /// Returns the array form of the results.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Values(values) => Value::Vec(values.iter().cloned().collect()),
            Self::Collection(collection) => collection.to_array(),
        }
    }
}

/// Ordering used by [`Collection::sort`].
#[derive(Clone, Copy)]
pub enum Comparator<'a> {
    /// Ascending value order (numbers numerically, strings bytewise).
    Natural,
    /// A comparator by name: `natural`, `sort`, `strcmp`, `strcasecmp`,
    /// `rsort` or `reverse`. Unknown names leave the order unchanged.
    Named(&'a str),
    /// A caller-supplied comparator over array forms.
    By(&'a dyn Fn(&Value, &Value) -> Ordering),
}

impl<'a> From<&'a str> for Comparator<'a> {
    fn from(name: &'a str) -> Self {
        Self::Named(name)
    }
}

impl fmt::Debug for Comparator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural => write!(f, "Natural"),
            Self::Named(name) => write!(f, "Named({name:?})"),
            Self::By(_) => write!(f, "By(<fn>)"),
        }
    }
}

fn natural(a: &Value, b: &Value) -> Ordering {
    a.partial_cmp(b)
        .unwrap_or_else(|| a.to_string().cmp(&b.to_string()))
}

fn case_insensitive(a: &Value, b: &Value) -> Ordering {
    a.to_string()
        .to_lowercase()
        .cmp(&b.to_string().to_lowercase())
}

fn bytewise(a: &Value, b: &Value) -> Ordering {
    a.to_string().cmp(&b.to_string())
}

fn descending(a: &Value, b: &Value) -> Ordering {
    natural(b, a)
}

fn named_comparator(name: &str) -> Option<fn(&Value, &Value) -> Ordering> {
    let f: fn(&Value, &Value) -> Ordering = match name {
        "natural" | "sort" => natural,
        "strcmp" => bytewise,
        "strcasecmp" | "natcasesort" => case_insensitive,
        "rsort" | "reverse" => descending,
        _ => return None,
    };
    Some(f)
}

/// Ordered sequence of keyed items.
#[derive(Clone)]
pub struct Collection<T = Value> {
    items: Vec<(Key, T)>,
    next_index: i64,
    position: usize,
    formats: Formats,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_index: 0,
            position: 0,
            formats: Formats::default(),
        }
    }
}

impl<T> Collection<T> {
    /// Creates an empty collection using the shared format registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection keyed `0..n`.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.append(item);
        }
        collection
    }

    /// Creates a collection from explicit key/item pairs.
    ///
    /// A repeated key replaces the earlier item in place.
    #[must_use]
    pub fn from_pairs<K: Into<Key>>(pairs: impl IntoIterator<Item = (K, T)>) -> Self {
        let mut collection = Self::new();
        for (key, item) in pairs {
            collection.insert(key, item);
        }
        collection
    }

    /// Uses `registry` for named formats instead of the shared one.
    #[must_use]
    pub fn with_formats(mut self, registry: FormatRegistry) -> Self {
        self.formats = Formats::owned(registry);
        self
    }

    /// Returns the format lookup this collection uses.
    #[must_use]
    pub fn formats(&self) -> &Formats {
        &self.formats
    }

    /// Replaces the format lookup.
    pub fn set_formats(&mut self, formats: Formats) {
        self.formats = formats;
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_of(&self, key: &Key) -> Option<usize> {
        self.items.iter().position(|(k, _)| k == key)
    }

    /// Returns the item stored under `key`.
    #[must_use]
    pub fn get(&self, key: impl Into<Key>) -> Option<&T> {
        let key = key.into();
        self.index_of(&key).map(|i| &self.items[i].1)
    }

    /// Returns the item stored under `key` mutably.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut T> {
        let key = key.into();
        self.index_of(&key).map(|i| &mut self.items[i].1)
    }

    /// Returns the item at a sequence position (not a key).
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&Key, &T)> {
        self.items.get(index).map(|(k, v)| (k, v))
    }

    /// Returns true if an item is stored under `key`, whatever its value.
    #[must_use]
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.index_of(&key.into()).is_some()
    }

    /// Stores `item` under `key`, returning the item it replaced.
    ///
    /// Replacing keeps the original position; new keys go to the end.
    pub fn insert(&mut self, key: impl Into<Key>, item: T) -> Option<T> {
        let key = key.into();
        if let Some(i) = self.index_of(&key) {
            return Some(std::mem::replace(&mut self.items[i].1, item));
        }
        if let Key::Index(n) = key {
            self.next_index = self.next_index.max(n.saturating_add(1));
        }
        self.items.push((key, item));
        None
    }

    /// Appends `item` under the next free integer key and returns the key.
    pub fn append(&mut self, item: T) -> Key {
        let key = Key::Index(self.next_index);
        self.next_index = self.next_index.saturating_add(1);
        self.items.push((key.clone(), item));
        key
    }

    /// Removes the item stored under `key`.
    ///
    /// The traversal position keeps pointing at the same item when an
    /// earlier one is removed; removing the current item moves it to the
    /// following one.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<T> {
        let index = self.index_of(&key.into())?;
        if index < self.position {
            self.position -= 1;
        }
        Some(self.items.remove(index).1)
    }

    /// Returns a snapshot of the keys in order.
    ///
    /// The snapshot stays valid while items are removed, which makes
    /// `for key in c.keys() { c.remove(key); }` safe.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.items.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Iterates key/item pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &T)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    /// Iterates items in order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().map(|(_, v)| v)
    }

    /// Iterates items mutably in order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().map(|(_, v)| v)
    }

    /// Consumes the collection, returning items in order.
    #[must_use]
    pub fn into_values(self) -> Vec<T> {
        self.items.into_iter().map(|(_, v)| v).collect()
    }

    /// Keeps only the items for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Key, &T) -> bool) {
        for key in self.keys() {
            let drop = self.get(key.clone()).is_some_and(|item| !keep(&key, item));
            if drop {
                self.remove(key);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------------

    /// Returns the item at the traversal position.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.position).map(|(_, v)| v)
    }

    /// Returns the key at the traversal position.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.items.get(self.position).map(|(k, _)| k)
    }

    /// Returns true while the traversal position is on an item.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.position < self.items.len()
    }

    /// Advances and returns the new current item.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        if self.position < self.items.len() {
            self.position += 1;
        }
        self.current()
    }

    /// Steps back and returns the new current item.
    ///
    /// Stepping back from the first item, or from past the end, wraps to the
    /// last item.
    pub fn prev(&mut self) -> Option<&T> {
        if self.position == 0 || self.position >= self.items.len() {
            return self.end();
        }
        self.position -= 1;
        self.current()
    }

    /// Moves to the first item and returns it.
    pub fn rewind(&mut self) -> Option<&T> {
        self.position = 0;
        self.current()
    }

    /// Moves to the last item and returns it.
    pub fn end(&mut self) -> Option<&T> {
        self.position = self.items.len().saturating_sub(1);
        self.current()
    }

    // ---------------------------------------------------------------------
    // Functional helpers
    // ---------------------------------------------------------------------

    /// Replaces every item with `f(item)` in place.
    pub fn each(&mut self, mut f: impl FnMut(&T) -> T) -> &mut Self {
        for (_, item) in &mut self.items {
            *item = f(item);
        }
        self
    }

    /// Returns a new collection of `f(item)` under the same keys.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Collection<U> {
        Collection {
            items: self.items.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            next_index: self.next_index,
            position: 0,
            formats: self.formats.clone(),
        }
    }

    /// Returns `f(item)` for every item, in order.
    #[must_use]
    pub fn map_to_vec<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.values().map(f).collect()
    }

    /// Returns the first item.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first().map(|(_, v)| v)
    }

    /// Returns the first item satisfying `pred`.
    ///
    /// When nothing matches, the last item checked is returned.
    #[must_use]
    pub fn first_where(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        let mut last = None;
        for item in self.values() {
            if pred(item) {
                return Some(item);
            }
            last = Some(item);
        }
        last
    }
}

impl<T: Clone> Collection<T> {
    /// Returns the items satisfying `pred`, keeping their keys and order.
    #[must_use]
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Collection<T> {
        Collection {
            items: self
                .items
                .iter()
                .filter(|(_, v)| pred(v))
                .cloned()
                .collect(),
            next_index: self.next_index,
            position: 0,
            formats: self.formats.clone(),
        }
    }

    /// Returns the items satisfying `pred`, in order.
    #[must_use]
    pub fn find_to_vec(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.values().filter(|v| pred(v)).cloned().collect()
    }
}

impl<T: Element> Collection<T> {
    /// Calls `method` on every item in order.
    ///
    /// With `merge`, vector results are flattened into one sequence. With
    /// `collect`, results come back as a collection sharing this one's
    /// formats; unmerged results keep their item's key.
    ///
    /// # Errors
    ///
    /// Fails on the first item that does not handle `method`.
    pub fn invoke(
        &mut self,
        method: &str,
        args: &[Value],
        options: InvokeOptions,
    ) -> Result<Invocation> {
        debug!(
            "event=collection_invoke module=collection status=start method={} items={} merge={} collect={}",
            method,
            self.items.len(),
            options.merge,
            options.collect
        );

        let mut results: Vec<(Key, Value)> = Vec::with_capacity(self.items.len());
        for (key, item) in &mut self.items {
            results.push((key.clone(), item.invoke(method, args)?));
        }

        if options.merge {
            let merged: Vec<Value> = results
                .into_iter()
                .flat_map(|(_, value)| match value {
                    Value::Vec(items) => items.into_iter().collect::<Vec<_>>(),
                    other => vec![other],
                })
                .collect();
            return Ok(if options.collect {
                let mut collection = Collection::from_items(merged);
                collection.formats = self.formats.clone();
                Invocation::Collection(collection)
            } else {
                Invocation::Values(merged)
            });
        }

        Ok(if options.collect {
            let mut collection = Collection::from_pairs(results);
            collection.formats = self.formats.clone();
            Invocation::Collection(collection)
        } else {
            Invocation::Values(results.into_iter().map(|(_, v)| v).collect())
        })
    }

    /// Calls `method` on every item and returns the results in order.
    ///
    /// # Errors
    ///
    /// Fails on the first item that does not handle `method`.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Vec<Value>> {
        self.invoke(method, args, InvokeOptions::new())
            .map(Invocation::into_values)
    }

    /// Returns the array form: a vector when keys are exactly `0..n` in
    /// order, a map otherwise.
    #[must_use]
    pub fn to_array(&self) -> Value {
        let dense = self
            .items
            .iter()
            .enumerate()
            .all(|(i, (k, _))| usize::try_from(k.as_index().unwrap_or(-1)).ok() == Some(i));

        if dense {
            Value::Vec(self.values().map(Element::to_value).collect::<StVec<_>>())
        } else {
            Value::Map(
                self.items
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Row>(),
            )
        }
    }

    /// Exports the collection.
    ///
    /// Returns `None` for a named format nobody registered.
    #[must_use]
    pub fn to(&self, format: impl Into<Format>) -> Option<Value> {
        self.to_with(format, &FormatOptions::default())
    }

    /// Exports the collection with converter options.
    #[must_use]
    pub fn to_with(&self, format: impl Into<Format>, options: &FormatOptions) -> Option<Value> {
        match format.into() {
            Format::Array => Some(self.to_array()),
            Format::Named(name) => self.formats.convert(&name, &self.to_array(), options),
            Format::With(converter) => converter(&self.to_array(), options),
        }
    }

    /// Sorts items and renumbers them `0..n`.
    ///
    /// Unknown comparator names leave the collection unchanged.
    pub fn sort<'a>(&mut self, comparator: impl Into<Comparator<'a>>) -> &mut Self {
        let comparator = comparator.into();
        let named;
        let compare: &dyn Fn(&Value, &Value) -> Ordering = match comparator {
            Comparator::Natural => &natural,
            Comparator::Named(name) => {
                if let Some(f) = named_comparator(name) {
                    named = f;
                    &named
                } else {
                    warn!(
                        "event=collection_sort module=collection status=ignored comparator={name}"
                    );
                    return self;
                }
            }
            Comparator::By(f) => f,
        };

        let mut keyed: Vec<(Value, T)> = std::mem::take(&mut self.items)
            .into_iter()
            .map(|(_, item)| (item.to_value(), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| compare(a, b));

        self.items = keyed
            .into_iter()
            .enumerate()
            .map(|(i, (_, item))| (Key::from(i), item))
            .collect();
        self.next_index = i64::try_from(self.items.len()).unwrap_or(i64::MAX);
        self.position = 0;
        self
    }
}

impl Collection<Value> {
    /// Rebuilds a collection from an array form.
    ///
    /// Vectors are keyed `0..n`, maps keep their keys, and scalars become a
    /// single item.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Vec(items) => Self::from_items(items.iter().cloned()),
            Value::Map(map) => Self::from_pairs(map.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Value::Nil => Self::new(),
            other => Self::from_items([other.clone()]),
        }
    }
}

impl<T: Element> Element for Collection<T> {
    fn to_value(&self) -> Value {
        self.to_array()
    }

    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    fn describe(&self) -> String {
        format!("collection of {}", self.len())
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        Ok(self
            .invoke(method, args, InvokeOptions::new())?
            .to_value())
    }
}

impl<T: PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.items.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl<T> Extend<T> for Collection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.append(item);
        }
    }
}
