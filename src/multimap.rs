//! Ordered multi-valued map with per-key comments.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use linked_hash_map::LinkedHashMap;

/// A map from key to an ordered sequence of values.
///
/// Keys keep their first insertion order. A key exists exactly as long as it
/// has at least one value. Unindexed reads and writes address the *last*
/// value of a sequence.
#[derive(Debug, Clone)]
pub struct MultiMap<K, V>
where
    K: Hash + Eq,
{
    entries: LinkedHashMap<K, Vec<V>>,
    comments: HashMap<K, String>,
}

impl<K, V> Default for MultiMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self {
            entries: LinkedHashMap::new(),
            comments: HashMap::new(),
        }
    }
}

impl<K, V> MultiMap<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the sequence of `key`, creating it if absent.
    pub fn add(&mut self, key: K, value: V) {
        self.entries.entry(key).or_insert_with(Vec::new).push(value);
    }

    /// Inserts `value` at `index` in the sequence of `key`.
    ///
    /// # Panics
    ///
    /// Panics if `index > length(key)`.
    pub fn add_at(&mut self, key: K, index: usize, value: V) {
        self.entries
            .entry(key)
            .or_insert_with(Vec::new)
            .insert(index, value);
    }

    /// Replaces the last value of `key`, returning the previous one.
    ///
    /// An absent key is created with `value` as its only element.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.get_mut(&key).and_then(|values| values.last_mut()) {
            Some(last) => Some(std::mem::replace(last, value)),
            None => {
                self.add(key, value);
                None
            }
        }
    }

    /// Replaces the value at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= length(key)`.
    pub fn put_at<Q>(&mut self, key: &Q, index: usize, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let values = self.entries.get_mut(key);
        match values {
            Some(values) => Some(std::mem::replace(&mut values[index], value)),
            None => panic!("put_at index {index} on an absent key"),
        }
    }

    /// Replaces the whole sequence of `key`. An empty `values` removes the key.
    pub fn put_all(&mut self, key: K, values: Vec<V>) -> Option<Vec<V>> {
        if values.is_empty() {
            return self.entries.remove(&key);
        }
        match self.entries.get_mut(&key) {
            Some(existing) => Some(std::mem::replace(existing, values)),
            None => {
                self.entries.insert(key, values);
                None
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).and_then(|values| values.last())
    }

    pub fn get_at<Q>(&self, key: &Q, index: usize) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).and_then(|values| values.get(index))
    }

    pub fn get_all<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Removes the whole sequence of `key` and its comment, returning the last value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.comments.remove(key);
        self.entries.remove(key).and_then(|mut values| values.pop())
    }

    /// Removes a single value. The key disappears with its last value.
    pub fn remove_at<Q>(&mut self, key: &Q, index: usize) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let values = self.entries.get_mut(key)?;
        if index >= values.len() {
            return None;
        }
        let removed = values.remove(index);
        if values.is_empty() {
            self.remove(key);
        }
        Some(removed)
    }

    /// Number of values stored for `key`, zero when absent.
    pub fn length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map_or(0, Vec::len)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterates keys in insertion order with their full value sequences.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.comments.clear();
    }

    pub fn comment<Q>(&self, key: &Q) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.comments.get(key).map(String::as_str)
    }

    /// Attaches a comment to `key`. The key does not need to hold values.
    pub fn put_comment(&mut self, key: K, comment: impl Into<String>) -> Option<String> {
        self.comments.insert(key, comment.into())
    }

    pub fn remove_comment<Q>(&mut self, key: &Q) -> Option<String>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.comments.remove(key)
    }
}
