use crate::key::Key;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// The array-like form of a collection: an ordered list of unique keys with their values.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Structure(Vec<(Key, Value)>);

impl Structure {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Inserts `value` at `key`. An existing entry with the same key keeps its position and gets
    /// its value replaced.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder variant of [`Structure::insert`].
    #[inline]
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into();
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.0.iter().map(|(k, _)| k)
    }

    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.iter().map(|(_, v)| v)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &(Key, Value)> + '_ {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn into_inner(self) -> Vec<(Key, Value)> {
        self.0
    }

    /// Wraps pairs that are already known to have unique keys.
    #[inline]
    pub(crate) fn from_unique(pairs: Vec<(Key, Value)>) -> Self {
        Self(pairs)
    }
}

impl<K, V> FromIterator<(K, V)> for Structure
where
    K: Into<Key>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut structure = Structure::new();
        for (k, v) in iter {
            structure.insert(k, v);
        }
        structure
    }
}

impl IntoIterator for Structure {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
