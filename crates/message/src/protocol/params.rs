use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};

/// An insertion-ordered, string-keyed parameter store.
///
/// Backs the server, cookie, query and attribute parameters of a
/// [`ServerRequest`](crate::protocol::ServerRequest).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBag<V> {
    params: IndexMap<String, V>,
}

impl<V> Default for ParamBag<V> {
    fn default() -> Self {
        Self { params: IndexMap::new() }
    }
}

impl<V> ParamBag<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.params.get(key)
    }

    /// The value of `key`, or `default` when it is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a V) -> &'a V {
        self.params.get(key).unwrap_or(default)
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn set<K: Into<String>>(&mut self, key: K, value: V) -> Option<V> {
        self.params.insert(key.into(), value)
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.params.shift_remove(key)
    }

    /// Copies every entry of `other` into this bag; `other` wins on conflicts.
    pub fn merge(&mut self, other: ParamBag<V>) {
        self.params.extend(other.params);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, V> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for ParamBag<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { params: iter.into_iter().map(|(key, value)| (key.into(), value)).collect() }
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for ParamBag<V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.params.extend(iter.into_iter().map(|(key, value)| (key.into(), value)));
    }
}

impl<V> IntoIterator for ParamBag<V> {
    type Item = (String, V);
    type IntoIter = IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a ParamBag<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
