use std::vec;

/// The `IntermediateInputKV` is a struct for passing a group to a `Reduce`.
///
/// A group holds one key and every value the shuffle collected for it, in grouping order. The
/// values can only be taken out by value, so a reducer traverses them exactly once.
#[derive(Debug, Deserialize, PartialEq)]
pub struct IntermediateInputKV<K, V> {
    pub key: K,
    values: Vec<V>,
}

impl<K, V> IntermediateInputKV<K, V> {
    pub fn new(key: K, values: Vec<V>) -> Self {
        IntermediateInputKV { key, values }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_parts(self) -> (K, vec::IntoIter<V>) {
        (self.key, self.values.into_iter())
    }
}
