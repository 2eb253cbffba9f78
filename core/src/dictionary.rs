//! Dictionary capability consumed by the engine.
//!
//! The engine never cares how phrases are stored. It only needs an exact
//! key lookup and a prefix range scan over compact encoded syllable keys.
//! `MemoryDictionary` is the in-process implementation used by tests and
//! demos; `DataPackStorage` serves prebuilt fst + bincode packs.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use crate::datapack::DataPackEntry;

/// Read-only phrase store keyed by compact encoded syllable strings.
pub trait DictionaryLookup {
    /// Entries stored under exactly `key`. An empty vector is a miss.
    fn lookup(&self, key: &str) -> Vec<DataPackEntry>;

    /// Every entry whose key starts with `prefix`, in key order.
    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry>;
}

impl<D: DictionaryLookup + ?Sized> DictionaryLookup for &D {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        (**self).lookup(key)
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        (**self).lookup_range(prefix)
    }
}

impl<D: DictionaryLookup + ?Sized> DictionaryLookup for Box<D> {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        (**self).lookup(key)
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        (**self).lookup_range(prefix)
    }
}

impl<D: DictionaryLookup + ?Sized> DictionaryLookup for Arc<D> {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        (**self).lookup(key)
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        (**self).lookup_range(prefix)
    }
}

/// Ordered in-memory dictionary.
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionary {
    map: BTreeMap<String, Vec<DataPackEntry>>,
}

impl MemoryDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry under `key`.
    pub fn insert<K: Into<String>>(&mut self, key: K, entry: DataPackEntry) {
        self.map.entry(key.into()).or_default().push(entry);
    }

    /// Builder-style insert of a scored phrase.
    pub fn with<K: Into<String>, T: Into<String>>(mut self, key: K, text: T, score: f64) -> Self {
        self.insert(key, DataPackEntry::new(text, score));
        self
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(key, entries)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<DataPackEntry>)> {
        self.map.iter()
    }
}

impl DictionaryLookup for MemoryDictionary {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        self.map.get(key).cloned().unwrap_or_default()
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        self.map
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .flat_map(|(_, v)| v.iter().cloned())
            .collect()
    }
}

impl FromIterator<(String, DataPackEntry)> for MemoryDictionary {
    fn from_iter<I: IntoIterator<Item = (String, DataPackEntry)>>(iter: I) -> Self {
        let mut dict = MemoryDictionary::new();
        for (key, entry) in iter {
            dict.insert(key, entry);
        }
        dict
    }
}
