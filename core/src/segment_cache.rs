//! Memoized dictionary lookups for substrings of the syllable buffer.
//!
//! While composing, the query engine looks up every contiguous group of
//! syllables many times over. The cache keeps those results for as long as
//! the key is still a substring of the buffer's encoding. After each query
//! cycle `evict_non_substrings_of` drops everything else, so the live key
//! set is bounded by the substrings of an at most `max_syllables` long key.
//!
//! Misses are cached too, as empty lists.

use ahash::AHashMap;

use crate::datapack::DataPackEntry;
use crate::dictionary::DictionaryLookup;

#[derive(Debug, Clone, Default)]
pub struct SegmentCache {
    entries: AHashMap<String, Vec<DataPackEntry>>,
    hits: usize,
    misses: usize,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[DataPackEntry]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn put<K: Into<String>>(&mut self, key: K, entries: Vec<DataPackEntry>) {
        self.entries.insert(key.into(), entries);
    }

    /// Cached entries for `key`, asking `dictionary` on a miss.
    pub fn fetch<D: DictionaryLookup + ?Sized>(&mut self, dictionary: &D, key: &str) -> &[DataPackEntry] {
        if self.entries.contains_key(key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let found = dictionary.lookup(key);
            self.entries.insert(key.to_string(), found);
        }
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the dictionary has at least one entry for `key`.
    pub fn has_match<D: DictionaryLookup + ?Sized>(&mut self, dictionary: &D, key: &str) -> bool {
        !self.fetch(dictionary, key).is_empty()
    }

    /// Drop every key that is not a substring of `full_key`.
    pub fn evict_non_substrings_of(&mut self, full_key: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| full_key.contains(key.as_str()));
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::trace!(evicted, kept = self.entries.len(), "segment cache eviction");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// (hits, misses) since creation or the last `clear()`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
