// core/src/engine.rs
//
// Candidate search over the pending syllable buffer.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::candidate::Candidate;
use crate::compositions::Compositions;
use crate::datapack::{best_entry, DataPackEntry};
use crate::dictionary::DictionaryLookup;
use crate::segment_cache::SegmentCache;

/// Syllable encoding a phonetic scheme plugs into the engine.
///
/// Encoded strings hold one `char` per syllable. The compact and lossless
/// encodings of the same symbols always have the same length.
pub trait SyllableCodec {
    /// Whether `ch` belongs to the phonetic alphabet.
    fn is_symbol(&self, ch: char) -> bool;

    /// Compact encoding, used for dictionary and cache keys.
    fn encode(&self, symbols: &str) -> String;

    /// Encoding that keeps every symbol, tones included.
    fn encode_lossless(&self, symbols: &str) -> String;

    /// Render encoded syllables back into symbols.
    fn decode(&self, encoded: &str) -> String;

    /// Canonical per-syllable ordering of `symbols`.
    fn reorder(&self, symbols: &str) -> String;

    /// Symbol a non-symbol key stands for while syllables are pending, for
    /// keys that double as a phonetic mark. `None` by default.
    fn pending_symbol(&self, _ch: char) -> Option<char> {
        None
    }

    /// Whether a phrase stored with the lossless `reading` fits the lossless
    /// `typed` syllables it was found under. Entries without a reading always
    /// fit; by default so does every reading.
    fn reading_matches(&self, _typed: &str, _reading: &str) -> bool {
        true
    }
}

/// Result of one query cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Candidates {
        candidates: Vec<Candidate>,
        /// Best phrase to confirm if the buffer later overflows.
        first_matched: Option<Candidate>,
    },
    /// The buffer encodes to more syllables than allowed; nothing was looked up.
    Overflow,
}

/// Stateless search over a dictionary; lookups go through the caller's cache.
pub struct QueryEngine<'a, C: ?Sized, D: ?Sized> {
    codec: &'a C,
    dictionary: &'a D,
}

impl<'a, C, D> QueryEngine<'a, C, D>
where
    C: SyllableCodec + ?Sized,
    D: DictionaryLookup + ?Sized,
{
    pub fn new(codec: &'a C, dictionary: &'a D) -> Self {
        Self { codec, dictionary }
    }

    /// Ranked candidates for `symbols`.
    ///
    /// Results are gathered in priority order and de-duplicated by text:
    /// 1. every phrase stored under the whole buffer
    /// 2. one phrase per composition of the buffer into two or more groups,
    ///    sorted by summed score
    /// 3. phrases matching a proper prefix of the buffer, longest first
    /// 4. the raw first syllable, when it matches nothing at all
    ///
    /// Entries carrying a reading that does not fit the typed syllables are
    /// skipped everywhere above.
    ///
    /// Cache keys that are no longer substrings of the buffer are evicted at
    /// the end of the cycle.
    pub fn query(&self, cache: &mut SegmentCache, symbols: &str, max_syllables: usize) -> QueryOutcome {
        let encoded = self.codec.encode(symbols);
        let compact: Vec<char> = encoded.chars().collect();
        let lossless: Vec<char> = self.codec.encode_lossless(symbols).chars().collect();

        if compact.len() > max_syllables.max(1) {
            tracing::debug!(syllables = compact.len(), max_syllables, "syllable buffer overflow");
            return QueryOutcome::Overflow;
        }

        let mut ranked = Ranked::default();
        let mut first_matched: Option<Candidate> = None;

        if !compact.is_empty() {
            // Part 1: whole buffer.
            for entry in self.matching(cache, &encoded, &lossless) {
                let candidate = Candidate::new(entry.text.as_str(), entry.symbols_or(&encoded));
                if first_matched.is_none() {
                    first_matched = Some(candidate.clone());
                }
                ranked.push(candidate);
            }

            // Part 2: compositions.
            let mut composed: Vec<(Candidate, f64)> = Vec::new();
            for parts in Compositions::new(compact.len()).skip(1) {
                if let Some((candidate, score)) = self.compose(cache, &compact, &lossless, &parts) {
                    if !ranked.contains(&candidate.text)
                        && !composed.iter().any(|(c, _)| c.text == candidate.text)
                    {
                        composed.push((candidate, score));
                    }
                }
            }
            composed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            for (candidate, _) in composed {
                ranked.push(candidate);
            }

            // Part 3: proper prefixes, longest first.
            for len in (1..compact.len()).rev() {
                let prefix: String = compact[..len].iter().collect();
                for entry in self.matching(cache, &prefix, &lossless[..len]) {
                    let candidate = Candidate::new(entry.text.as_str(), prefix.as_str());
                    if first_matched.is_none() {
                        first_matched = Some(candidate.clone());
                    }
                    ranked.push(candidate);
                }
            }

            // Part 4: the first syllable matches nothing.
            let first: String = compact[..1].iter().collect();
            if self.matching(cache, &first, &lossless[..1]).is_empty() {
                if let Some(typo) = self.typo(&compact, &lossless) {
                    if first_matched.is_none() {
                        first_matched = Some(typo.clone());
                    }
                    ranked.push(typo);
                }
            }
        }

        cache.evict_non_substrings_of(&encoded);

        let candidates = ranked.into_vec();
        tracing::debug!(
            syllables = compact.len(),
            candidates = candidates.len(),
            cached_keys = cache.len(),
            "query cycle"
        );

        QueryOutcome::Candidates {
            candidates,
            first_matched,
        }
    }

    /// The raw first syllable of `symbols`, consuming one syllable.
    pub fn first_syllable_typo(&self, symbols: &str) -> Option<Candidate> {
        let compact: Vec<char> = self.codec.encode(symbols).chars().collect();
        let lossless: Vec<char> = self.codec.encode_lossless(symbols).chars().collect();
        self.typo(&compact, &lossless)
    }

    /// Entries stored under `key` whose reading fits the typed syllables.
    fn matching<'c>(
        &self,
        cache: &'c mut SegmentCache,
        key: &str,
        typed: &[char],
    ) -> Vec<&'c DataPackEntry> {
        let typed: String = typed.iter().collect();
        cache
            .fetch(self.dictionary, key)
            .iter()
            .filter(|entry| match entry.reading.as_deref() {
                Some(reading) => self.codec.reading_matches(&typed, reading),
                None => true,
            })
            .collect()
    }

    fn typo(&self, compact: &[char], lossless: &[char]) -> Option<Candidate> {
        let key = compact.first()?;
        let raw = lossless.first()?;
        Some(Candidate::new(
            self.codec.decode(&raw.to_string()),
            key.to_string(),
        ))
    }

    /// One candidate for a grouping of the buffer, or `None` when a
    /// multi-syllable group has no dictionary entry.
    fn compose(
        &self,
        cache: &mut SegmentCache,
        compact: &[char],
        lossless: &[char],
        parts: &[usize],
    ) -> Option<(Candidate, f64)> {
        let mut text = String::new();
        let mut consumed = String::new();
        let mut score = 0.0f64;
        let mut start = 0;

        for &len in parts {
            let key: String = compact[start..start + len].iter().collect();
            let entries = self.matching(cache, &key, &lossless[start..start + len]);
            match best_entry(entries) {
                Some(top) => {
                    text.push_str(&top.text);
                    score += top.score_or_zero();
                    consumed.push_str(top.symbols_or(&key));
                }
                None if len > 1 => return None,
                None => {
                    let raw: String = lossless[start..start + len].iter().collect();
                    text.push_str(&self.codec.decode(&raw));
                    score += f64::NEG_INFINITY;
                    consumed.push_str(&key);
                }
            }
            start += len;
        }

        Some((Candidate::new(text, consumed), score))
    }
}

/// Candidates in insertion order, unique by text.
#[derive(Default)]
struct Ranked {
    list: Vec<Candidate>,
    seen: HashSet<String>,
}

impl Ranked {
    fn contains(&self, text: &str) -> bool {
        self.seen.contains(text)
    }

    fn push(&mut self, candidate: Candidate) {
        if self.seen.insert(candidate.text.clone()) {
            self.list.push(candidate);
        }
    }

    fn into_vec(self) -> Vec<Candidate> {
        self.list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datapack::DataPackEntry;
    use crate::dictionary::MemoryDictionary;

    /// Every char is one syllable; upper case letters are the "tone" form
    /// of their lower case counterpart.
    struct CaseCodec;

    impl SyllableCodec for CaseCodec {
        fn is_symbol(&self, ch: char) -> bool {
            ch.is_ascii_alphabetic()
        }
        fn encode(&self, symbols: &str) -> String {
            symbols.to_ascii_lowercase()
        }
        fn encode_lossless(&self, symbols: &str) -> String {
            symbols.to_string()
        }
        fn decode(&self, encoded: &str) -> String {
            encoded.to_string()
        }
        fn reorder(&self, symbols: &str) -> String {
            symbols.to_string()
        }
        // A typed upper case letter must be read exactly; lower case reads anything.
        fn reading_matches(&self, typed: &str, reading: &str) -> bool {
            typed.len() == reading.len()
                && typed
                    .chars()
                    .zip(reading.chars())
                    .all(|(t, r)| t.is_ascii_lowercase() || t == r)
        }
    }

    fn run(dict: &MemoryDictionary, symbols: &str) -> (Vec<Candidate>, Option<Candidate>) {
        let mut cache = SegmentCache::new();
        match QueryEngine::new(&CaseCodec, dict).query(&mut cache, symbols, 8) {
            QueryOutcome::Candidates {
                candidates,
                first_matched,
            } => (candidates, first_matched),
            QueryOutcome::Overflow => panic!("unexpected overflow"),
        }
    }

    #[test]
    fn test_empty_buffer_has_no_candidates() {
        let (candidates, first) = run(&MemoryDictionary::new(), "");
        assert!(candidates.is_empty());
        assert!(first.is_none());
    }

    #[test]
    fn test_typo_keeps_lossless_rendering() {
        let (candidates, first) = run(&MemoryDictionary::new(), "Q");
        assert_eq!(candidates, vec![Candidate::new("Q", "q")]);
        assert_eq!(first, Some(Candidate::new("Q", "q")));
    }

    #[test]
    fn test_composition_with_unknown_single_syllable_ranks_last() {
        let dict = MemoryDictionary::new()
            .with("a", "阿", 1.0)
            .with("c", "西", 1.0)
            .with("bc", "逼西", 2.0);
        let (candidates, _) = run(&dict, "abc");
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        // [a][bc] scores 3; [a][b][c] keeps the raw "b" and sinks.
        assert_eq!(texts, vec!["阿逼西", "阿b西", "阿"]);
        assert_eq!(candidates[0].consumed, "abc");
    }

    #[test]
    fn test_multi_syllable_miss_rejects_composition() {
        let dict = MemoryDictionary::new().with("c", "西", 1.0);
        let (candidates, _) = run(&dict, "abc");
        // Only the all-singletons grouping survives, plus the typo.
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["ab西", "a"]);
    }

    #[test]
    fn test_entry_symbols_override_consumed() {
        let mut dict = MemoryDictionary::new();
        dict.insert("ab", DataPackEntry::new("阿伯", 1.0).with_symbols("aB"));
        let (candidates, _) = run(&dict, "ab");
        assert_eq!(candidates[0], Candidate::new("阿伯", "aB"));
    }

    #[test]
    fn test_typed_form_narrows_entries_with_readings() {
        let mut dict = MemoryDictionary::new();
        dict.insert("h", DataPackEntry::new("好", 5.0).with_reading("h"));
        dict.insert("h", DataPackEntry::new("號", 2.0).with_reading("H"));
        dict.insert("a", DataPackEntry::new("阿", 1.0));

        let (candidates, _) = run(&dict, "h");
        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["好", "號"]);

        let (candidates, first) = run(&dict, "H");
        assert_eq!(candidates, vec![Candidate::new("號", "h")]);
        assert_eq!(first, Some(Candidate::new("號", "h")));

        // Compositions narrow per group; entries without a reading fit anything.
        let (candidates, _) = run(&dict, "HA");
        assert_eq!(candidates[0], Candidate::new("號阿", "ha"));
    }

    #[test]
    fn test_unfit_reading_falls_back_to_typo() {
        let mut dict = MemoryDictionary::new();
        dict.insert("h", DataPackEntry::new("好", 5.0).with_reading("h"));
        let (candidates, _) = run(&dict, "H");
        assert_eq!(candidates, vec![Candidate::new("H", "h")]);
    }

    #[test]
    fn test_overflow_skips_lookups() {
        let mut cache = SegmentCache::new();
        cache.put("zz", Vec::new());
        let dict = MemoryDictionary::new();
        let outcome = QueryEngine::new(&CaseCodec, &dict).query(&mut cache, "abc", 2);
        assert_eq!(outcome, QueryOutcome::Overflow);
        assert_eq!(cache.stats(), (0, 0));
    }

    #[test]
    fn test_cache_only_keeps_substrings_after_query() {
        let dict = MemoryDictionary::new().with("a", "阿", 1.0);
        let engine = QueryEngine::new(&CaseCodec, &dict);
        let mut cache = SegmentCache::new();
        engine.query(&mut cache, "abc", 8);
        engine.query(&mut cache, "ab", 8);
        assert!(cache.keys().all(|k| "ab".contains(k)));
        assert!(cache.get("a").is_some());
    }
}
