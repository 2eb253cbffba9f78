//! Dictionary hits.
//!
//! A `DataPackEntry` is one phrase stored under an encoded syllable key. A
//! `DataPack` is the ordered list of entries returned for one key.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single dictionary hit.
///
/// `score` is a rank (higher is better). `symbols` records the exact encoded
/// syllables the phrase was stored under when it differs from the queried
/// key; when absent the queried key is assumed. `reading` is the lossless
/// encoding the phrase was entered with, used to narrow a lookup to what was
/// actually typed (see [`SyllableCodec::reading_matches`]).
///
/// [`SyllableCodec::reading_matches`]: crate::SyllableCodec::reading_matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPackEntry {
    pub text: String,
    pub score: Option<f64>,
    pub symbols: Option<String>,
    pub reading: Option<String>,
}

impl DataPackEntry {
    pub fn new<T: Into<String>>(text: T, score: f64) -> Self {
        Self {
            text: text.into(),
            score: Some(score),
            symbols: None,
            reading: None,
        }
    }

    /// An entry without a rank score.
    pub fn unscored<T: Into<String>>(text: T) -> Self {
        Self {
            text: text.into(),
            score: None,
            symbols: None,
            reading: None,
        }
    }

    pub fn with_symbols<S: Into<String>>(mut self, symbols: S) -> Self {
        self.symbols = Some(symbols.into());
        self
    }

    pub fn with_reading<S: Into<String>>(mut self, reading: S) -> Self {
        self.reading = Some(reading.into());
        self
    }

    /// Score used when summing a composition; unscored entries count as 0.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Encoded syllables consumed by this entry when looked up with `key`.
    pub fn symbols_or<'a>(&'a self, key: &'a str) -> &'a str {
        self.symbols.as_deref().unwrap_or(key)
    }
}

/// Descending order by score; unscored entries sort after every scored one.
pub fn by_score_desc(a: &DataPackEntry, b: &DataPackEntry) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The highest-scoring of `entries`; the earliest one wins ties.
pub fn best_entry<'a, I>(entries: I) -> Option<&'a DataPackEntry>
where
    I: IntoIterator<Item = &'a DataPackEntry>,
{
    let mut best: Option<&DataPackEntry> = None;
    for entry in entries {
        match best {
            Some(b) if by_score_desc(entry, b) != Ordering::Less => {}
            _ => best = Some(entry),
        }
    }
    best
}

/// Entries returned for one key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataPack<'a> {
    entries: &'a [DataPackEntry],
}

impl<'a> DataPack<'a> {
    pub fn new(entries: &'a [DataPackEntry]) -> Self {
        Self { entries }
    }

    pub fn results(&self) -> &'a [DataPackEntry] {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The highest-scoring entry; the earliest one wins ties.
    pub fn first_result(&self) -> Option<&'a DataPackEntry> {
        best_entry(self.entries)
    }

    /// Entries whose text starts with `prefix`.
    pub fn results_beginning_with<'p>(
        &self,
        prefix: &'p str,
    ) -> impl Iterator<Item = &'a DataPackEntry> + 'p
    where
        'a: 'p,
    {
        let entries = self.entries;
        entries.iter().filter(move |e| e.text.starts_with(prefix))
    }
}
