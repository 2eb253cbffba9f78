//! Per-session composition state.
//!
//! `SessionState` is everything that survives between two actions: the
//! pending symbols, what was confirmed last, and the candidate the Enter key
//! would pick. It is owned by [`crate::ImeEngine`] and only mutated while an
//! action is being dispatched.

use std::collections::HashSet;

use crate::candidate::Candidate;
use crate::datapack::{by_score_desc, DataPack, DataPackEntry};
use crate::dictionary::DictionaryLookup;
use crate::input_buffer::SymbolBuffer;

/// Where the session stands between two actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing pending, nothing offered.
    #[default]
    Empty,
    /// Symbols are pending and candidates cover them.
    Composing,
    /// Nothing pending; continuations of the last confirmation are offered.
    Suggesting,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub syllables: SymbolBuffer,
    /// Compact encoding consumed by the last confirmation.
    pub confirmed_encoded: String,
    pub confirmed_characters: String,
    /// First candidate of the last list shown.
    pub default_candidate: Option<Candidate>,
    /// Confirmed when the buffer overflows.
    pub first_matched_phrase: Option<Candidate>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (self.syllables.is_empty(), self.default_candidate.is_some()) {
            (false, _) => Phase::Composing,
            (true, true) => Phase::Suggesting,
            (true, false) => Phase::Empty,
        }
    }

    /// Whether keys must be routed to the engine even if they are not symbols.
    pub fn absorbs_keys(&self) -> bool {
        !self.syllables.is_empty() || self.default_candidate.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Phrase continuations of what was just confirmed.
///
/// Entries stored under keys starting with `confirmed_encoded` are kept when
/// their text extends `confirmed_characters`. Candidates carry only the
/// extension and consume no syllables. Higher scores come first; unscored
/// entries follow in dictionary order.
pub fn suggest<D: DictionaryLookup + ?Sized>(
    dictionary: &D,
    confirmed_encoded: &str,
    confirmed_characters: &str,
) -> Vec<Candidate> {
    if confirmed_encoded.is_empty() {
        return Vec::new();
    }

    let entries = dictionary.lookup_range(confirmed_encoded);
    let mut seen: HashSet<String> = HashSet::new();
    let mut suggestions: Vec<&DataPackEntry> = DataPack::new(&entries)
        .results_beginning_with(confirmed_characters)
        .filter(|e| e.text.len() > confirmed_characters.len())
        .filter(|e| seen.insert(e.text.clone()))
        .collect();
    suggestions.sort_by(|a, b| by_score_desc(a, b));

    let candidates: Vec<Candidate> = suggestions
        .into_iter()
        .map(|e| Candidate::new(&e.text[confirmed_characters.len()..], ""))
        .collect();

    tracing::debug!(
        confirmed = confirmed_characters,
        range = entries.len(),
        suggestions = candidates.len(),
        "suggest cycle"
    );
    candidates
}
