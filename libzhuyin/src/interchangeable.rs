//! Interchangeable Bopomofo sounds.
//!
//! Users who cannot tell some sounds apart (ㄣ/ㄥ, ㄓ/ㄗ, ㄨㄛ/ㄡ, ...) list
//! them as pairs, e.g. `"ㄣㄥㄓㄗㄨㄛㄡ"`. `FoldingDictionary` then answers a
//! lookup with the phrases of every key reachable by swapping paired sounds.
//!
//! A sound is a run of symbols in syllable order, such as a medial followed
//! by a rhyme. Consonants always stand alone and whitespace ends a sound, so
//! `"ㄧㄚ"` is one sound while `"ㄧ ㄚ"` is a pair.

use std::collections::HashSet;
use std::str::FromStr;

use composer_core::{DataPackEntry, DictionaryLookup};
use thiserror::Error;

use crate::bopomofo::{symbol_class, Syllable, SymbolClass};

/// Upper bound on the keys one lookup expands to.
pub const MAX_VARIANTS: usize = 64;

const CLASSES: [SymbolClass; 4] = [
    SymbolClass::Consonant,
    SymbolClass::Medial,
    SymbolClass::Rhyme,
    SymbolClass::Tone,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairsError {
    #[error("interchangeable pairs need an even number of sounds, got {0}")]
    OddLength(usize),

    #[error("{0:?} is not a Bopomofo symbol")]
    NotASymbol(char),
}

/// Parsed list of interchangeable sound pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterchangeablePairs {
    pairs: Vec<(Syllable, Syllable)>,
}

impl InterchangeablePairs {
    /// Parse `2n` sounds; each consecutive two form a pair.
    pub fn parse(text: &str) -> Result<Self, PairsError> {
        let sounds = split_sounds(text)?;
        if sounds.len() % 2 != 0 {
            return Err(PairsError::OddLength(sounds.len()));
        }
        let pairs = sounds.chunks(2).map(|p| (p[0], p[1])).collect();
        Ok(Self { pairs })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// The pairs as Bopomofo text.
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.pairs
            .iter()
            .map(|(a, b)| (a.symbols(), b.symbols()))
            .collect()
    }

    /// Every spelling of one encoded syllable, the original first.
    ///
    /// Each pair swaps at most once, and never into slots an earlier swap
    /// already wrote, so chained pairs do not reach each other.
    fn syllable_variants(&self, ch: char) -> Vec<char> {
        let Some(syllable) = Syllable::from_code(ch as u32) else {
            return vec![ch];
        };

        let mut variants = vec![(syllable, 0u8)];
        for (a, b) in &self.pairs {
            let mut swapped = Vec::new();
            for &(variant, touched) in &variants {
                let next =
                    swap(variant, touched, a, b).or_else(|| swap(variant, touched, b, a));
                if let Some(next) = next {
                    if !variants.iter().chain(&swapped).any(|(v, _)| *v == next.0) {
                        swapped.push(next);
                    }
                }
            }
            variants.extend(swapped);
        }
        variants.into_iter().map(|(v, _)| v.to_char()).collect()
    }

    /// Keys reachable from `key` by swapping paired sounds, `key` itself
    /// first, at most [`MAX_VARIANTS`].
    pub fn variants(&self, key: &str) -> Vec<String> {
        let mut keys = vec![String::new()];
        for ch in key.chars() {
            let options = self.syllable_variants(ch);
            let mut next = Vec::with_capacity(keys.len() * options.len());
            'fill: for prefix in &keys {
                for &option in &options {
                    if next.len() == MAX_VARIANTS {
                        break 'fill;
                    }
                    let mut k = prefix.clone();
                    k.push(option);
                    next.push(k);
                }
            }
            keys = next;
        }
        keys
    }
}

impl FromStr for InterchangeablePairs {
    type Err = PairsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn split_sounds(text: &str) -> Result<Vec<Syllable>, PairsError> {
    let mut sounds = Vec::new();
    let mut current = Syllable::default();
    let mut last: Option<SymbolClass> = None;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !current.is_empty() {
                sounds.push(current);
            }
            current = Syllable::default();
            last = None;
            continue;
        }
        let (class, value) = symbol_class(ch).ok_or(PairsError::NotASymbol(ch))?;
        let continues = match last {
            Some(SymbolClass::Consonant) | None => false,
            Some(prev) => class > prev,
        };
        if !continues && !current.is_empty() {
            sounds.push(current);
            current = Syllable::default();
        }
        current.set(class, value);
        last = Some(class);
    }
    if !current.is_empty() {
        sounds.push(current);
    }
    Ok(sounds)
}

fn slot_bit(class: SymbolClass) -> u8 {
    1 << class as u8
}

// `from` replaced by `to` inside `syllable`; None when `from` is not there,
// overlaps an earlier swap, or `to` lands in a filled slot.
fn swap(
    syllable: Syllable,
    touched: u8,
    from: &Syllable,
    to: &Syllable,
) -> Option<(Syllable, u8)> {
    let mut out = syllable;
    let mut written = touched;
    for class in CLASSES {
        let value = from.get(class);
        if value == 0 {
            continue;
        }
        if syllable.get(class) != value || touched & slot_bit(class) != 0 {
            return None;
        }
        out.set(class, 0);
    }
    for class in CLASSES {
        let value = to.get(class);
        if value == 0 {
            continue;
        }
        if out.get(class) != 0 {
            return None;
        }
        out.set(class, value);
        written |= slot_bit(class);
    }
    Some((out, written))
}

/// Dictionary adapter that folds interchangeable sounds on exact lookups.
///
/// Results are merged in variant order; the same phrase with the same
/// reading is kept once. Prefix lookups (phrase suggestion) are forwarded
/// unchanged.
#[derive(Debug, Clone)]
pub struct FoldingDictionary<D> {
    inner: D,
    pairs: InterchangeablePairs,
}

impl<D> FoldingDictionary<D> {
    pub fn new(inner: D, pairs: InterchangeablePairs) -> Self {
        Self { inner, pairs }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn pairs(&self) -> &InterchangeablePairs {
        &self.pairs
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: DictionaryLookup> DictionaryLookup for FoldingDictionary<D> {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        if self.pairs.is_empty() {
            return self.inner.lookup(key);
        }

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for variant in self.pairs.variants(key) {
            for entry in self.inner.lookup(&variant) {
                if seen.insert((entry.text.clone(), entry.reading.clone())) {
                    merged.push(entry);
                }
            }
        }
        merged
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        self.inner.lookup_range(prefix)
    }
}
