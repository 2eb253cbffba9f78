//! Pending phonetic symbols.
//!
//! The buffer stores the raw symbols typed since the last confirmation
//! (e.g. "ㄋㄧˇㄏㄠˇ"). It is append-only from the keyboard's point of view:
//! symbols are pushed at the end and Backspace removes the last one.
//! Confirmations replace the whole content with the decoded remainder.

use crate::engine::SyllableCodec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolBuffer {
    text: String,
}

impl SymbolBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of symbols (not bytes).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push(&mut self, symbol: char) {
        self.text.push(symbol);
    }

    /// Append `symbol`, then rewrite every syllable in canonical order.
    pub fn push_reordered<C: SyllableCodec + ?Sized>(&mut self, codec: &C, symbol: char) {
        self.text.push(symbol);
        self.text = codec.reorder(&self.text);
    }

    /// Remove and return the last symbol.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn replace<S: Into<String>>(&mut self, symbols: S) {
        self.text = symbols.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
