//! Candidate type reported to the IME shell.
//!
//! A `Candidate` pairs the text the user would commit with the encoded
//! syllables it accounts for. The `consumed` field is the compact encoding
//! of the leading syllables of the buffer; its length (in `char`s) is the
//! number of syllables removed when the candidate is confirmed. Suggestions
//! offered after a confirmation consume nothing.

use serde::{Deserialize, Serialize};

use crate::error::ImeError;

/// A selectable result: text plus the encoded syllables it consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub consumed: String,
}

impl Candidate {
    pub fn new<T: Into<String>, E: Into<String>>(text: T, consumed: E) -> Self {
        Candidate {
            text: text.into(),
            consumed: consumed.into(),
        }
    }

    /// Number of syllables this candidate removes from the buffer.
    pub fn consumed_syllables(&self) -> usize {
        self.consumed.chars().count()
    }

    /// Whether confirming this candidate leaves the buffer untouched
    /// (phrase suggestions).
    pub fn is_suggestion(&self) -> bool {
        self.consumed.is_empty()
    }
}

/// Build a candidate from a raw `[text, consumed]` pair, as delivered by
/// shells that round-trip candidates through untyped storage.
impl TryFrom<Vec<String>> for Candidate {
    type Error = ImeError;

    fn try_from(pair: Vec<String>) -> Result<Self, Self::Error> {
        let len = pair.len();
        let mut it = pair.into_iter();
        match (it.next(), it.next(), it.next()) {
            (Some(text), Some(consumed), None) => Ok(Candidate { text, consumed }),
            _ => Err(ImeError::MalformedCandidate(format!(
                "expected a [text, consumed] pair, got {} element(s)",
                len
            ))),
        }
    }
}

impl From<Candidate> for (String, String) {
    fn from(c: Candidate) -> Self {
        (c.text, c.consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumed_syllables_counts_chars() {
        let c = Candidate::new("你好", "\u{1234}\u{0567}");
        assert_eq!(c.consumed_syllables(), 2);
        assert!(!c.is_suggestion());
        assert!(Candidate::new("嗎", "").is_suggestion());
    }

    #[test]
    fn test_try_from_pair() {
        let c = Candidate::try_from(vec!["好".to_string(), "aa".to_string()]).unwrap();
        assert_eq!(c, Candidate::new("好", "aa"));
    }

    #[test]
    fn test_try_from_rejects_wrong_arity() {
        let err = Candidate::try_from(vec!["好".to_string()]).unwrap_err();
        assert!(matches!(err, ImeError::MalformedCandidate(_)));

        let err = Candidate::try_from(vec![
            "好".to_string(),
            "a".to_string(),
            "b".to_string(),
        ])
        .unwrap_err();
        assert!(matches!(err, ImeError::MalformedCandidate(_)));
    }

    #[test]
    fn test_serde_field_names() {
        let c = Candidate::new("好", "a");
        let toml = toml::to_string(&c).unwrap();
        assert!(toml.contains("text = \"好\""));
        assert!(toml.contains("consumed = \"a\""));
    }
}
