// core/tests/common/mod.rs
//
// Shared mock codec for the integration tests.

#![allow(dead_code)]

use composer_core::SyllableCodec;

/// One ASCII letter per syllable. Upper case letters are the toned form of
/// their lower case counterpart, so the compact encoding lowercases while
/// the lossless one keeps the input as typed.
#[derive(Debug, Clone, Copy)]
pub struct MockCodec;

impl SyllableCodec for MockCodec {
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
}
