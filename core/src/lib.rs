//! composer-core
//!
//! Language-agnostic composition engine shared by phonetic input crates
//! (libzhuyin). It turns a buffer of phonetic symbols into ranked phrase
//! candidates over a read-only dictionary, and runs the session state
//! machine that confirms them.
//!
//! Dictionaries are fst key indexes with bincode payloads; the syllable
//! encoding is supplied by the language crate through `SyllableCodec`.
//!
//! Public API:
//! - `ImeEngine` - Session facade: load/unload, keys, candidate selection
//! - `QueryEngine` - Candidate search over one syllable buffer
//! - `SyllableCodec` - Encoding a phonetic scheme plugs in
//! - `DictionaryLookup` - Exact and prefix lookups, `MemoryDictionary`, `DataPackStorage`
//! - `SegmentCache` - Memoized lookups for substrings of the buffer
//! - `ActionQueue` - Serial queue with single-use completion tokens
//! - `SessionCallbacks` / `ImeContext` - Reporting back to the shell
//! - `Config` - Configuration and feature flags
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{DictionaryError, ImeError, QueueError};

pub mod candidate;
pub use candidate::Candidate;

pub mod datapack;
pub use datapack::{best_entry, by_score_desc, DataPack, DataPackEntry};

pub mod dictionary;
pub use dictionary::{DictionaryLookup, MemoryDictionary};

pub mod datapack_store;
pub use datapack_store::DataPackStorage;

pub mod segment_cache;
pub use segment_cache::SegmentCache;

pub mod compositions;
pub use compositions::{compositions, Compositions};

pub mod engine;
pub use engine::{QueryEngine, QueryOutcome, SyllableCodec};

pub mod queue;
pub use queue::{ActionQueue, CompletionToken, Dispatch, RequestId};

pub mod input_buffer;
pub use input_buffer::SymbolBuffer;

pub mod session;
pub use session::{Phase, SessionState};

pub mod context;
pub use context::{ImeContext, ImeEvent, SessionCallbacks};

pub mod ime_engine;
pub use ime_engine::{Action, ImeEngine, InputEvent};

/// Upper bound applied to `Config::max_syllables`.
///
/// The composition search grows with `2^(n-1)`, so larger buffers are not
/// searched exhaustively.
pub const MAX_SYLLABLES_LIMIT: usize = 16;

/// Generic configuration for the composition engine.
///
/// Language-specific options (interchangeable zhuyin pairs, etc.) belong in
/// the language crate's config, which flattens this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Longest syllable buffer searched before the best phrase is confirmed
    /// automatically.
    pub max_syllables: usize,

    /// Offer phrase continuations after a confirmation empties the buffer.
    pub suggest_phrases: bool,

    /// Rewrite each syllable in canonical symbol order as it is typed,
    /// so out-of-order typing still encodes.
    pub reorder_symbols: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_syllables: 8,
            suggest_phrases: true,
            reorder_symbols: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// `max_syllables` clamped to `1..=MAX_SYLLABLES_LIMIT`.
    pub fn syllable_limit(&self) -> usize {
        self.max_syllables.clamp(1, MAX_SYLLABLES_LIMIT)
    }

    pub fn set_max_syllables(&mut self, max: usize) {
        self.max_syllables = max;
    }

    pub fn set_suggest_phrases(&mut self, enabled: bool) {
        self.suggest_phrases = enabled;
    }

    pub fn set_reorder_symbols(&mut self, enabled: bool) {
        self.reorder_symbols = enabled;
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}
