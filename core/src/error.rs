//! Error types for the composition engine.
//!
//! Three families are kept apart:
//! - `ImeError`: usage errors raised by the engine facade. These are
//!   programming mistakes on the caller side and are never retried.
//! - `QueueError`: violations of the action queue's completion protocol.
//! - `DictionaryError`: failures while opening or decoding a data pack.
//!   Lookup misses are *not* errors; they feed the typo fallback instead.

use std::path::PathBuf;
use thiserror::Error;

/// Usage errors reported by [`crate::ImeEngine`].
#[derive(Debug, Error)]
pub enum ImeError {
    /// An API was called before `load()`, or after `unload()`.
    #[error("engine is not loaded, call load() first")]
    NotLoaded,

    /// `load()` was called twice without `unload()` in between.
    #[error("engine is already loaded")]
    AlreadyLoaded,

    /// The dictionary failed to load; the engine must be unloaded and
    /// loaded again before it can be used.
    #[error("dictionary is unavailable, unload and load the engine again")]
    Unavailable,

    /// A candidate passed to `select_candidate` does not describe a
    /// confirmable `(text, consumed syllables)` pair.
    #[error("malformed candidate: {0}")]
    MalformedCandidate(String),

    /// A raw key code is not a Unicode scalar value.
    #[error("key code {0:#x} is not a valid character")]
    InvalidKeyCode(u32),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}

/// Completion protocol violations of [`crate::ActionQueue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `complete()` was called while no action was in flight.
    #[error("complete() called while no action is in flight")]
    Idle,

    /// The token handed to `complete()` belongs to another dispatch.
    #[error("completion token #{0} does not belong to the in-flight action")]
    StaleToken(u64),
}

/// Failures while opening a data pack.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key index: {0}")]
    Index(#[from] fst::Error),

    #[error("invalid payload: {0}")]
    Payload(#[from] bincode::Error),

    /// The key index points past the end of the payload vector.
    #[error("key index references missing payload #{0}")]
    MissingPayload(u64),
}

impl DictionaryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DictionaryError::Io {
            path: path.into(),
            source,
        }
    }
}
