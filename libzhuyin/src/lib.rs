//! # libzhuyin
//!
//! Zhuyin/Bopomofo input method engine built on composer-core.
//!
//! The crate supplies the Bopomofo syllable codec, interchangeable-symbol
//! folding and the zhuyin configuration; the session engine itself lives in
//! `composer_core::ImeEngine`.

use std::path::Path;

pub mod bopomofo;
pub mod config;
pub mod interchangeable;

// Re-export IME components from core
pub use composer_core::{
    Candidate, Config, DataPackEntry, DataPackStorage, DictionaryError, DictionaryLookup,
    ImeContext, ImeError, ImeEvent, InputEvent, MemoryDictionary, Phase, SessionCallbacks,
};

pub use bopomofo::{
    decode, encode, encode_lossless, is_bopomofo_symbol, reorder, tones_fit, BopomofoCodec,
};
pub use config::ZhuyinConfig;
pub use interchangeable::{FoldingDictionary, InterchangeablePairs, PairsError};

/// Session engine over Bopomofo input.
pub type ZhuyinEngine<D, S> = composer_core::ImeEngine<BopomofoCodec, FoldingDictionary<D>, S>;

/// Dictionary key and entry for a phrase spelled in Bopomofo.
///
/// The key folds tones; the entry keeps the lossless reading so typed tones
/// can narrow lookups.
pub fn phrase_entry<T: Into<String>>(
    symbols: &str,
    text: T,
    score: f64,
) -> (String, DataPackEntry) {
    (
        encode(symbols),
        DataPackEntry::new(text, score).with_reading(encode_lossless(symbols)),
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ZhuyinError {
    #[error(transparent)]
    Pairs(#[from] PairsError),

    #[error(transparent)]
    Ime(#[from] ImeError),
}

/// Create an engine configured by `config` and load `dictionary` into it.
pub fn create_ime_engine<D, S>(
    config: &ZhuyinConfig,
    dictionary: D,
    callbacks: S,
) -> Result<ZhuyinEngine<D, S>, ZhuyinError>
where
    D: DictionaryLookup,
    S: SessionCallbacks,
{
    let pairs = config.pairs()?;
    let mut engine = ZhuyinEngine::with_config(config.codec(), callbacks, config.base().clone());
    engine.load(FoldingDictionary::new(dictionary, pairs))?;
    Ok(engine)
}

/// Create an engine over the data pack in `data_dir`
/// (`datapack.fst` + `datapack.bincode`).
///
/// A pack that fails to open is reported to `callbacks.on_error` before the
/// error is returned.
pub fn create_ime_engine_from_dir<S, P>(
    config: &ZhuyinConfig,
    data_dir: P,
    callbacks: S,
) -> Result<ZhuyinEngine<DataPackStorage, S>, ZhuyinError>
where
    S: SessionCallbacks,
    P: AsRef<Path>,
{
    let pairs = config.pairs()?;
    let mut engine = ZhuyinEngine::with_config(config.codec(), callbacks, config.base().clone());
    let data_dir = data_dir.as_ref();
    engine.load_with(|| {
        DataPackStorage::load_dir(data_dir).map(|pack| FoldingDictionary::new(pack, pairs))
    })?;
    Ok(engine)
}
