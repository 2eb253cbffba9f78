//! Prebuilt data packs: fst key index + bincode payloads.
//!
//! Layout on disk:
//! - `datapack.fst`: fst map from compact encoded key to payload index
//! - `datapack.bincode`: `Vec<Vec<DataPackEntry>>`, indexed by the fst values
//!
//! Range lookups (used by phrase suggestion) stream the fst from the prefix
//! and stop at the first key that no longer starts with it.

use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::datapack::DataPackEntry;
use crate::dictionary::DictionaryLookup;
use crate::error::DictionaryError;

pub const FST_FILE: &str = "datapack.fst";
pub const PAYLOAD_FILE: &str = "datapack.bincode";

/// Read-only data pack backed by an fst index.
pub struct DataPackStorage {
    index: Map<Vec<u8>>,
    payloads: Vec<Vec<DataPackEntry>>,
}

impl std::fmt::Debug for DataPackStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPackStorage")
            .field("keys", &self.index.len())
            .field("payloads", &self.payloads.len())
            .finish()
    }
}

impl DataPackStorage {
    /// Open a data pack from in-memory artifacts.
    pub fn from_bytes(fst_bytes: Vec<u8>, payload_bytes: &[u8]) -> Result<Self, DictionaryError> {
        let index = Map::new(fst_bytes)?;
        let payloads: Vec<Vec<DataPackEntry>> = bincode::deserialize(payload_bytes)?;

        // Reject packs whose index points past the payload vector up front,
        // so lookups never have to.
        let mut stream = index.stream();
        while let Some((_, idx)) = stream.next() {
            if idx as usize >= payloads.len() {
                return Err(DictionaryError::MissingPayload(idx));
            }
        }

        Ok(Self { index, payloads })
    }

    /// Load `datapack.fst` + `datapack.bincode` from explicit paths.
    pub fn load_from_fst_bincode<P: AsRef<Path>>(
        fst_path: P,
        bincode_path: P,
    ) -> Result<Self, DictionaryError> {
        let fst_path = fst_path.as_ref();
        let bincode_path = bincode_path.as_ref();

        let fst_bytes = fs::read(fst_path).map_err(|e| DictionaryError::io(fst_path, e))?;
        let payload_bytes =
            fs::read(bincode_path).map_err(|e| DictionaryError::io(bincode_path, e))?;

        let storage = Self::from_bytes(fst_bytes, &payload_bytes)?;
        tracing::info!(
            keys = storage.len(),
            path = %fst_path.display(),
            "loaded data pack"
        );
        Ok(storage)
    }

    /// Load the standard file pair from a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, DictionaryError> {
        let dir = dir.as_ref();
        Self::load_from_fst_bincode(dir.join(FST_FILE), dir.join(PAYLOAD_FILE))
    }

    /// Serialize grouped entries into `(fst bytes, bincode bytes)`.
    ///
    /// Keys are written in byte order, which `BTreeMap<String, _>` already
    /// guarantees.
    pub fn build(
        entries: &BTreeMap<String, Vec<DataPackEntry>>,
    ) -> Result<(Vec<u8>, Vec<u8>), DictionaryError> {
        let mut builder = MapBuilder::memory();
        let mut payloads: Vec<&Vec<DataPackEntry>> = Vec::with_capacity(entries.len());

        for (i, (key, list)) in entries.iter().enumerate() {
            builder.insert(key, i as u64)?;
            payloads.push(list);
        }

        let fst_bytes = builder.into_inner()?;
        let payload_bytes = bincode::serialize(&payloads)?;
        Ok((fst_bytes, payload_bytes))
    }

    /// Build and write the standard file pair into `dir`.
    pub fn write_fst_bincode<P: AsRef<Path>>(
        entries: &BTreeMap<String, Vec<DataPackEntry>>,
        dir: P,
    ) -> Result<(), DictionaryError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| DictionaryError::io(dir, e))?;

        let (fst_bytes, payload_bytes) = Self::build(entries)?;
        let fst_path = dir.join(FST_FILE);
        let bin_path = dir.join(PAYLOAD_FILE);
        fs::write(&fst_path, fst_bytes).map_err(|e| DictionaryError::io(&fst_path, e))?;
        fs::write(&bin_path, payload_bytes).map_err(|e| DictionaryError::io(&bin_path, e))?;
        Ok(())
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl DictionaryLookup for DataPackStorage {
    fn lookup(&self, key: &str) -> Vec<DataPackEntry> {
        self.index
            .get(key)
            .and_then(|idx| self.payloads.get(idx as usize))
            .cloned()
            .unwrap_or_default()
    }

    fn lookup_range(&self, prefix: &str) -> Vec<DataPackEntry> {
        let mut out = Vec::new();
        let mut stream = self.index.range().ge(prefix).into_stream();
        while let Some((key, idx)) = stream.next() {
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            if let Some(list) = self.payloads.get(idx as usize) {
                out.extend(list.iter().cloned());
            }
        }
        out
    }
}
