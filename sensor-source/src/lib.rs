//! Row sources for the sensor trend viewer.
//!
//! A [`RowSource`] names where delimited text comes from: a file on disk or
//! a named in-memory stream. The loaders in [`loader`] turn a source into a
//! typed [`Dataset`](sensor_core::reading::Dataset) or
//! [`AnomalyDataset`](sensor_core::reading::AnomalyDataset), and
//! [`cache::DatasetCache`] keeps loaded datasets around between render
//! passes, keyed by the source's identity.
//!
//! # Usage
//!
//! ```rust
//! use sensor_source::{cache::DatasetCache, LoadOptions, RowSource};
//!
//! let csv = "record Time,current,voltage,resistance,temperature,\
//! current_scaled,voltage_scaled,resistance_scaled,temperature_scaled\n\
//! 2025-02-06 02:00:00,1.5,220.0,0.0123,35.2,0.1,-0.2,0.3,-0.4\n";
//!
//! let cache = DatasetCache::new();
//! let source = RowSource::stream("readings.csv", csv);
//! let dataset = cache.primary(&source, &LoadOptions::default()).unwrap();
//! assert_eq!(dataset.len(), 1);
//! ```

pub mod cache;
pub mod loader;

use flate2::read::GzDecoder;
use sensor_core::error::LoadError;
use sensor_core::timestamp::RECORD_TIME_COLUMN;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::PathBuf;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSource {
    /// A file on disk, optionally gzip-compressed.
    Path(PathBuf),
    /// Named in-memory content, optionally gzip-compressed.
    Stream { name: String, bytes: Vec<u8> },
}

/// Cache identity of a [`RowSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    Path(PathBuf),
    Stream { name: String, digest: u64 },
}

impl RowSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        RowSource::Path(path.into())
    }

    pub fn stream(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        RowSource::Stream {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Name used in log lines and error messages.
    pub fn name(&self) -> String {
        match self {
            RowSource::Path(path) => path.display().to_string(),
            RowSource::Stream { name, .. } => name.clone(),
        }
    }

    /// The path for files; the name plus a digest of the contents for streams.
    pub fn key(&self) -> SourceKey {
        match self {
            RowSource::Path(path) => SourceKey::Path(path.clone()),
            RowSource::Stream { name, bytes } => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                SourceKey::Stream {
                    name: name.clone(),
                    digest: hasher.finish(),
                }
            }
        }
    }

    /// The raw bytes of the source, gunzipped when they start with the gzip magic.
    pub(crate) fn read_bytes(&self) -> Result<Cow<'_, [u8]>, LoadError> {
        let source_name = self.name();
        let raw: Cow<'_, [u8]> = match self {
            RowSource::Path(path) => match std::fs::read(path) {
                Ok(bytes) => Cow::Owned(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(LoadError::NotFound { source_name });
                }
                Err(error) => return Err(LoadError::Io { source_name, error }),
            },
            RowSource::Stream { bytes, .. } => Cow::Borrowed(bytes.as_slice()),
        };
        if !raw.starts_with(&GZIP_MAGIC) {
            return Ok(raw);
        }
        let mut decoded = Vec::new();
        GzDecoder::new(&raw[..])
            .read_to_end(&mut decoded)
            .map_err(|error| LoadError::Io { source_name, error })?;
        log::debug!(
            "source: decompressed {} bytes to {} from {}",
            raw.len(),
            decoded.len(),
            self.name()
        );
        Ok(Cow::Owned(decoded))
    }
}

/// What to do with a `record Time` value that matches no accepted format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Fail the load.
    #[default]
    Strict,
    /// Keep the row with its raw text; filtering such a dataset fails.
    Lenient,
}

/// How delimited text is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub time_column: String,
    pub timestamp_policy: TimestampPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            time_column: RECORD_TIME_COLUMN.to_string(),
            timestamp_policy: TimestampPolicy::default(),
        }
    }
}
