//! Memoized dataset loading.
//!
//! The cache is owned by whoever drives the render passes and handed to each
//! pass explicitly. Entries live until [`DatasetCache::invalidate`] or
//! [`DatasetCache::clear`] is called; only successful loads are stored, so a
//! source that failed is attempted again on the next pass.

use crate::loader::{load_anomalies, load_dataset};
use crate::{LoadOptions, RowSource, SourceKey};
use sensor_core::error::LoadError;
use sensor_core::reading::{AnomalyDataset, Dataset};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type EntryKey = (SourceKey, LoadOptions);

#[derive(Default)]
struct Entries {
    primary: HashMap<EntryKey, Rc<Dataset>>,
    anomalies: HashMap<EntryKey, Rc<AnomalyDataset>>,
}

/// Loaded datasets keyed by source identity.
///
/// Cheaply cloneable (via `Rc`); clones share the same entries. Single-threaded.
#[derive(Clone, Default)]
pub struct DatasetCache {
    entries: Rc<RefCell<Entries>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The primary dataset for `source`, loading it on first use.
    pub fn primary(&self, source: &RowSource, options: &LoadOptions) -> Result<Rc<Dataset>, LoadError> {
        let key = (source.key(), options.clone());
        if let Some(hit) = self.entries.borrow().primary.get(&key) {
            log::debug!("cache: hit for {}", source.name());
            return Ok(Rc::clone(hit));
        }
        let dataset = Rc::new(load_dataset(source, options)?);
        self.entries
            .borrow_mut()
            .primary
            .insert(key, Rc::clone(&dataset));
        Ok(dataset)
    }

    /// The primary dataset, or an empty stand-in plus the error on failure.
    pub fn primary_or_empty(
        &self,
        source: &RowSource,
        options: &LoadOptions,
    ) -> (Rc<Dataset>, Option<LoadError>) {
        match self.primary(source, options) {
            Ok(dataset) => (dataset, None),
            Err(e) => {
                log::error!("cache: {}", e);
                (Rc::new(Dataset::empty(&source.name())), Some(e))
            }
        }
    }

    /// The anomaly dataset for `source`, loading it on first use.
    pub fn anomalies(
        &self,
        source: &RowSource,
        options: &LoadOptions,
    ) -> Result<Rc<AnomalyDataset>, LoadError> {
        let key = (source.key(), options.clone());
        if let Some(hit) = self.entries.borrow().anomalies.get(&key) {
            log::debug!("cache: hit for {}", source.name());
            return Ok(Rc::clone(hit));
        }
        let anomalies = Rc::new(load_anomalies(source, options)?);
        self.entries
            .borrow_mut()
            .anomalies
            .insert(key, Rc::clone(&anomalies));
        Ok(anomalies)
    }

    /// The anomaly dataset, or `None` plus the error on failure.
    pub fn anomalies_or_none(
        &self,
        source: &RowSource,
        options: &LoadOptions,
    ) -> (Option<Rc<AnomalyDataset>>, Option<LoadError>) {
        match self.anomalies(source, options) {
            Ok(anomalies) => (Some(anomalies), None),
            Err(e) => {
                log::warn!("cache: anomaly highlighting unavailable: {}", e);
                (None, Some(e))
            }
        }
    }

    /// Drop every entry loaded from `key`. Returns whether anything was dropped.
    pub fn invalidate(&self, key: &SourceKey) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.primary.len() + entries.anomalies.len();
        entries.primary.retain(|(k, _), _| k != key);
        entries.anomalies.retain(|(k, _), _| k != key);
        let dropped = before - entries.primary.len() - entries.anomalies.len();
        if dropped > 0 {
            log::info!("cache: invalidated {} entries for {:?}", dropped, key);
        }
        dropped > 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.borrow_mut();
        entries.primary.clear();
        entries.anomalies.clear();
    }

    /// Number of cached datasets of either kind.
    pub fn len(&self) -> usize {
        let entries = self.entries.borrow();
        entries.primary.len() + entries.anomalies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
