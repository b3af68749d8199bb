use crate::catalog::Catalog;
use crate::errors::WidgetError;
use crate::storage::KeyValueStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "emotionClickCounts";

pub type CounterMap = BTreeMap<String, u64>;

/// How `initialize` arrived at the current counts.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was persisted yet.
    Fresh,
    /// Counts came from the snapshot; `dropped` lists labels that are no
    /// longer in the catalog.
    Restored { dropped: Vec<String> },
    /// The snapshot could not be used and counts fell back to zero.
    Recovered(WidgetError),
}

/// Owns the label to count mapping and writes it through to storage.
pub struct CounterStore<S> {
    catalog: Arc<Catalog>,
    storage: S,
    counts: CounterMap,
}

impl<S: KeyValueStore> CounterStore<S> {
    /// Builds the store and runs [`CounterStore::initialize`].
    pub fn new(catalog: Arc<Catalog>, storage: S) -> (Self, LoadOutcome) {
        let mut store = Self {
            catalog,
            storage,
            counts: CounterMap::new(),
        };
        let outcome = store.initialize();
        (store, outcome)
    }

    /// Zeroes every catalog label, then overlays whatever the snapshot holds
    /// for those labels. Never fails: unusable snapshots are logged and
    /// reported through [`LoadOutcome::Recovered`].
    pub fn initialize(&mut self) -> LoadOutcome {
        self.counts = self.zeroed();

        let raw = match self.storage.get_item(SNAPSHOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Fresh,
            Err(err) => {
                error!("failed to read saved counts: {err}");
                return LoadOutcome::Recovered(err.into());
            }
        };

        let saved = match parse_snapshot(&raw) {
            Ok(saved) => saved,
            Err(err) => {
                error!("error parsing saved counts: {err}");
                return LoadOutcome::Recovered(err);
            }
        };

        let mut dropped = Vec::new();
        for (label, value) in saved {
            let Some(slot) = self.counts.get_mut(&label) else {
                debug!(label = %label, "ignoring saved count for unknown emotion");
                dropped.push(label);
                continue;
            };
            match value.as_u64() {
                Some(count) => *slot = count,
                None => warn!(label = %label, %value, "saved count is not a non-negative integer"),
            }
        }

        LoadOutcome::Restored { dropped }
    }

    /// Reloads from storage, discarding in-memory counts.
    pub fn reload(&mut self) -> LoadOutcome {
        self.initialize()
    }

    /// Adds one to `label` and persists before returning the new count.
    pub fn increment(&mut self, label: &str) -> Result<u64, WidgetError> {
        let Some(count) = self.counts.get_mut(label) else {
            return Err(WidgetError::UnknownLabel(label.to_string()));
        };
        let previous = *count;
        *count = previous.saturating_add(1);

        if let Err(err) = self.save() {
            self.counts.insert(label.to_string(), previous);
            return Err(err);
        }
        Ok(previous.saturating_add(1))
    }

    /// Sets every label back to zero and persists.
    pub fn reset_all(&mut self) -> Result<(), WidgetError> {
        let zeroed = self.zeroed();
        let previous = std::mem::replace(&mut self.counts, zeroed);
        if let Err(err) = self.save() {
            self.counts = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn get_count(&self, label: &str) -> Option<u64> {
        self.counts.get(label).copied()
    }

    pub fn get_all(&self) -> &CounterMap {
        &self.counts
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn zeroed(&self) -> CounterMap {
        self.catalog
            .labels()
            .map(|label| (label.to_string(), 0))
            .collect()
    }

    fn save(&mut self) -> Result<(), WidgetError> {
        let payload = serde_json::to_string(&self.counts)
            .map_err(|err| WidgetError::Storage(err.into()))?;
        self.storage.set_item(SNAPSHOT_KEY, payload)?;
        Ok(())
    }
}

fn parse_snapshot(raw: &str) -> Result<serde_json::Map<String, Value>, WidgetError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(WidgetError::CorruptPersistedState(format!(
            "expected an object, found {}",
            json_kind(&other)
        ))),
        Err(err) => Err(WidgetError::CorruptPersistedState(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
