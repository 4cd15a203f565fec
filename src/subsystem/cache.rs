use std::{cell::RefCell, collections::HashMap, rc::Rc};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use strum::{AsRefStr, Display, EnumCount, EnumIter};

use crate::subsystem::realtime::MonitoringUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumCount)]
#[strum(serialize_all = "camelCase")]
pub enum CacheKey {
    ServiceStatus,
    Incidents,
    Logs,
    Alerts,
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// Keyed dataset cache read by the dashboard views.
///
/// Writes replace the whole value for a key. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: Rc<RefCell<HashMap<CacheKey, CacheEntry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key` and returns the key's new version.
    pub fn set_query_data(&self, key: CacheKey, value: serde_json::Value) -> u64 {
        let mut entries = self.entries.borrow_mut();
        let version = entries.get(&key).map_or(1, |e| e.version + 1);
        entries.insert(
            key,
            CacheEntry {
                value,
                version,
                updated_at: Utc::now(),
            },
        );
        log::trace!("cache: {key} → v{version}");
        version
    }

    pub fn get_query_data(&self, key: CacheKey) -> Option<serde_json::Value> {
        self.entries.borrow().get(&key).map(|e| e.value.clone())
    }

    pub fn get<T: DeserializeOwned>(&self, key: CacheKey) -> anyhow::Result<Option<T>> {
        let Some(value) = self.get_query_data(key) else {
            return Ok(None);
        };
        let data = serde_json::from_value(value).with_context(|| format!("cache key {key}"))?;
        Ok(Some(data))
    }

    /// 0 if the key was never written.
    pub fn version(&self, key: CacheKey) -> u64 {
        self.entries.borrow().get(&key).map_or(0, |e| e.version)
    }

    pub fn entry(&self, key: CacheKey) -> Option<CacheEntry> {
        self.entries.borrow().get(&key).cloned()
    }

    /// Installs a monitoring update over whatever was cached for its key.
    pub fn apply(&self, update: &MonitoringUpdate) -> anyhow::Result<u64> {
        let key = update.cache_key();
        let value = update
            .dataset()
            .with_context(|| format!("serializing {key} update"))?;
        Ok(self.set_query_data(key, value))
    }
}
