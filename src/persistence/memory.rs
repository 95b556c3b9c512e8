//! In-memory key-value store

use super::KeyValueStore;
use anyhow::Result;
use std::collections::BTreeMap;

/// Store backed by nested maps. Used by hosts without durable storage and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    namespaces: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, namespace: &str, key: &str) -> Result<()> {
        if let Some(entries) = self.namespaces.get_mut(namespace) {
            entries.remove(key);
        }
        Ok(())
    }

    fn clear(&mut self, namespace: &str) -> Result<()> {
        self.namespaces.remove(namespace);
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self
            .namespaces
            .get(namespace)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}
