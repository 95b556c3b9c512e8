//! File-backed key-value store
//!
//! Each namespace is one YAML map in `~/.config/tabsman/data/<namespace>.yaml`.

use super::KeyValueStore;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type Entries = BTreeMap<String, String>;

/// Store that keeps one YAML file per namespace in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the default data directory
    pub fn open_default() -> Self {
        Self::new(default_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{namespace}.yaml"))
    }

    fn load(&self, namespace: &str) -> Result<Entries> {
        let path = self.namespace_path(namespace);
        if !path.exists() {
            return Ok(Entries::new());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_yaml_ng::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn store(&self, namespace: &str, entries: &Entries) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {:?}", self.dir))?;
        let path = self.namespace_path(namespace);
        let yaml = serde_yaml_ng::to_string(entries)
            .with_context(|| format!("Failed to serialize namespace {}", namespace))?;

        // Write to a sibling temp file and rename so a crash never truncates the store
        let temp_path = path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, yaml)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to move {:?} into place", path))?;
        crate::debug_trace!("PERSIST", "Wrote {} keys to {:?}", entries.len(), path);
        Ok(())
    }
}

/// Default directory for persisted tab data
pub fn default_data_dir() -> PathBuf {
    tabsman_config::Config::config_dir().join("data")
}

impl KeyValueStore for FileStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        Ok(self.load(namespace)?.remove(key))
    }

    fn set(&mut self, namespace: &str, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load(namespace)?;
        entries.insert(key.to_string(), value.to_string());
        self.store(namespace, &entries)
    }

    fn remove(&mut self, namespace: &str, key: &str) -> Result<()> {
        let mut entries = self.load(namespace)?;
        if entries.remove(key).is_some() {
            self.store(namespace, &entries)?;
        }
        Ok(())
    }

    fn clear(&mut self, namespace: &str) -> Result<()> {
        let path = self.namespace_path(namespace);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
        }
        Ok(())
    }

    fn keys(&self, namespace: &str) -> Result<Vec<String>> {
        Ok(self.load(namespace)?.into_keys().collect())
    }
}
