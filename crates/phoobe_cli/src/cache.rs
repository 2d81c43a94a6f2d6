//! Record of created environments.
//!
//! The cache is a single JSON document mapping environment names to the
//! stack they were created as:
//!
//! ```text
//! .phoobe/environments.json
//! {
//!   "demo": { "name": "demo", "id": "...", "filename": "...", "created_at": "..." }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Environment '{0}' already created")]
    EnvironmentAlreadyCreated(String),

    #[error("Environment '{0}' not created")]
    EnvironmentNotCreated(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid environment cache: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// A created environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub name: String,
    /// Stack id assigned by the orchestration service
    pub id: String,
    /// Environment description the stack was created from
    pub filename: PathBuf,
    pub created_at: DateTime<Utc>,
}

impl EnvironmentRecord {
    pub fn new(name: impl Into<String>, id: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            filename: filename.into(),
            created_at: Utc::now(),
        }
    }
}

/// File backed environment records.
#[derive(Debug)]
pub struct EnvironmentCache {
    path: PathBuf,
    records: BTreeMap<String, EnvironmentRecord>,
}

impl EnvironmentCache {
    /// Load the cache; a missing file is an empty cache.
    pub fn load(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No environment cache at {:?}", path);
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, records })
    }

    pub fn save(&self) -> CacheResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, content)?;
        debug!("Saved {} environment records to {:?}", self.records.len(), self.path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&EnvironmentRecord> {
        self.records.get(name)
    }

    /// Record of an environment that must have been created.
    pub fn require(&self, name: &str) -> CacheResult<&EnvironmentRecord> {
        self.records
            .get(name)
            .ok_or_else(|| CacheError::EnvironmentNotCreated(name.to_string()))
    }

    pub fn insert(&mut self, record: EnvironmentRecord) -> CacheResult<()> {
        if self.records.contains_key(&record.name) {
            return Err(CacheError::EnvironmentAlreadyCreated(record.name));
        }
        info!("Recording environment '{}' as stack {}", record.name, record.id);
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> CacheResult<EnvironmentRecord> {
        let record = self
            .records
            .remove(name)
            .ok_or_else(|| CacheError::EnvironmentNotCreated(name.to_string()))?;
        info!("Forgot environment '{}'", name);
        Ok(record)
    }

    pub fn records(&self) -> impl Iterator<Item = &EnvironmentRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = EnvironmentCache::load(dir.path().join("environments.json")).unwrap();
        assert!(cache.is_empty());

        cache
            .insert(EnvironmentRecord::new("demo", "stack-1", "environment.yaml"))
            .unwrap();
        let err = cache
            .insert(EnvironmentRecord::new("demo", "stack-2", "environment.yaml"))
            .unwrap_err();
        assert!(matches!(err, CacheError::EnvironmentAlreadyCreated(name) if name == "demo"));
        assert_eq!(cache.get("demo").unwrap().id, "stack-1");
    }

    #[test]
    fn test_require_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = EnvironmentCache::load(dir.path().join("environments.json")).unwrap();

        assert!(matches!(
            cache.require("demo"),
            Err(CacheError::EnvironmentNotCreated(_))
        ));
        assert!(matches!(
            cache.remove("demo"),
            Err(CacheError::EnvironmentNotCreated(_))
        ));

        cache
            .insert(EnvironmentRecord::new("demo", "stack-1", "environment.yaml"))
            .unwrap();
        assert_eq!(cache.require("demo").unwrap().id, "stack-1");
        assert_eq!(cache.remove("demo").unwrap().id, "stack-1");
        assert!(!cache.contains("demo"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".phoobe").join("environments.json");

        let mut cache = EnvironmentCache::load(&path).unwrap();
        let record = EnvironmentRecord::new("demo", "stack-1", "environment.yaml");
        cache.insert(record.clone()).unwrap();
        cache.save().unwrap();

        let reloaded = EnvironmentCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("demo"), Some(&record));
    }

    #[test]
    fn test_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("environments.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(EnvironmentCache::load(&path), Err(CacheError::Json(_))));
    }
}
