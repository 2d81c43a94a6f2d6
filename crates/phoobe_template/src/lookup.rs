//! Cloud lookup seam used by standalone synthesis.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TemplateResult;

/// A network resolved by the cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRef {
    pub id: String,
}

/// Resolves named cloud networks to identifiers.
pub trait NetworkLookup {
    /// Find a network by name; `Ok(None)` when the cloud has no such network.
    fn find_network(&self, name: &str) -> TemplateResult<Option<NetworkRef>>;
}

/// Fixed name-to-id table, for resolving networks without a live cloud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticNetworkLookup {
    networks: BTreeMap<String, String>,
}

impl StaticNetworkLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_network(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.networks.insert(name.into(), id.into());
        self
    }

    /// Load a YAML mapping of network name to id.
    pub fn from_file(path: &Path) -> TemplateResult<Self> {
        debug!("Loading network ids from {:?}", path);
        let content = fs::read_to_string(path)?;
        let lookup: StaticNetworkLookup = serde_yaml::from_str(&content)?;
        Ok(lookup)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl NetworkLookup for StaticNetworkLookup {
    fn find_network(&self, name: &str) -> TemplateResult<Option<NetworkRef>> {
        Ok(self
            .networks
            .get(name)
            .map(|id| NetworkRef { id: id.clone() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_static_lookup() {
        let lookup = StaticNetworkLookup::new().with_network("public", "ext-123");
        assert_eq!(
            lookup.find_network("public").unwrap(),
            Some(NetworkRef { id: "ext-123".to_string() })
        );
        assert_eq!(lookup.find_network("private").unwrap(), None);
    }

    #[test]
    fn test_static_lookup_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("networks.yaml");
        fs::write(&path, "public: ext-123\nprovider: ext-456\n").unwrap();

        let lookup = StaticNetworkLookup::from_file(&path).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.find_network("provider").unwrap().unwrap().id, "ext-456");
    }
}
