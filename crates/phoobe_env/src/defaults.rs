//! Built-in baseline values per resource kind.
//!
//! These form the lowest overlay tier; an environment's `defaults` section
//! and each entry's own fields are layered on top.

use crate::models::{InstanceFields, NetworkFields};

pub const DEFAULT_FLAVOR: &str = "m1.tiny";
pub const DEFAULT_USERNAME: &str = "root";

/// Resource kinds that carry built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instance,
    Network,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Instance => "instance",
            ResourceKind::Network => "network",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "instance" => Some(ResourceKind::Instance),
            "network" => Some(ResourceKind::Network),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Baseline fields returned by [`get_defaults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindDefaults {
    Instance(InstanceFields),
    Network(NetworkFields),
    /// Unknown kind, nothing to merge.
    Empty,
}

impl KindDefaults {
    pub fn is_empty(&self) -> bool {
        matches!(self, KindDefaults::Empty)
    }
}

/// Look up the baseline fields for a kind by name.
pub fn get_defaults(kind: &str) -> KindDefaults {
    match ResourceKind::from_str(kind) {
        Some(ResourceKind::Instance) => KindDefaults::Instance(instance_defaults()),
        Some(ResourceKind::Network) => KindDefaults::Network(network_defaults()),
        None => KindDefaults::Empty,
    }
}

pub fn instance_defaults() -> InstanceFields {
    InstanceFields {
        flavor: Some(DEFAULT_FLAVOR.to_string()),
        image: None,
        volume: Some(None),
        username: Some(DEFAULT_USERNAME.to_string()),
        ..Default::default()
    }
}

pub fn network_defaults() -> NetworkFields {
    NetworkFields {
        cidr: None,
        external: Some(None),
        router: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_defaults() {
        match get_defaults("instance") {
            KindDefaults::Instance(fields) => {
                assert_eq!(fields.flavor.as_deref(), Some("m1.tiny"));
                assert_eq!(fields.username.as_deref(), Some("root"));
                assert_eq!(fields.volume, Some(None));
                assert!(fields.image.is_none());
            }
            other => panic!("unexpected defaults: {:?}", other),
        }
    }

    #[test]
    fn test_network_defaults() {
        match get_defaults("network") {
            KindDefaults::Network(fields) => {
                assert!(fields.cidr.is_none());
                assert_eq!(fields.external, Some(None));
            }
            other => panic!("unexpected defaults: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_empty() {
        assert!(get_defaults("volume").is_empty());
        assert!(get_defaults("").is_empty());
    }

    #[test]
    fn test_defaults_are_fresh_copies() {
        let mut first = instance_defaults();
        first.flavor = Some("m1.large".to_string());
        assert_eq!(instance_defaults().flavor.as_deref(), Some("m1.tiny"));
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [ResourceKind::Instance, ResourceKind::Network] {
            assert_eq!(ResourceKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
