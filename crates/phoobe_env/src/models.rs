//! Environment data models.
//!
//! Every resource kind comes in two shapes: a partial `*Fields` struct as
//! written in one tier of the description (registry, `defaults` section or
//! the entry itself), and a resolved struct produced once all tiers have
//! been overlaid.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use crate::defaults::{DEFAULT_FLAVOR, DEFAULT_USERNAME};
use crate::error::{EnvError, EnvResult};

/// Deserialize a field where `false`/`null` means "explicitly switched off".
///
/// Absent keys stay `None` (via `#[serde(default)]`), so an overlay can tell
/// "not set in this tier" apart from "set to off in this tier".
fn switch<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null | serde_yaml::Value::Bool(false) => Ok(Some(None)),
        serde_yaml::Value::Bool(true) => Err(D::Error::custom(
            "expected a value or `false`, found `true`",
        )),
        value => serde_yaml::from_value(value)
            .map(|v| Some(Some(v)))
            .map_err(D::Error::custom),
    }
}

/// One network attachment of an instance.
///
/// Written either as a bare network name or as a single-entry mapping
/// `{network: fixed_address}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "AttachmentEntry")]
pub struct NetworkAttachment {
    /// Name of the environment network.
    pub network: String,
    /// Fixed address requested on that network.
    pub address: Option<String>,
}

impl NetworkAttachment {
    pub fn named(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: None,
        }
    }

    pub fn fixed(network: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            address: Some(address.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AttachmentEntry {
    Name(String),
    Fixed(BTreeMap<String, String>),
}

impl TryFrom<AttachmentEntry> for NetworkAttachment {
    type Error = String;

    fn try_from(entry: AttachmentEntry) -> Result<Self, Self::Error> {
        match entry {
            AttachmentEntry::Name(network) => Ok(NetworkAttachment::named(network)),
            AttachmentEntry::Fixed(map) => {
                if map.len() != 1 {
                    return Err(format!(
                        "network attachment must map exactly one network to an address, found {} entries",
                        map.len()
                    ));
                }
                let (network, address) = map.into_iter().next().ok_or("empty network attachment")?;
                Ok(NetworkAttachment::fixed(network, address))
            }
        }
    }
}

/// Network fields from one overlay tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkFields {
    pub cidr: Option<String>,
    #[serde(default, deserialize_with = "switch")]
    pub external: Option<Option<String>>,
    pub router: Option<bool>,
}

impl NetworkFields {
    /// Overlay `upper` on top of `self`; keys present in `upper` win.
    pub fn overlay(self, upper: NetworkFields) -> Self {
        Self {
            cidr: upper.cidr.or(self.cidr),
            external: upper.external.or(self.external),
            router: upper.router.or(self.router),
        }
    }

    pub fn resolve(self, name: &str) -> Network {
        Network {
            name: name.to_string(),
            cidr: self.cidr,
            external: self.external.flatten(),
            router: self.router.unwrap_or(false),
        }
    }
}

/// A fully merged network entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub name: String,
    /// Subnet CIDR, passed through verbatim.
    pub cidr: Option<String>,
    /// Name of the external network this network routes to.
    pub external: Option<String>,
    pub router: bool,
}

impl Network {
    /// Whether the shared router gets an interface on this network.
    pub fn is_routed(&self) -> bool {
        self.external.is_some() || self.router
    }
}

/// Instance fields from one overlay tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceFields {
    pub name: Option<String>,
    pub flavor: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "switch")]
    pub volume: Option<Option<u32>>,
    pub username: Option<String>,
    pub networks: Option<Vec<NetworkAttachment>>,
    pub network: Option<String>,
    #[serde(default, deserialize_with = "switch")]
    pub external: Option<Option<String>>,
    pub provisioners: Option<Vec<String>>,
}

impl InstanceFields {
    /// Overlay `upper` on top of `self`; keys present in `upper` win.
    pub fn overlay(self, upper: InstanceFields) -> Self {
        Self {
            name: upper.name.or(self.name),
            flavor: upper.flavor.or(self.flavor),
            image: upper.image.or(self.image),
            volume: upper.volume.or(self.volume),
            username: upper.username.or(self.username),
            networks: upper.networks.or(self.networks),
            network: upper.network.or(self.network),
            external: upper.external.or(self.external),
            provisioners: upper.provisioners.or(self.provisioners),
        }
    }

    /// Resolve the merged fields of the instance stored under `key`.
    pub fn resolve(self, key: &str) -> EnvResult<Instance> {
        let networks = match (self.networks, self.network) {
            (Some(list), _) => list,
            (None, Some(network)) => vec![NetworkAttachment::named(network)],
            (None, None) => {
                return Err(EnvError::invalid(
                    "instance",
                    key,
                    "no network attachment, set `network` or `networks`",
                ))
            }
        };
        if networks.is_empty() {
            return Err(EnvError::invalid("instance", key, "`networks` must not be empty"));
        }

        let mut provisioners: Vec<String> = Vec::new();
        for provisioner in self.provisioners.unwrap_or_default() {
            if !provisioners.contains(&provisioner) {
                provisioners.push(provisioner);
            }
        }

        Ok(Instance {
            key: key.to_string(),
            name: self.name.unwrap_or_else(|| key.to_string()),
            flavor: self.flavor.unwrap_or_else(|| DEFAULT_FLAVOR.to_string()),
            image: self.image,
            volume: self.volume.flatten().filter(|size| *size > 0),
            username: self.username.unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            networks,
            external: self.external,
            provisioners,
        })
    }
}

/// A fully merged instance entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Key of the entry in the `instances` mapping.
    pub key: String,
    /// Display name; the key unless set explicitly.
    pub name: String,
    pub flavor: String,
    pub image: Option<String>,
    /// Boot volume size in GB; boots from `image` directly when unset.
    pub volume: Option<u32>,
    pub username: String,
    pub networks: Vec<NetworkAttachment>,
    /// Per-instance external network: `None` inherits the template-wide
    /// one, `Some(None)` means no public address.
    pub external: Option<Option<String>>,
    pub provisioners: Vec<String>,
}

impl Instance {
    /// External network for this instance's floating IP.
    pub fn external_network<'a>(&'a self, template_wide: Option<&'a str>) -> Option<&'a str> {
        match &self.external {
            Some(choice) => choice.as_deref(),
            None => template_wide,
        }
    }

    /// The first declared network attachment.
    pub fn primary_network(&self) -> Option<&NetworkAttachment> {
        self.networks.first()
    }
}

/// A named post-boot configuration action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Provisioner {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Script path, relative to the environment file's directory.
    pub path: Option<PathBuf>,
}

impl Provisioner {
    pub fn is_shell(&self) -> bool {
        self.kind == "shell"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_forms() {
        let list: Vec<NetworkAttachment> =
            serde_yaml::from_str("- net1\n- net2: 10.0.0.5\n").unwrap();
        assert_eq!(list[0], NetworkAttachment::named("net1"));
        assert_eq!(list[1], NetworkAttachment::fixed("net2", "10.0.0.5"));
    }

    #[test]
    fn test_attachment_rejects_multiple_entries() {
        let result: Result<Vec<NetworkAttachment>, _> =
            serde_yaml::from_str("- {net1: 10.0.0.5, net2: 10.0.1.5}\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_switch_fields_keep_explicit_off() {
        let fields: InstanceFields = serde_yaml::from_str("volume: false\nexternal: null\n").unwrap();
        assert_eq!(fields.volume, Some(None));
        assert_eq!(fields.external, Some(None));

        let fields: InstanceFields = serde_yaml::from_str("flavor: m1.small\n").unwrap();
        assert_eq!(fields.volume, None);
        assert_eq!(fields.external, None);
    }

    #[test]
    fn test_explicit_off_overrides_lower_tier() {
        let lower: InstanceFields = serde_yaml::from_str("volume: 20\n").unwrap();
        let upper: InstanceFields = serde_yaml::from_str("volume: false\n").unwrap();
        assert_eq!(lower.overlay(upper).volume, Some(None));
    }

    #[test]
    fn test_switch_rejects_true() {
        let result: Result<NetworkFields, _> = serde_yaml::from_str("external: true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_single_network() {
        let fields: InstanceFields = serde_yaml::from_str("network: net1\n").unwrap();
        let instance = fields.resolve("web").unwrap();
        assert_eq!(instance.name, "web");
        assert_eq!(instance.networks, vec![NetworkAttachment::named("net1")]);
        assert_eq!(instance.primary_network().unwrap().network, "net1");
    }

    #[test]
    fn test_resolve_requires_a_network() {
        let err = InstanceFields::default().resolve("web").unwrap_err();
        assert!(err.to_string().contains("web"));
    }

    #[test]
    fn test_resolve_dedups_provisioners() {
        let fields: InstanceFields =
            serde_yaml::from_str("network: net1\nprovisioners: [setup, setup, app]\n").unwrap();
        let instance = fields.resolve("web").unwrap();
        assert_eq!(instance.provisioners, vec!["setup", "app"]);
    }

    #[test]
    fn test_instance_external_network_choice() {
        let inherit: InstanceFields = serde_yaml::from_str("network: net1\n").unwrap();
        let inherit = inherit.resolve("a").unwrap();
        assert_eq!(inherit.external_network(Some("public")), Some("public"));

        let own: InstanceFields = serde_yaml::from_str("network: net1\nexternal: provider\n").unwrap();
        assert_eq!(own.resolve("b").unwrap().external_network(Some("public")), Some("provider"));

        let off: InstanceFields = serde_yaml::from_str("network: net1\nexternal: false\n").unwrap();
        assert_eq!(off.resolve("c").unwrap().external_network(Some("public")), None);
    }

    #[test]
    fn test_network_is_routed() {
        let routed = NetworkFields {
            router: Some(true),
            ..Default::default()
        }
        .resolve("net1");
        assert!(routed.is_routed());
        assert!(routed.external.is_none());

        let plain = NetworkFields::default().resolve("net2");
        assert!(!plain.is_routed());
    }
}
