//! Environment description loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::defaults::{instance_defaults, network_defaults};
use crate::error::{EnvError, EnvResult};
use crate::models::{Instance, InstanceFields, Network, NetworkFields, Provisioner};

/// Raw top-level layout of an environment description.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentDocument {
    #[serde(default)]
    defaults: Option<EnvironmentDefaults>,
    #[serde(default)]
    networks: Option<Mapping>,
    #[serde(default)]
    instances: Option<Mapping>,
    #[serde(default)]
    provisioners: Option<Mapping>,
}

/// The `defaults` section, keyed by resource kind. Other kinds are ignored.
#[derive(Debug, Default, Deserialize)]
struct EnvironmentDefaults {
    #[serde(default)]
    instance: Option<InstanceFields>,
    #[serde(default)]
    network: Option<NetworkFields>,
}

/// A validated, merged environment.
///
/// Networks, instances and provisioners keep the order in which they appear
/// in the description file.
#[derive(Debug, Clone)]
pub struct Environment {
    name: String,
    filename: PathBuf,
    networks: Vec<Network>,
    instances: Vec<Instance>,
    provisioners: Vec<Provisioner>,
}

impl Environment {
    /// Load an environment description from disk.
    pub fn load(filename: impl AsRef<Path>, name: impl Into<String>) -> EnvResult<Self> {
        let filename = filename.as_ref();
        debug!("Loading environment from {:?}", filename);

        let content = match fs::read_to_string(filename) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(EnvError::ConfigNotFound(filename.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        Self::from_yaml(&content, filename, name)
    }

    /// Build an environment from description text.
    ///
    /// `filename` is only used for error messages and for resolving
    /// provisioner script paths.
    pub fn from_yaml(
        content: &str,
        filename: impl AsRef<Path>,
        name: impl Into<String>,
    ) -> EnvResult<Self> {
        let filename = filename.as_ref().to_path_buf();
        let parse_error = |source| EnvError::ConfigParse {
            path: filename.clone(),
            source,
        };

        let document: EnvironmentDocument = if content.trim().is_empty() {
            EnvironmentDocument::default()
        } else {
            match serde_yaml::from_str::<Value>(content).map_err(parse_error)? {
                Value::Null => EnvironmentDocument::default(),
                value => serde_yaml::from_value(value).map_err(parse_error)?,
            }
        };

        let defaults = document.defaults.unwrap_or_default();
        let network_tier = network_defaults().overlay(defaults.network.unwrap_or_default());
        let instance_tier = instance_defaults().overlay(defaults.instance.unwrap_or_default());

        let mut networks = Vec::new();
        for (network_name, value) in entries(document.networks, "network")? {
            let fields: NetworkFields = from_entry(value, &filename)?;
            let network = network_tier.clone().overlay(fields).resolve(&network_name);
            debug!("Loaded network '{}': {:?}", network_name, network);
            networks.push(network);
        }

        let mut instances = Vec::new();
        for (instance_key, value) in entries(document.instances, "instance")? {
            let fields: InstanceFields = from_entry(value, &filename)?;
            let instance = instance_tier.clone().overlay(fields).resolve(&instance_key)?;
            for attachment in &instance.networks {
                debug!(
                    "Adding instance '{}' to network '{}'",
                    instance_key, attachment.network
                );
            }
            instances.push(instance);
        }

        let mut provisioners = Vec::new();
        for (provisioner_name, value) in entries(document.provisioners, "provisioner")? {
            let mut provisioner: Provisioner = serde_yaml::from_value(value).map_err(parse_error)?;
            provisioner.name = provisioner_name;
            debug!("Loaded provisioner '{}' of type '{}'", provisioner.name, provisioner.kind);
            provisioners.push(provisioner);
        }

        Ok(Self {
            name: name.into(),
            filename,
            networks,
            instances,
            provisioners,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Directory that relative provisioner paths are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.filename.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn provisioners(&self) -> &[Provisioner] {
        &self.provisioners
    }

    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name == name)
    }

    pub fn instance(&self, key: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.key == key)
    }

    pub fn provisioner(&self, name: &str) -> Option<&Provisioner> {
        self.provisioners.iter().find(|p| p.name == name)
    }
}

/// Split a top-level section into `(key, value)` pairs, keeping file order.
fn entries(section: Option<Mapping>, kind: &'static str) -> EnvResult<Vec<(String, Value)>> {
    section
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| match key {
            Value::String(key) => Ok((key, value)),
            other => Err(EnvError::invalid(
                kind,
                format!("{:?}", other),
                "entry names must be strings",
            )),
        })
        .collect()
}

/// Deserialize one entry; an empty entry (`net1:`) means "no explicit fields".
fn from_entry<T>(value: Value, filename: &Path) -> EnvResult<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_yaml::from_value(value).map_err(|source| EnvError::ConfigParse {
        path: filename.to_path_buf(),
        source,
    })
}
