//! Named, typed resource declarations.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::value::Value;

pub const KEYPAIR: &str = "OS::Nova::KeyPair";
pub const SECURITY_GROUP: &str = "OS::Neutron::SecurityGroup";
pub const NET: &str = "OS::Neutron::Net";
pub const SUBNET: &str = "OS::Neutron::Subnet";
pub const ROUTER: &str = "OS::Neutron::Router";
pub const ROUTER_INTERFACE: &str = "OS::Neutron::RouterInterface";
pub const SOFTWARE_CONFIG: &str = "OS::Heat::SoftwareConfig";
pub const SOFTWARE_DEPLOYMENT: &str = "OS::Heat::SoftwareDeployment";
pub const VOLUME: &str = "OS::Cinder::Volume";
pub const PORT: &str = "OS::Neutron::Port";
pub const FLOATING_IP: &str = "OS::Neutron::FloatingIP";
pub const SERVER: &str = "OS::Nova::Server";

/// A single resource declaration inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    pub name: String,
    pub kind: String,
    pub properties: BTreeMap<String, Value>,
    /// Identifier assigned by the orchestration service, if known.
    pub id: Option<String>,
    pub status: String,
}

/// `{type, properties}` body of a template resource.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateResource<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub properties: &'a BTreeMap<String, Value>,
}

/// A resource as listed by a live stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackResource {
    pub status: String,
    pub name: String,
    pub resource_data: BTreeMap<String, String>,
    pub resource_id: String,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: BTreeMap<String, String>,
}

impl ResourceNode {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            properties: BTreeMap::new(),
            id: None,
            status: "COMPLETE".to_string(),
        }
    }

    /// Set a property, replacing any previous value.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Render as `{name: {type, properties}}`.
    pub fn template_fragment(&self) -> BTreeMap<&str, TemplateResource<'_>> {
        let mut fragment = BTreeMap::new();
        fragment.insert(
            self.name.as_str(),
            TemplateResource {
                kind: &self.kind,
                properties: &self.properties,
            },
        );
        fragment
    }

    /// Render as a live stack resource listing entry; empty without an id.
    pub fn stack_fragment(&self) -> BTreeMap<String, StackResource> {
        let mut fragment = BTreeMap::new();
        if let Some(id) = &self.id {
            fragment.insert(
                self.name.clone(),
                StackResource {
                    status: self.status.clone(),
                    name: self.name.clone(),
                    resource_data: BTreeMap::new(),
                    resource_id: id.clone(),
                    action: "CREATE".to_string(),
                    kind: self.kind.clone(),
                    metadata: BTreeMap::new(),
                },
            );
        }
        fragment
    }

    /// Names of resources referenced by this node's properties.
    pub fn references(&self) -> Vec<&str> {
        self.properties.values().flat_map(Value::references).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_fragment() {
        let node = ResourceNode::new("net_a", NET).property("name", "demo_a");
        let json = serde_json::to_value(node.template_fragment()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"net_a": {"type": "OS::Neutron::Net", "properties": {"name": "demo_a"}}})
        );
    }

    #[test]
    fn test_stack_fragment_requires_id() {
        let node = ResourceNode::new("router", ROUTER);
        assert!(node.stack_fragment().is_empty());

        let node = node.with_id("0b7c");
        let fragment = node.stack_fragment();
        let entry = &fragment["router"];
        assert_eq!(entry.resource_id, "0b7c");
        assert_eq!(entry.status, "COMPLETE");
        assert_eq!(entry.action, "CREATE");
        assert_eq!(entry.kind, ROUTER);
    }

    #[test]
    fn test_node_references() {
        let node = ResourceNode::new("subnet_a", SUBNET)
            .property("network_id", Value::resource("net_a"))
            .property("cidr", "10.0.0.0/24");
        assert_eq!(node.references(), vec!["net_a"]);
    }
}
