//! The assembled template: parameters, resources and outputs.

use std::collections::{BTreeMap, HashSet};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{TemplateError, TemplateResult};
use crate::resource::{ResourceNode, TemplateResource};
use crate::value::Value;

pub const HEAT_TEMPLATE_VERSION: &str = "2013-05-23";
pub const DEFAULT_DESCRIPTION: &str = "Phoobe generated heat template";

/// A template input parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A template output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub value: Value,
    pub description: String,
}

/// An orchestration template under construction or ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    description: String,
    parameters: BTreeMap<String, Parameter>,
    resources: Vec<ResourceNode>,
    outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    pub fn new() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            parameters: BTreeMap::new(),
            resources: Vec::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a resource. Names are unique within a template.
    pub fn add_resource(&mut self, resource: ResourceNode) -> TemplateResult<()> {
        if self.resource(&resource.name).is_some() {
            return Err(TemplateError::DuplicateResource(resource.name));
        }
        self.resources.push(resource);
        Ok(())
    }

    /// Declare a parameter once; returns `false` if it already existed.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        let name = name.into();
        if self.parameters.contains_key(&name) {
            return false;
        }
        self.parameters.insert(
            name,
            Parameter {
                kind: kind.into(),
                description: description.into(),
                default: None,
            },
        );
        true
    }

    pub fn add_output(&mut self, name: impl Into<String>, value: Value, description: impl Into<String>) {
        self.outputs.insert(
            name.into(),
            Output {
                value,
                description: description.into(),
            },
        );
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> &[ResourceNode] {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceNode> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn resources_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ResourceNode> + 'a {
        self.resources.iter().filter(move |r| r.kind == kind)
    }

    /// References in resources or outputs that name no declared resource.
    pub fn dangling_references(&self) -> Vec<String> {
        let declared: HashSet<&str> = self.resources.iter().map(|r| r.name.as_str()).collect();
        let from_resources = self.resources.iter().flat_map(ResourceNode::references);
        let from_outputs = self.outputs.values().flat_map(|o| o.value.references());
        from_resources
            .chain(from_outputs)
            .filter(|name| !declared.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Parameter references that name no declared parameter.
    pub fn undeclared_parameters(&self) -> Vec<String> {
        let from_resources = self
            .resources
            .iter()
            .flat_map(|r| r.properties.values().flat_map(Value::parameters));
        let from_outputs = self.outputs.values().flat_map(|o| o.value.parameters());
        from_resources
            .chain(from_outputs)
            .filter(|name| !self.parameters.contains_key(*name))
            .map(str::to_string)
            .collect()
    }
}

/// Resources keyed by name, in declaration order.
struct ResourceMap<'a>(&'a [ResourceNode]);

impl Serialize for ResourceMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for resource in self.0 {
            map.serialize_entry(
                &resource.name,
                &TemplateResource {
                    kind: &resource.kind,
                    properties: &resource.properties,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("heat_template_version", HEAT_TEMPLATE_VERSION)?;
        map.serialize_entry("description", &self.description)?;
        map.serialize_entry("parameters", &self.parameters)?;
        map.serialize_entry("resources", &ResourceMap(&self.resources))?;
        map.serialize_entry("outputs", &self.outputs)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{NET, SUBNET};

    #[test]
    fn test_duplicate_resource_rejected() {
        let mut template = Template::new();
        template.add_resource(ResourceNode::new("net_a", NET)).unwrap();
        let err = template.add_resource(ResourceNode::new("net_a", SUBNET)).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateResource(name) if name == "net_a"));
        assert_eq!(template.resources().len(), 1);
    }

    #[test]
    fn test_parameter_declared_once() {
        let mut template = Template::new();
        assert!(template.add_parameter("external_network", "string", "first"));
        assert!(!template.add_parameter("external_network", "string", "second"));
        assert_eq!(template.parameters()["external_network"].description, "first");
    }

    #[test]
    fn test_dangling_references() {
        let mut template = Template::new();
        template
            .add_resource(ResourceNode::new("subnet_a", SUBNET).property("network_id", Value::resource("net_a")))
            .unwrap();
        template.add_output("key", Value::attribute("keypair", "private_key"), "Private SSH key");

        let mut dangling = template.dangling_references();
        dangling.sort();
        assert_eq!(dangling, vec!["keypair", "net_a"]);

        template.add_resource(ResourceNode::new("net_a", NET)).unwrap();
        assert_eq!(template.dangling_references(), vec!["keypair"]);
    }

    #[test]
    fn test_document_key_order() {
        let mut template = Template::new();
        template.add_resource(ResourceNode::new("b", NET)).unwrap();
        template.add_resource(ResourceNode::new("a", NET)).unwrap();

        let json = serde_json::to_string(&template).unwrap();
        let version = json.find("heat_template_version").unwrap();
        let resources = json.find("\"resources\"").unwrap();
        let outputs = json.find("\"outputs\"").unwrap();
        assert!(version < resources && resources < outputs);
        assert!(json.find("\"b\"").unwrap() < json.find("\"a\"").unwrap());
    }
}
