//! Property values with first-class symbolic references.
//!
//! References to other resources and to template parameters are kept as
//! dedicated variants and only turned into the target syntax
//! (`get_resource`, `get_attr`, `get_param`) at serialization time.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A semi-structured property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Runtime identifier of another resource.
    Resource(String),
    /// Runtime attribute of another resource.
    Attribute { resource: String, attribute: String },
    /// Value of a template parameter.
    Parameter(String),
}

impl Value {
    pub fn resource(name: impl Into<String>) -> Self {
        Value::Resource(name.into())
    }

    pub fn attribute(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Value::Attribute {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Value::Parameter(name.into())
    }

    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Names of all resources referenced anywhere inside this value.
    pub fn references(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            Value::Resource(name) => found.push(name),
            Value::Attribute { resource, .. } => found.push(resource),
            Value::List(items) => items.iter().for_each(|v| v.collect_references(found)),
            Value::Map(map) => map.values().for_each(|v| v.collect_references(found)),
            _ => {}
        }
    }

    /// Names of all template parameters referenced inside this value.
    pub fn parameters(&self) -> Vec<&str> {
        match self {
            Value::Parameter(name) => vec![name.as_str()],
            Value::List(items) => items.iter().flat_map(Value::parameters).collect(),
            Value::Map(map) => map.values().flat_map(Value::parameters).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// `get_attr: [resource, attribute]`
struct AttributePath<'a>(&'a str, &'a str);

impl Serialize for AttributePath<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.0)?;
        seq.serialize_element(self.1)?;
        seq.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Resource(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("get_resource", name)?;
                map.end()
            }
            Value::Attribute { resource, attribute } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("get_attr", &AttributePath(resource, attribute))?;
                map.end()
            }
            Value::Parameter(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("get_param", name)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_are_native_mappings() {
        let yaml = serde_yaml::to_string(&Value::resource("net_a")).unwrap();
        assert_eq!(yaml.trim(), "get_resource: net_a");

        let json = serde_json::to_value(Value::attribute("keypair", "private_key")).unwrap();
        assert_eq!(json, serde_json::json!({"get_attr": ["keypair", "private_key"]}));

        let json = serde_json::to_value(Value::parameter("external_network")).unwrap();
        assert_eq!(json, serde_json::json!({"get_param": "external_network"}));
    }

    #[test]
    fn test_reference_like_strings_stay_literal() {
        let json = serde_json::to_value(Value::from("{ get_resource: x }")).unwrap();
        assert_eq!(json, serde_json::json!("{ get_resource: x }"));
        assert!(Value::from("{ get_resource: x }").references().is_empty());
    }

    #[test]
    fn test_nested_references() {
        let value = Value::map([
            ("network_id", Value::resource("net_a")),
            (
                "fixed_ips",
                Value::List(vec![Value::map([("subnet_id", Value::resource("subnet_a"))])]),
            ),
            ("floating", Value::attribute("floatingip_vm", "floating_ip_address")),
            ("gateway", Value::parameter("external_network")),
        ]);

        let mut refs = value.references();
        refs.sort();
        assert_eq!(refs, vec!["floatingip_vm", "net_a", "subnet_a"]);
        assert_eq!(value.parameters(), vec!["external_network"]);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(20u32)), Value::Integer(20));
    }
}
