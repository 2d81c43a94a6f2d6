//! Template document rendering.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::TemplateResult;
use crate::template::Template;

/// Output document formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    #[default]
    Yaml,
    Json,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "yaml",
            DocumentFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serializes templates to documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRenderer {
    format: DocumentFormat,
}

impl TemplateRenderer {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Render the template to a string.
    pub fn render(&self, template: &Template) -> TemplateResult<String> {
        let document = match self.format {
            DocumentFormat::Yaml => serde_yaml::to_string(template)?,
            DocumentFormat::Json => {
                let mut json = serde_json::to_string_pretty(template)?;
                json.push('\n');
                json
            }
        };
        Ok(document)
    }

    /// Render and write the template in one go; nothing is written on failure.
    pub fn render_to_file(&self, template: &Template, path: &Path) -> TemplateResult<()> {
        let document = self.render(template)?;
        fs::write(path, document)?;
        info!("Wrote {} template to {:?}", self.format, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceNode, NET, SUBNET};
    use crate::value::Value;

    fn sample() -> Template {
        let mut template = Template::new();
        template
            .add_resource(ResourceNode::new("net_a", NET).property("name", "demo_a"))
            .unwrap();
        template
            .add_resource(
                ResourceNode::new("subnet_a", SUBNET)
                    .property("network_id", Value::resource("net_a"))
                    .property("cidr", "10.0.0.0/24"),
            )
            .unwrap();
        template
    }

    #[test]
    fn test_yaml_contains_unquoted_references() {
        let yaml = TemplateRenderer::new(DocumentFormat::Yaml).render(&sample()).unwrap();
        assert!(yaml.contains("get_resource: net_a"));
        assert!(!yaml.contains("'{"));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed["resources"]["subnet_a"]["properties"]["network_id"]["get_resource"],
            serde_yaml::Value::from("net_a")
        );
        assert_eq!(parsed["description"], serde_yaml::Value::from("Phoobe generated heat template"));
    }

    #[test]
    fn test_json_document() {
        let json = TemplateRenderer::new(DocumentFormat::Json).render(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["heat_template_version"], "2013-05-23");
        assert_eq!(parsed["resources"]["net_a"]["type"], "OS::Neutron::Net");
        assert!(parsed["parameters"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(DocumentFormat::from_str("YML"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_str("json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_str("toml"), None);
    }
}
