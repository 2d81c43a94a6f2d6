//! Template synthesis from an environment.
//!
//! Resources are declared in a fixed order: keypair, security group,
//! networks (with subnets and router interfaces), router, software configs,
//! then one group of resources per instance. All cross-resource links are
//! [`Value`] references by name.

use std::collections::HashMap;
use std::fs;

use tracing::{debug, info, warn};

use phoobe_env::{Environment, Instance, Network};

use crate::error::{TemplateError, TemplateResult};
use crate::lookup::NetworkLookup;
use crate::resource::{self, ResourceNode};
use crate::template::Template;
use crate::value::Value;

pub const EXTERNAL_NETWORK_PARAMETER: &str = "external_network";
pub const PRIVATE_KEY_OUTPUT: &str = "private_ssh_key";
pub const FLOATING_IP_OUTPUT_PREFIX: &str = "floatingip_";

const KEYPAIR: &str = "keypair";
const SECURITY_GROUP: &str = "security_group";
const ROUTER: &str = "router";

/// Synthesis mode flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisOptions {
    /// Resolve external networks through a lookup instead of a parameter.
    pub standalone: bool,
    /// Embed shell provisioners as software config/deployment resources.
    pub use_software_config: bool,
}

impl SynthesisOptions {
    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn use_software_config(mut self, enabled: bool) -> Self {
        self.use_software_config = enabled;
        self
    }
}

/// Builds a [`Template`] from an [`Environment`].
pub struct TemplateSynthesizer<'a> {
    environment: &'a Environment,
    lookup: Option<&'a dyn NetworkLookup>,
    options: SynthesisOptions,
}

impl<'a> TemplateSynthesizer<'a> {
    pub fn new(environment: &'a Environment, options: SynthesisOptions) -> Self {
        Self {
            environment,
            lookup: None,
            options,
        }
    }

    /// Set the lookup used to resolve external networks in standalone mode.
    pub fn with_lookup(mut self, lookup: &'a dyn NetworkLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Build the complete template. On error nothing is returned.
    pub fn synthesize(&self) -> TemplateResult<Template> {
        info!(
            "Synthesizing template for environment '{}' (standalone: {}, software config: {})",
            self.environment.name(),
            self.options.standalone,
            self.options.use_software_config
        );

        let mut context = BuildContext {
            environment: self.environment,
            lookup: self.lookup,
            options: self.options,
            template: Template::new(),
            external_network: None,
            resolved: HashMap::new(),
        };

        context.add_keypair()?;
        context.add_security_group()?;
        for network in self.environment.networks() {
            context.add_network(network)?;
        }
        context.add_router()?;
        if self.options.use_software_config {
            context.add_software_configs()?;
        }
        for instance in self.environment.instances() {
            context.add_instance(instance)?;
        }

        let template = context.template;
        info!(
            "Synthesized {} resources, {} parameters, {} outputs",
            template.resources().len(),
            template.parameters().len(),
            template.outputs().len()
        );
        Ok(template)
    }
}

/// State that only lives for one synthesis run.
struct BuildContext<'a> {
    environment: &'a Environment,
    lookup: Option<&'a dyn NetworkLookup>,
    options: SynthesisOptions,
    template: Template,
    /// The template-wide external network; last routed network wins.
    external_network: Option<String>,
    /// External network ids already resolved in standalone mode.
    resolved: HashMap<String, String>,
}

impl BuildContext<'_> {
    fn display_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.environment.name(), suffix)
    }

    fn add(&mut self, node: ResourceNode) -> TemplateResult<()> {
        debug!("Adding resource '{}' ({})", node.name, node.kind);
        self.template.add_resource(node)
    }

    fn add_keypair(&mut self) -> TemplateResult<()> {
        let keypair = ResourceNode::new(KEYPAIR, resource::KEYPAIR)
            .property("name", self.display_name(KEYPAIR))
            .property("save_private_key", true);
        self.add(keypair)?;
        self.template.add_output(
            PRIVATE_KEY_OUTPUT,
            Value::attribute(KEYPAIR, "private_key"),
            "Private SSH key",
        );
        Ok(())
    }

    fn add_security_group(&mut self) -> TemplateResult<()> {
        let rules = Value::List(vec![
            Value::map([("protocol", Value::from("icmp"))]),
            Value::map([
                ("protocol", Value::from("tcp")),
                ("port_range_min", Value::Integer(22)),
                ("port_range_max", Value::Integer(22)),
            ]),
        ]);
        let group = ResourceNode::new(SECURITY_GROUP, resource::SECURITY_GROUP)
            .property("name", self.display_name(SECURITY_GROUP))
            .property("description", "Allow SSH and ICMP")
            .property("rules", rules);
        self.add(group)
    }

    fn add_network(&mut self, network: &Network) -> TemplateResult<()> {
        let net_name = format!("net_{}", network.name);
        let subnet_name = format!("subnet_{}", network.name);

        let net = ResourceNode::new(&net_name, resource::NET)
            .property("name", self.display_name(&network.name));
        self.add(net)?;

        // CIDR is passed through unchecked
        let subnet = ResourceNode::new(&subnet_name, resource::SUBNET)
            .property("name", self.display_name(&subnet_name))
            .property("cidr", network.cidr.clone())
            .property("network_id", Value::resource(&net_name));
        self.add(subnet)?;

        if network.is_routed() {
            let interface = ResourceNode::new(format!("router_interface_{}", subnet_name), resource::ROUTER_INTERFACE)
                .property("router_id", Value::resource(ROUTER))
                .property("subnet_id", Value::resource(&subnet_name));
            self.add(interface)?;

            // Only one external network per template
            if let Some(external) = &network.external {
                if let Some(previous) = self.external_network.as_ref().filter(|p| *p != external) {
                    warn!(
                        "Network '{}' replaces external network '{}' with '{}'",
                        network.name, previous, external
                    );
                }
                self.external_network = Some(external.clone());
            }
        }
        Ok(())
    }

    fn add_router(&mut self) -> TemplateResult<()> {
        let mut router = ResourceNode::new(ROUTER, resource::ROUTER)
            .property("name", self.display_name(ROUTER));
        if let Some(external) = self.external_network.clone() {
            let network = self.external_network_value(&external)?;
            router = router.property("external_gateway_info", Value::map([("network", network)]));
        }
        self.add(router)
    }

    fn add_software_configs(&mut self) -> TemplateResult<()> {
        let environment = self.environment;
        for provisioner in environment.provisioners().iter().filter(|p| p.is_shell()) {
            let config = match &provisioner.path {
                Some(path) => {
                    let script = environment.base_dir().join(path);
                    debug!("Reading provisioner script {:?}", script);
                    fs::read_to_string(&script)
                        .map_err(|source| TemplateError::ScriptRead { path: script, source })?
                }
                None => String::new(),
            };
            let software_config = ResourceNode::new(
                format!("software_config_{}", provisioner.name),
                resource::SOFTWARE_CONFIG,
            )
            .property("group", "script")
            .property("config", config);
            self.add(software_config)?;
        }
        Ok(())
    }

    fn add_instance(&mut self, instance: &Instance) -> TemplateResult<()> {
        let environment = self.environment;
        let key = instance.key.as_str();
        let mut server = ResourceNode::new(key, resource::SERVER)
            .property("name", self.display_name(&instance.name))
            .property("flavor", instance.flavor.as_str())
            .property("key_name", Value::resource(KEYPAIR));

        match instance.volume {
            Some(size) => {
                let volume_name = format!("volume_{}", key);
                let volume = ResourceNode::new(&volume_name, resource::VOLUME)
                    .property("name", self.display_name(&volume_name))
                    .property("image", instance.image.clone())
                    .property("size", size);
                self.add(volume)?;
                let mapping = Value::map([
                    ("device_name", Value::from("vda")),
                    ("delete_on_termination", Value::Bool(true)),
                    ("volume_id", Value::resource(&volume_name)),
                ]);
                server = server.property("block_device_mapping", Value::List(vec![mapping]));
            }
            None => {
                server = server.property("image", instance.image.clone());
            }
        }

        let mut ports = Vec::new();
        for attachment in &instance.networks {
            if environment.network(&attachment.network).is_none() {
                return Err(TemplateError::NetworkNotDefined {
                    network: attachment.network.clone(),
                    instance: key.to_string(),
                });
            }
            let port_name = port_name(key, &attachment.network);

            // Fixed addresses are not checked against the subnet CIDR
            let mut fixed_ip = vec![("subnet_id", Value::resource(format!("subnet_{}", attachment.network)))];
            if let Some(address) = &attachment.address {
                fixed_ip.push(("ip_address", Value::from(address.as_str())));
            }

            let port = ResourceNode::new(&port_name, resource::PORT)
                .property("name", self.display_name(&port_name))
                .property("network_id", Value::resource(format!("net_{}", attachment.network)))
                .property(
                    "security_groups",
                    Value::List(vec![Value::from("default"), Value::resource(SECURITY_GROUP)]),
                )
                .property("fixed_ips", Value::List(vec![Value::map(fixed_ip)]));
            self.add(port)?;
            ports.push(Value::map([("port", Value::resource(&port_name))]));
        }
        server = server.property("networks", Value::List(ports));

        let external = instance
            .external_network(self.external_network.as_deref())
            .map(str::to_string);
        if let (Some(external), Some(primary)) = (external, instance.primary_network()) {
            let floating_name = format!("{}{}", FLOATING_IP_OUTPUT_PREFIX, key);
            let floating_network = self.external_network_value(&external)?;
            let floating_ip = ResourceNode::new(&floating_name, resource::FLOATING_IP)
                .property("port_id", Value::resource(port_name(key, &primary.network)))
                .property("floating_network_id", floating_network);
            self.add(floating_ip)?;
            self.template.add_output(
                floating_name.as_str(),
                Value::attribute(&floating_name, "floating_ip_address"),
                format!("Floating IP address of instance {}", key),
            );
        }

        for provisioner_name in &instance.provisioners {
            let provisioner = environment.provisioner(provisioner_name).ok_or_else(|| {
                TemplateError::ProvisionerNotDefined {
                    provisioner: provisioner_name.clone(),
                    instance: key.to_string(),
                }
            })?;
            if provisioner.is_shell() && self.options.use_software_config {
                let deployment = ResourceNode::new(
                    format!("software_deployment_{}_{}", provisioner_name, key),
                    resource::SOFTWARE_DEPLOYMENT,
                )
                .property("config", Value::resource(format!("software_config_{}", provisioner_name)))
                .property("server", Value::resource(key));
                self.add(deployment)?;
                server = server.property("user_data_format", "SOFTWARE_CONFIG");
            }
        }

        self.add(server)
    }

    /// The value to use wherever the external network id is needed.
    fn external_network_value(&mut self, name: &str) -> TemplateResult<Value> {
        if self.options.standalone {
            return self.resolve_external_network(name).map(Value::String);
        }
        if self.template.add_parameter(
            EXTERNAL_NETWORK_PARAMETER,
            "string",
            "UUID of the external network",
        ) {
            debug!("Declared parameter '{}' for external network '{}'", EXTERNAL_NETWORK_PARAMETER, name);
        }
        Ok(Value::parameter(EXTERNAL_NETWORK_PARAMETER))
    }

    fn resolve_external_network(&mut self, name: &str) -> TemplateResult<String> {
        if let Some(id) = self.resolved.get(name) {
            return Ok(id.clone());
        }
        let lookup = self
            .lookup
            .ok_or_else(|| TemplateError::LookupUnavailable(name.to_string()))?;
        let network = lookup
            .find_network(name)?
            .ok_or_else(|| TemplateError::ExternalNetworkNotFound(name.to_string()))?;
        debug!("Resolved external network '{}' to {}", name, network.id);
        self.resolved.insert(name.to_string(), network.id.clone());
        Ok(network.id)
    }
}

fn port_name(instance: &str, network: &str) -> String {
    format!("port_{}_{}", instance, network)
}
