//! # phoobe_template
//!
//! Synthesis of orchestration (Heat) templates from a phoobe environment.
//!
//! This crate turns a merged [`phoobe_env::Environment`] into a graph of
//! typed resource declarations that reference each other by name, and
//! renders that graph as a template document.
//!
//! ## Features
//!
//! - Keypair, security group, networks, subnets and a shared router
//! - Per-instance ports, optional boot volumes and floating IPs
//! - Shell provisioners embedded as software config and deployments
//! - Standalone mode resolving the external network through a [`NetworkLookup`]
//! - YAML and JSON document output with native reference syntax
//!
//! ## Example
//!
//! ```rust,no_run
//! use phoobe_env::Environment;
//! use phoobe_template::{DocumentFormat, SynthesisOptions, TemplateRenderer, TemplateSynthesizer};
//!
//! let env = Environment::load("environment.yaml", "demo").unwrap();
//! let template = TemplateSynthesizer::new(&env, SynthesisOptions::default())
//!     .synthesize()
//!     .unwrap();
//!
//! let document = TemplateRenderer::new(DocumentFormat::Yaml)
//!     .render(&template)
//!     .unwrap();
//! println!("{}", document);
//! ```

pub mod error;
pub mod lookup;
pub mod outputs;
pub mod renderer;
pub mod resource;
pub mod synthesizer;
pub mod template;
pub mod value;

pub use error::{TemplateError, TemplateResult};
pub use lookup::{NetworkLookup, NetworkRef, StaticNetworkLookup};
pub use outputs::{StackOutput, StackOutputs};
pub use renderer::{DocumentFormat, TemplateRenderer};
pub use resource::{ResourceNode, StackResource};
pub use synthesizer::{SynthesisOptions, TemplateSynthesizer, EXTERNAL_NETWORK_PARAMETER};
pub use template::{Output, Parameter, Template};
pub use value::Value;
