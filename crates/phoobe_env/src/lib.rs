//! # phoobe_env
//!
//! Environment model for phoobe: loads a declarative description of
//! networks, instances and provisioners and merges every entry with its
//! defaults.
//!
//! ## Overlay order
//!
//! For each network and instance the merged value is built from three tiers,
//! later tiers replacing top-level keys of earlier ones:
//!
//! 1. built-in defaults ([`defaults::get_defaults`])
//! 2. the environment's own `defaults` section
//! 3. the entry's explicit fields
//!
//! ## Example
//!
//! ```rust,no_run
//! use phoobe_env::Environment;
//!
//! let env = Environment::load("environment.yaml", "demo").unwrap();
//! for instance in env.instances() {
//!     println!("{} boots as {}", instance.key, instance.username);
//! }
//! ```

pub mod defaults;
pub mod environment;
pub mod error;
pub mod models;

pub use defaults::{get_defaults, KindDefaults, ResourceKind};
pub use environment::Environment;
pub use error::{EnvError, EnvResult};
pub use models::{
    Instance, InstanceFields, Network, NetworkAttachment, NetworkFields, Provisioner,
};
