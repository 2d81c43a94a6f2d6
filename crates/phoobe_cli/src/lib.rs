//! # phoobe_cli
//!
//! Settings and local state shared by the `phoobe` commands.

pub mod cache;
pub mod settings;

pub use cache::{CacheError, CacheResult, EnvironmentCache, EnvironmentRecord};
pub use settings::{Settings, SettingsError, SettingsResult};
