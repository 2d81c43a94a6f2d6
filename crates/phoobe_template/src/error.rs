//! Error types for template synthesis.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while synthesizing or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("External network '{0}' not found")]
    ExternalNetworkNotFound(String),

    #[error("Provisioner '{provisioner}' not defined (referenced by instance '{instance}')")]
    ProvisionerNotDefined { provisioner: String, instance: String },

    #[error("Network '{network}' not defined (referenced by instance '{instance}')")]
    NetworkNotDefined { network: String, instance: String },

    #[error("No network lookup available to resolve external network '{0}'")]
    LookupUnavailable(String),

    #[error("Network lookup failed: {0}")]
    Lookup(String),

    #[error("Duplicate resource name: {0}")]
    DuplicateResource(String),

    #[error("Failed to read provisioner script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Instance '{0}' has no public address")]
    InstanceUnreachable(String),

    #[error("Environment error: {0}")]
    Env(#[from] phoobe_env::EnvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
