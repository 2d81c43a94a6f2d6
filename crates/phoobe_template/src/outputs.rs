//! Decoding of a created stack's outputs.
//!
//! A stack synthesized by this crate publishes the generated private key
//! and one floating address per externally reachable instance. This module
//! turns the orchestration service's output listing back into that shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};
use crate::synthesizer::{FLOATING_IP_OUTPUT_PREFIX, PRIVATE_KEY_OUTPUT};

/// One entry of a stack's output listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackOutput {
    pub output_key: String,
    pub output_value: String,
}

/// Addresses and key material published by a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackOutputs {
    addresses: BTreeMap<String, String>,
    private_key: Option<String>,
}

impl StackOutputs {
    pub fn from_outputs(outputs: &[StackOutput]) -> Self {
        let mut result = Self::default();
        for output in outputs {
            if let Some(instance) = output.output_key.strip_prefix(FLOATING_IP_OUTPUT_PREFIX) {
                result
                    .addresses
                    .insert(instance.to_string(), output.output_value.clone());
            } else if output.output_key == PRIVATE_KEY_OUTPUT {
                result.private_key = Some(output.output_value.clone());
            }
        }
        result
    }

    /// Public address of an instance.
    pub fn address(&self, instance: &str) -> TemplateResult<&str> {
        self.addresses
            .get(instance)
            .map(String::as_str)
            .ok_or_else(|| TemplateError::InstanceUnreachable(instance.to_string()))
    }

    pub fn addresses(&self) -> &BTreeMap<String, String> {
        &self.addresses
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }
}
