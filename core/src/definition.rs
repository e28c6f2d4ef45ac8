//! Serializable registry definitions.
//!
//! A [`RegistryDefinition`] is the plain-data form of an
//! [`OptionRegistry`](crate::OptionRegistry): ungrouped option specs plus
//! group specs. It is what gets stored in JSON and loaded back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{DefinitionError, GroupSpec, OptionSpec};

/// Plain-data description of a registry.
///
/// # Examples
///
/// ```
/// use optline_core::*;
///
/// let json = r#"{
///     "options": [
///         {"short": "v", "long": "verbose"},
///         {"short": "o", "arity": {"exactly": 1}, "value_kind": "file", "required": true}
///     ],
///     "groups": [
///         {"options": [{"long": "left"}, {"long": "right"}], "required": true}
///     ]
/// }"#;
///
/// let definition: RegistryDefinition = serde_json::from_str(json).unwrap();
/// assert_eq!(definition.options.len(), 2);
///
/// let registry = OptionRegistry::from_definition(definition).unwrap();
/// assert_eq!(registry.len(), 4);
/// assert_eq!(registry.required_groups().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDefinition {
    /// Options that belong to no group.
    pub options: Vec<OptionSpec>,
    /// Groups together with their member options.
    pub groups: Vec<GroupSpec>,
}

impl RegistryDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }
}

/// Errors from loading a serialized registry.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid option definition: {0}")]
    Definition(#[from] DefinitionError),
}
