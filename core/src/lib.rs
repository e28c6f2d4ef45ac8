//! Option definitions for command-line parsing.
//!
//! This crate defines the data a command line is matched against:
//!
//! - [`OptionDescriptor`] — one option with short/long names, an [`Arity`],
//!   an optional value separator and a [`ValueKind`] for typed access.
//! - [`OptionGroup`] — a set of mutually exclusive options.
//! - [`OptionRegistry`] — every option and group of a command, with lookup
//!   by short and long name.
//! - [`RegistryDefinition`] — the serializable form of a registry.
//!
//! Descriptors are created from an [`OptionSpec`] in one validating step
//! ([`validate_spec`]). Registries can also be compiled from a mnemonic
//! pattern string with [`compile_pattern`].
//!
//! # Example
//!
//! ```
//! use optline_core::*;
//!
//! let mut registry = OptionRegistry::new();
//! registry
//!     .add_option(OptionSpec::flag(Some('v'), Some("verbose")).with_description("Talk more"))
//!     .unwrap();
//! registry
//!     .add_option(
//!         OptionSpec::with_value(Some('D'), None)
//!             .with_arity(Arity::Unbounded)
//!             .with_separator('='),
//!     )
//!     .unwrap();
//! registry
//!     .add_group(
//!         GroupSpec::new()
//!             .with_option(OptionSpec::flag(None, Some("fast")))
//!             .with_option(OptionSpec::flag(None, Some("small")))
//!             .required(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(registry.len(), 4);
//! assert!(registry.find("--fast").is_some());
//! assert!(registry.option(registry.by_short('D').unwrap()).arity().is_unbounded());
//! ```

mod definition;
mod pattern;
mod registry;
mod types;
mod validate;

pub use definition::{LoadError, RegistryDefinition};
pub use pattern::compile_pattern;
pub use registry::OptionRegistry;
pub use types::*;
pub use validate::{DefinitionError, is_valid_long_name, is_valid_short_name, validate_spec};
