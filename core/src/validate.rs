//! Option definition validation.
//!
//! Checks the structural invariants of option definitions before they reach
//! a registry: every option has a name, names only use characters that
//! cannot be confused with command-line syntax, and value counts are
//! positive. Registry-level invariants (unique names, one group per option)
//! are reported with the same [`DefinitionError`] type.
//!
//! # Examples
//!
//! ```
//! use optline_core::*;
//!
//! assert!(validate_spec(&OptionSpec::flag(Some('?'), Some("help"))).is_ok());
//!
//! // Quotes are not allowed in option names
//! let bad = OptionSpec::flag(Some('"'), None);
//! assert_eq!(validate_spec(&bad), Err(DefinitionError::InvalidShortName('"')));
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{Arity, OptionSpec, OptionalArity};

static LONG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[^\s\p{Cc}'"`=\-][^\s\p{Cc}'"`=]*$"#).expect("static regex must compile")
});

/// Option definition errors.
///
/// Each variant describes one rejected definition. The `Display` impl names
/// the offending option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// An option has neither a short nor a long name.
    #[error("option must define a short or long name")]
    MissingName,
    /// A short name is whitespace, a control character, a quote, `-` or `=`.
    #[error("invalid short option name: {0:?}")]
    InvalidShortName(char),
    /// A long name is empty, starts with `-` or contains a forbidden character.
    #[error("invalid long option name: {0:?}")]
    InvalidLongName(String),
    /// An exact value count of zero was declared.
    #[error("option {0} must take at least one value when declared with a value count")]
    InvalidArity(String),
    /// Two options share a short name.
    #[error("duplicate short option: -{0}")]
    DuplicateShort(char),
    /// Two options share a long name.
    #[error("duplicate long option: --{0}")]
    DuplicateLong(String),
    /// An option was added to a second group.
    #[error("option {0} already belongs to a group")]
    AlreadyGrouped(String),
    /// A group refers to an option id the registry never handed out.
    #[error("option #{0} is not registered")]
    UnknownOption(usize),
}

/// Returns `true` if `ch` can be used as a short option name.
pub fn is_valid_short_name(ch: char) -> bool {
    !ch.is_whitespace() && !ch.is_control() && !matches!(ch, '\'' | '"' | '`' | '-' | '=')
}

/// Returns `true` if `name` can be used as a long option name.
pub fn is_valid_long_name(name: &str) -> bool {
    LONG_NAME_RE.is_match(name)
}

/// Validates a single option spec.
///
/// # Errors
///
/// Returns the first problem found: a missing name, an invalid short or
/// long name, or a zero value count.
pub fn validate_spec(spec: &OptionSpec) -> Result<(), DefinitionError> {
    if spec.short.is_none() && spec.long.is_none() {
        return Err(DefinitionError::MissingName);
    }

    if let Some(short) = spec.short {
        if !is_valid_short_name(short) {
            return Err(DefinitionError::InvalidShortName(short));
        }
    }

    if let Some(long) = &spec.long {
        if !is_valid_long_name(long) {
            return Err(DefinitionError::InvalidLongName(long.clone()));
        }
    }

    if matches!(
        spec.arity,
        Arity::Exactly(0) | Arity::Optional(OptionalArity::Exactly(0))
    ) {
        let name = spec
            .short
            .map(String::from)
            .or_else(|| spec.long.clone())
            .unwrap_or_default();
        return Err(DefinitionError::InvalidArity(name));
    }

    Ok(())
}
