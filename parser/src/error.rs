//! Error types for parsing, coercion and configuration.
//!
//! Every parse failure rejects the whole command line; no partial result is
//! returned alongside an error.

use std::fmt;

use optline_core::ValueKind;
use thiserror::Error;

/// A required option or group that was not satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingOption {
    /// A required option, by key.
    Option(String),
    /// A required group, by the keys of its members.
    Group(Vec<String>),
}

impl fmt::Display for MissingOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingOption::Option(key) => f.write_str(key),
            MissingOption::Group(members) => write!(f, "[{}]", members.join(", ")),
        }
    }
}

fn describe_missing(missing: &[MissingOption]) -> String {
    let list = missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    match missing.len() {
        1 => format!("option: {list}"),
        _ => format!("options: {list}"),
    }
}

/// Errors raised while matching a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// An option-like argument names no registered option.
    #[error("unrecognized option: {token}")]
    UnrecognizedOption { token: String },

    /// An option was closed before it collected its minimum value count.
    #[error("missing argument for option: {option}")]
    MissingArgument { option: String },

    /// Required options or groups were absent. Carries every one of them.
    #[error("missing required {}", describe_missing(.missing))]
    MissingOptions { missing: Vec<MissingOption> },

    /// A second member of a mutually exclusive group was given.
    #[error("option {option} cannot be used together with {selected}")]
    AlreadySelected { option: String, selected: String },

    /// A long-option prefix matches several long names.
    #[error("ambiguous option: {token} could be {}", .candidates.join(", "))]
    AmbiguousOption {
        token: String,
        candidates: Vec<String>,
    },

    /// A default value names an option that is not registered.
    #[error("default given for undefined option: {0}")]
    UndefinedDefault(String),
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised when converting a value to its [`ValueKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// The kind is known but has no conversion.
    #[error("conversion to {kind} is not supported")]
    Unsupported { kind: ValueKind },

    /// The value could not be converted.
    #[error("cannot convert {value:?} to {kind}: {reason}")]
    Failed {
        value: String,
        kind: ValueKind,
        reason: String,
    },
}

impl CoercionError {
    pub(crate) fn failed(value: &str, kind: ValueKind, reason: impl ToString) -> Self {
        CoercionError::Failed {
            value: value.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Errors raised while loading a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_options_message_lists_everything() {
        let err = ParseError::MissingOptions {
            missing: vec![
                MissingOption::Option("n".to_string()),
                MissingOption::Group(vec!["l".to_string(), "r".to_string()]),
            ],
        };
        assert_eq!(err.to_string(), "missing required options: n, [l, r]");

        let err = ParseError::MissingOptions {
            missing: vec![MissingOption::Option("n".to_string())],
        };
        assert_eq!(err.to_string(), "missing required option: n");
    }

    #[test]
    fn test_error_messages_name_the_option() {
        let err = ParseError::AmbiguousOption {
            token: "--ver".to_string(),
            candidates: vec!["--verbose".to_string(), "--version".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous option: --ver could be --verbose, --version"
        );

        let err = CoercionError::Unsupported {
            kind: ValueKind::Date,
        };
        assert_eq!(err.to_string(), "conversion to date is not supported");
    }
}
