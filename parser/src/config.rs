//! Parser behavior switches.
//!
//! # Example YAML
//!
//! ```yaml
//! stop_at_non_option: true
//! allow_unknown: false
//! allow_partial_matching: true
//! ```
//!
//! Missing keys fall back to `false`.

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings that change how a command line is matched.
///
/// # Examples
///
/// ```
/// use optline_parser::ParserConfig;
///
/// let config = ParserConfig::from_yaml_str("stop_at_non_option: true").unwrap();
/// assert!(config.stop_at_non_option);
/// assert!(!config.allow_partial_matching);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// End option scanning at the first argument that is not a registered
    /// option. That argument and everything after it become leftover.
    pub stop_at_non_option: bool,
    /// Keep unregistered option-like arguments as leftover instead of
    /// failing.
    pub allow_unknown: bool,
    /// Accept a unique prefix of a long name after `--`.
    pub allow_partial_matching: bool,
}

impl ParserConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the file cannot be read, or
    /// [`ConfigError::YamlError`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_stop_at_non_option(mut self, stop: bool) -> Self {
        self.stop_at_non_option = stop;
        self
    }

    pub fn with_allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn with_partial_matching(mut self, allow: bool) -> Self {
        self.allow_partial_matching = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allow_unknown: true\nallow_partial_matching: true").unwrap();

        let config = ParserConfig::load(file.path()).unwrap();
        assert_eq!(
            config,
            ParserConfig {
                stop_at_non_option: false,
                allow_unknown: true,
                allow_partial_matching: true,
            }
        );
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ParserConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let err = ParserConfig::load("/nonexistent/optline.yml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));

        let err = ParserConfig::from_yaml_str("allow_unknown: [").unwrap_err();
        assert!(matches!(err, ConfigError::YamlError(_)));
    }
}
