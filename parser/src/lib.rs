//! Command-line parsing against an option registry.
//!
//! This crate matches a raw argument vector against an
//! [`OptionRegistry`](optline_core::OptionRegistry) and produces a
//! [`ParseResult`]: the options present, their values and the leftover
//! positional arguments.
//!
//! # Architecture
//!
//! Parsing runs in two layers. The [`Tokenizer`] classifies each argument
//! as a registered option, an unknown or ambiguous option-like string or a
//! plain value, splitting bundles such as `-abc`, `--name=value` and
//! `-DJAVA_HOME=/opt`.
//! The matcher then walks the tokens as a small state machine that either
//! scans for the next option or collects values for the option it just
//! opened, honouring each option's [`Arity`](optline_core::Arity) and value
//! separator. Group exclusivity, defaults and required options are settled
//! after the scan.
//!
//! Typed access to values goes through [`coerce`] and a [`TypeCatalog`].
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use optline_core::{Arity, GroupSpec, OptionRegistry, OptionSpec, ValueKind};
//! use optline_parser::{Parser, ParserConfig};
//!
//! let mut registry = OptionRegistry::new();
//! registry
//!     .add_option(OptionSpec::with_value(Some('n'), Some("count")).with_kind(ValueKind::Number))
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
//!             .with_option(OptionSpec::flag(Some('l'), Some("left")))
//!             .with_option(OptionSpec::flag(Some('r'), Some("right")))
//!             .required(),
//!     )
//!     .unwrap();
//!
//! let parser = Parser::with_config(ParserConfig::default().with_partial_matching(true));
//! let result = parser
//!     .parse(&registry, ["--cou", "3", "-DJAVA_HOME=/opt/java", "-l", "input.txt"])
//!     .unwrap();
//!
//! assert_eq!(result.value("count"), Some("3"));
//! assert_eq!(result.coerced_value('n').unwrap().unwrap().as_i64(), Some(3));
//! assert_eq!(result.values('D'), ["JAVA_HOME", "/opt/java"]);
//! assert!(result.has_option("left"));
//! assert_eq!(result.leftover(), ["input.txt"]);
//!
//! // Defaults fill in what the command line left out
//! let defaults = HashMap::from([("count".to_string(), "10".to_string())]);
//! let result = parser.parse_with_defaults(&registry, ["-r"], &defaults).unwrap();
//! assert_eq!(result.value('n'), Some("10"));
//! ```

mod coerce;
mod config;
mod error;
mod matcher;
mod result;
mod tokenizer;

use std::collections::HashMap;

use optline_core::OptionRegistry;

pub use coerce::{ClassRef, TypeCatalog, URL_SCHEMES, Value, coerce};
pub use config::ParserConfig;
pub use error::{CoercionError, ConfigError, MissingOption, ParseError, Result};
pub use result::{Occurrence, OptionQuery, ParseResult};
pub use tokenizer::{Token, Tokenizer};

use crate::matcher::Matcher;

/// Parses `args` against `registry`.
///
/// `defaults` maps option names to values used for options the command line
/// does not mention. With `stop_at_non_option`, the first argument that is
/// not a registered option ends option scanning and everything from it on
/// is leftover.
///
/// # Errors
///
/// Returns a [`ParseError`] for unknown or ambiguous options, missing option values,
/// conflicting group members, unknown default keys and absent required
/// options.
pub fn parse<I, S>(
    registry: &OptionRegistry,
    args: I,
    defaults: Option<&HashMap<String, String>>,
    stop_at_non_option: bool,
) -> Result<ParseResult>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let config = ParserConfig::default().with_stop_at_non_option(stop_at_non_option);
    Parser::with_config(config).run(registry, args, defaults)
}

/// A configured parser.
///
/// Parsers hold no per-call state and can be reused for any number of
/// command lines and registries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses `args` against `registry`.
    pub fn parse<I, S>(&self, registry: &OptionRegistry, args: I) -> Result<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(registry, args, None)
    }

    /// Parses `args`, taking values for absent options from `defaults`.
    pub fn parse_with_defaults<I, S>(
        &self,
        registry: &OptionRegistry,
        args: I,
        defaults: &HashMap<String, String>,
    ) -> Result<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(registry, args, Some(defaults))
    }

    fn run<I, S>(
        &self,
        registry: &OptionRegistry,
        args: I,
        defaults: Option<&HashMap<String, String>>,
    ) -> Result<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = Tokenizer::new(registry, args)
            .with_partial_matching(self.config.allow_partial_matching);
        Matcher::new(registry, self.config).run(tokens, defaults)
    }
}
