//! Option definition types.
//!
//! This module defines the data model a command line is matched against.
//! An [`OptionDescriptor`] describes a single option, [`Arity`] says how many
//! values it consumes and [`ValueKind`] tags what its values convert to.
//! Descriptors are created from an [`OptionSpec`] parameter struct in a single
//! validating step, so there is no half-built state to reset after a failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{DefinitionError, validate_spec};

/// Type tag describing what an option value converts to.
///
/// Each kind has a single-character marker used by the mnemonic pattern
/// compiler (see [`compile_pattern`](crate::compile_pattern)).
///
/// # Examples
///
/// ```
/// use optline_core::ValueKind;
///
/// assert_eq!(ValueKind::from_pattern_char('%'), Some(ValueKind::Number));
/// assert_eq!(ValueKind::Url.pattern_char(), '/');
/// assert!(!ValueKind::Date.is_supported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Plain string, returned as-is.
    String,
    /// Instance of a named type created through its default constructor.
    Object,
    /// Integer or floating point number.
    Number,
    /// Calendar date. Recognized but not convertible.
    Date,
    /// Reference to a named type.
    Class,
    /// Path to a file that must exist and be readable.
    ExistingFile,
    /// Path to a file.
    File,
    /// Several file paths. Recognized but not convertible.
    Files,
    /// Well-formed URL.
    Url,
}

impl ValueKind {
    /// Maps a pattern marker character to its kind.
    pub fn from_pattern_char(ch: char) -> Option<Self> {
        let kind = match ch {
            ':' => ValueKind::String,
            '@' => ValueKind::Object,
            '%' => ValueKind::Number,
            '#' => ValueKind::Date,
            '+' => ValueKind::Class,
            '<' => ValueKind::ExistingFile,
            '>' => ValueKind::File,
            '*' => ValueKind::Files,
            '/' => ValueKind::Url,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the pattern marker character for this kind.
    pub fn pattern_char(self) -> char {
        match self {
            ValueKind::String => ':',
            ValueKind::Object => '@',
            ValueKind::Number => '%',
            ValueKind::Date => '#',
            ValueKind::Class => '+',
            ValueKind::ExistingFile => '<',
            ValueKind::File => '>',
            ValueKind::Files => '*',
            ValueKind::Url => '/',
        }
    }

    /// Returns `false` for kinds that are accepted in definitions but
    /// cannot be converted ([`Date`](ValueKind::Date) and
    /// [`Files`](ValueKind::Files)).
    pub fn is_supported(self) -> bool {
        !matches!(self, ValueKind::Date | ValueKind::Files)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Object => "object",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Class => "class",
            ValueKind::ExistingFile => "existing file",
            ValueKind::File => "file",
            ValueKind::Files => "files",
            ValueKind::Url => "url",
        };
        f.write_str(name)
    }
}

/// Value count of an option whose values may be left out entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalArity {
    /// Up to `n` values.
    Exactly(usize),
    /// Any number of values.
    Unbounded,
}

/// Number of values an option consumes.
///
/// # Examples
///
/// ```
/// use optline_core::{Arity, OptionalArity};
///
/// assert_eq!(Arity::Exactly(2).min_values(), 2);
/// assert_eq!(Arity::Exactly(2).max_values(), Some(2));
/// assert_eq!(Arity::Unbounded.min_values(), 1);
/// assert_eq!(Arity::Unbounded.max_values(), None);
///
/// let optional = Arity::Optional(OptionalArity::Exactly(1));
/// assert_eq!(optional.min_values(), 0);
/// assert!(optional.accepts_values());
/// assert!(!Arity::None.accepts_values());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// The option is a flag and takes no values (the default).
    #[default]
    None,
    /// The option takes exactly `n` values.
    Exactly(usize),
    /// The option takes one or more values.
    Unbounded,
    /// The option may appear without values.
    Optional(OptionalArity),
}

impl Arity {
    /// Returns `true` unless this is [`Arity::None`].
    pub fn accepts_values(self) -> bool {
        !matches!(self, Arity::None)
    }

    /// Minimum number of values a single occurrence must collect.
    pub fn min_values(self) -> usize {
        match self {
            Arity::None | Arity::Optional(_) => 0,
            Arity::Exactly(n) => n,
            Arity::Unbounded => 1,
        }
    }

    /// Maximum number of values a single occurrence may collect, `None` if
    /// unlimited.
    pub fn max_values(self) -> Option<usize> {
        match self {
            Arity::None => Some(0),
            Arity::Exactly(n) | Arity::Optional(OptionalArity::Exactly(n)) => Some(n),
            Arity::Unbounded | Arity::Optional(OptionalArity::Unbounded) => None,
        }
    }

    /// Returns `true` for the optional forms.
    pub fn is_optional(self) -> bool {
        matches!(self, Arity::Optional(_))
    }

    /// Returns `true` if the value count is unlimited.
    pub fn is_unbounded(self) -> bool {
        self.max_values().is_none()
    }

    /// Returns `true` if the option can hold two or more values.
    pub fn is_multi_valued(self) -> bool {
        self.max_values().is_none_or(|max| max >= 2)
    }
}

/// Parameters for creating an [`OptionDescriptor`].
///
/// All fields are public so a spec can be written as a struct literal or
/// loaded with serde. The `with_*` methods are shorthands that return an
/// updated copy.
///
/// # Examples
///
/// ```
/// use optline_core::{Arity, OptionSpec, ValueKind};
///
/// let spec = OptionSpec::with_value(Some('o'), Some("output"))
///     .with_kind(ValueKind::File)
///     .with_description("Write output to FILE")
///     .required();
/// assert_eq!(spec.arity, Arity::Exactly(1));
/// assert!(spec.required);
///
/// let descriptor = spec.build().unwrap();
/// assert_eq!(descriptor.key(), "o");
/// assert_eq!(descriptor.display_name(), "-o");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSpec {
    /// Single-character name, matched as `-x`.
    pub short: Option<char>,
    /// Long name, matched as `--name`.
    pub long: Option<String>,
    /// How many values the option consumes.
    pub arity: Arity,
    /// Character that splits one raw value into several values.
    pub value_separator: Option<char>,
    /// Whether parsing fails when the option is absent.
    pub required: bool,
    /// Conversion applied by typed value access.
    pub value_kind: Option<ValueKind>,
    /// Help text, only read by help renderers.
    pub description: Option<String>,
}

impl OptionSpec {
    /// Creates a spec for a flag (no values).
    pub fn flag(short: Option<char>, long: Option<&str>) -> Self {
        Self {
            short,
            long: long.map(String::from),
            ..Default::default()
        }
    }

    /// Creates a spec for an option taking exactly one value.
    pub fn with_value(short: Option<char>, long: Option<&str>) -> Self {
        Self {
            short,
            long: long.map(String::from),
            arity: Arity::Exactly(1),
            ..Default::default()
        }
    }

    /// Sets the long name.
    pub fn with_long(mut self, long: &str) -> Self {
        self.long = Some(long.to_string());
        self
    }

    /// Sets the arity.
    pub fn with_arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Sets the value separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.value_separator = Some(separator);
        self
    }

    /// Sets the value kind.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Validates the spec and creates the descriptor.
    pub fn build(self) -> Result<OptionDescriptor, DefinitionError> {
        OptionDescriptor::new(self)
    }
}

/// A validated option definition.
///
/// Descriptors are immutable once created; the parser only reads them and
/// keeps collected values in its own per-call state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OptionSpec", into = "OptionSpec")]
pub struct OptionDescriptor {
    short: Option<char>,
    long: Option<String>,
    arity: Arity,
    value_separator: Option<char>,
    required: bool,
    value_kind: Option<ValueKind>,
    description: Option<String>,
}

impl OptionDescriptor {
    /// Validates `spec` and creates a descriptor from it.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if neither name is set, a name contains
    /// characters that are not allowed, or the arity asks for zero values.
    ///
    /// # Examples
    ///
    /// ```
    /// use optline_core::{DefinitionError, OptionDescriptor, OptionSpec};
    ///
    /// assert!(OptionDescriptor::new(OptionSpec::flag(Some('v'), Some("verbose"))).is_ok());
    /// assert_eq!(
    ///     OptionDescriptor::new(OptionSpec::default()),
    ///     Err(DefinitionError::MissingName)
    /// );
    /// assert_eq!(
    ///     OptionDescriptor::new(OptionSpec::flag(Some(' '), None)),
    ///     Err(DefinitionError::InvalidShortName(' '))
    /// );
    /// ```
    pub fn new(spec: OptionSpec) -> Result<Self, DefinitionError> {
        validate_spec(&spec)?;
        Ok(Self {
            short: spec.short,
            long: spec.long,
            arity: spec.arity,
            value_separator: spec.value_separator,
            required: spec.required,
            value_kind: spec.value_kind,
            description: spec.description,
        })
    }

    /// Single-character name, used as `-x`.
    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Long name, used as `--name`.
    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// How many values the option takes.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Character that splits one argument into several values.
    pub fn value_separator(&self) -> Option<char> {
        self.value_separator
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Target type for value coercion, if any.
    pub fn value_kind(&self) -> Option<ValueKind> {
        self.value_kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the identifying name: the short name if present, otherwise
    /// the long name.
    pub fn key(&self) -> String {
        match (self.short, self.long.as_deref()) {
            (Some(short), _) => short.to_string(),
            (None, Some(long)) => long.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Returns the name as written on a command line (`-x` or `--name`).
    pub fn display_name(&self) -> String {
        match (self.short, self.long.as_deref()) {
            (Some(short), _) => format!("-{short}"),
            (None, Some(long)) => format!("--{long}"),
            (None, None) => String::new(),
        }
    }

    /// Checks if this option is called `name` (short or long, leading
    /// hyphens ignored).
    pub fn matches(&self, name: &str) -> bool {
        let name = strip_hyphens(name);
        let mut chars = name.chars();
        let is_short = match (chars.next(), chars.next()) {
            (Some(ch), None) => self.short == Some(ch),
            _ => false,
        };
        is_short || self.long.as_deref() == Some(name)
    }

    pub(crate) fn clear_required(&mut self) {
        self.required = false;
    }
}

impl TryFrom<OptionSpec> for OptionDescriptor {
    type Error = DefinitionError;

    fn try_from(spec: OptionSpec) -> Result<Self, Self::Error> {
        OptionDescriptor::new(spec)
    }
}

impl From<OptionDescriptor> for OptionSpec {
    fn from(descriptor: OptionDescriptor) -> Self {
        OptionSpec {
            short: descriptor.short,
            long: descriptor.long,
            arity: descriptor.arity,
            value_separator: descriptor.value_separator,
            required: descriptor.required,
            value_kind: descriptor.value_kind,
            description: descriptor.description,
        }
    }
}

/// Identity of a descriptor inside the registry that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId(pub(crate) usize);

impl OptionId {
    /// Registration index of the option.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Identity of a group inside the registry that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    /// Registration index of the group.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A set of mutually exclusive options.
///
/// At most one member may appear in a single parse. Which member was picked
/// is tracked by the parser per call, never on the group itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    members: Vec<OptionId>,
    required: bool,
}

impl OptionGroup {
    pub(crate) fn new(members: Vec<OptionId>, required: bool) -> Self {
        Self { members, required }
    }

    pub fn members(&self) -> &[OptionId] {
        &self.members
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn contains(&self, id: OptionId) -> bool {
        self.members.contains(&id)
    }
}

/// Parameters for registering an [`OptionGroup`] together with its members.
///
/// # Examples
///
/// ```
/// use optline_core::{GroupSpec, OptionRegistry, OptionSpec};
///
/// let mut registry = OptionRegistry::new();
/// let group = registry
///     .add_group(
///         GroupSpec::new()
///             .with_option(OptionSpec::flag(Some('l'), Some("left")))
///             .with_option(OptionSpec::flag(Some('r'), Some("right")))
///             .required(),
///     )
///     .unwrap();
///
/// assert_eq!(registry.group(group).members().len(), 2);
/// assert!(registry.group(group).is_required());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSpec {
    /// Member options, registered with the group.
    pub options: Vec<OptionSpec>,
    /// Whether one member must be present.
    pub required: bool,
}

impl GroupSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member option.
    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Marks the group as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Removes one `-` or `--` prefix.
pub(crate) fn strip_hyphens(name: &str) -> &str {
    name.strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_bounds() {
        assert_eq!(Arity::None.max_values(), Some(0));
        assert_eq!(
            Arity::Optional(OptionalArity::Exactly(2)).max_values(),
            Some(2)
        );
        assert_eq!(Arity::Optional(OptionalArity::Unbounded).max_values(), None);
        assert!(Arity::Optional(OptionalArity::Unbounded).is_unbounded());
        assert!(Arity::Exactly(2).is_multi_valued());
        assert!(!Arity::Exactly(1).is_multi_valued());
    }

    #[test]
    fn test_descriptor_names() {
        let both = OptionSpec::flag(Some('v'), Some("verbose")).build().unwrap();
        assert_eq!(both.key(), "v");
        assert!(both.matches("-v"));
        assert!(both.matches("--verbose"));
        assert!(both.matches("verbose"));
        assert!(!both.matches("-x"));

        let long_only = OptionSpec::flag(None, Some("dry-run")).build().unwrap();
        assert_eq!(long_only.key(), "dry-run");
        assert_eq!(long_only.display_name(), "--dry-run");
    }

    #[test]
    fn test_descriptor_serde_validates() {
        let descriptor: OptionDescriptor =
            serde_json::from_str(r#"{"short": "D", "arity": "unbounded", "value_separator": "="}"#)
                .unwrap();
        assert_eq!(descriptor.short(), Some('D'));
        assert_eq!(descriptor.arity(), Arity::Unbounded);
        assert_eq!(descriptor.value_separator(), Some('='));

        let err = serde_json::from_str::<OptionDescriptor>(r#"{"arity": "unbounded"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_strip_hyphens() {
        assert_eq!(strip_hyphens("--long"), "long");
        assert_eq!(strip_hyphens("-s"), "s");
        assert_eq!(strip_hyphens("plain"), "plain");
        assert_eq!(strip_hyphens("---x"), "-x");
    }
}
