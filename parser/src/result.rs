//! The outcome of a successful parse.

use std::collections::HashMap;

use optline_core::{OptionDescriptor, OptionId};

use crate::coerce::{TypeCatalog, Value, coerce};
use crate::error::CoercionError;

/// One appearance of an option on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    id: OptionId,
    descriptor: OptionDescriptor,
    values: Vec<String>,
}

impl Occurrence {
    pub(crate) fn new(id: OptionId, descriptor: OptionDescriptor) -> Self {
        Self {
            id,
            descriptor,
            values: Vec::new(),
        }
    }

    pub fn id(&self) -> OptionId {
        self.id
    }

    pub fn descriptor(&self) -> &OptionDescriptor {
        &self.descriptor
    }

    /// Values collected by this occurrence, after separator splitting.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<String> {
        &mut self.values
    }
}

/// Ways of naming an option when reading a [`ParseResult`].
///
/// Strings may carry leading hyphens. A single character is matched against
/// short names before long names.
pub trait OptionQuery {
    /// Picks the queried option among `occurrences`.
    fn select(&self, occurrences: &[Occurrence]) -> Option<OptionId>;
}

fn select_by_name(name: &str, occurrences: &[Occurrence]) -> Option<OptionId> {
    let name = name
        .strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name);
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if let Some(occurrence) = occurrences
            .iter()
            .find(|o| o.descriptor.short() == Some(ch))
        {
            return Some(occurrence.id);
        }
    }
    occurrences
        .iter()
        .find(|o| o.descriptor.long() == Some(name))
        .map(|o| o.id)
}

impl OptionQuery for &str {
    fn select(&self, occurrences: &[Occurrence]) -> Option<OptionId> {
        select_by_name(self, occurrences)
    }
}

impl OptionQuery for char {
    fn select(&self, occurrences: &[Occurrence]) -> Option<OptionId> {
        let mut buf = [0; 4];
        select_by_name(self.encode_utf8(&mut buf), occurrences)
    }
}

impl OptionQuery for OptionId {
    fn select(&self, occurrences: &[Occurrence]) -> Option<OptionId> {
        occurrences.iter().any(|o| o.id == *self).then_some(*self)
    }
}

impl OptionQuery for &OptionDescriptor {
    fn select(&self, occurrences: &[Occurrence]) -> Option<OptionId> {
        occurrences
            .iter()
            .find(|o| o.descriptor == **self)
            .map(|o| o.id)
    }
}

/// Options found on a command line, with their values, plus the arguments
/// no option consumed.
///
/// Values of an option accumulate across its occurrences: `-v a -v b`
/// reads back as `["a", "b"]`.
///
/// # Examples
///
/// ```
/// use optline_core::{OptionRegistry, OptionSpec};
///
/// let mut registry = OptionRegistry::new();
/// registry.add_option(OptionSpec::flag(Some('a'), None)).unwrap();
/// registry.add_option(OptionSpec::with_value(Some('b'), Some("bee"))).unwrap();
///
/// let result = optline_parser::parse(&registry, ["-a", "-b", "foo", "rest"], None, false).unwrap();
/// assert!(result.has_option('a'));
/// assert_eq!(result.value('a'), None);
/// assert_eq!(result.value("--bee"), Some("foo"));
/// assert_eq!(result.leftover(), ["rest"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseResult {
    occurrences: Vec<Occurrence>,
    leftover: Vec<String>,
}

impl ParseResult {
    pub(crate) fn new(occurrences: Vec<Occurrence>, leftover: Vec<String>) -> Self {
        Self {
            occurrences,
            leftover,
        }
    }

    /// Returns `true` if the option appeared at least once.
    pub fn has_option(&self, option: impl OptionQuery) -> bool {
        option.select(&self.occurrences).is_some()
    }

    /// First value of the option.
    pub fn value(&self, option: impl OptionQuery) -> Option<&str> {
        self.values(option).into_iter().next()
    }

    /// First value of the option, or `default`.
    pub fn value_or<'a>(&'a self, option: impl OptionQuery, default: &'a str) -> &'a str {
        self.value(option).unwrap_or(default)
    }

    /// All values of the option across its occurrences, in command-line
    /// order. Empty for absent options and flags.
    pub fn values(&self, option: impl OptionQuery) -> Vec<&str> {
        let Some(id) = option.select(&self.occurrences) else {
            return Vec::new();
        };
        self.occurrences
            .iter()
            .filter(|o| o.id == id)
            .flat_map(|o| o.values.iter().map(String::as_str))
            .collect()
    }

    /// Arguments not consumed by any option.
    pub fn leftover(&self) -> &[String] {
        &self.leftover
    }

    pub fn into_leftover(self) -> Vec<String> {
        self.leftover
    }

    /// First value of the option converted to its [`ValueKind`], using the
    /// [standard catalog](TypeCatalog::standard).
    ///
    /// Returns `Ok(None)` if the option is absent or has no value, and a
    /// [`Value::String`] for untyped options.
    ///
    /// [`ValueKind`]: optline_core::ValueKind
    pub fn coerced_value(&self, option: impl OptionQuery) -> Result<Option<Value>, CoercionError> {
        self.coerced_value_with(option, &TypeCatalog::standard())
    }

    /// Like [`coerced_value`](Self::coerced_value) with a caller-supplied
    /// catalog.
    pub fn coerced_value_with(
        &self,
        option: impl OptionQuery,
        catalog: &TypeCatalog,
    ) -> Result<Option<Value>, CoercionError> {
        let Some(id) = option.select(&self.occurrences) else {
            return Ok(None);
        };
        let Some(occurrence) = self
            .occurrences
            .iter()
            .find(|o| o.id == id && !o.values.is_empty())
        else {
            return Ok(None);
        };

        let value = &occurrence.values[0];
        match occurrence.descriptor.value_kind() {
            Some(kind) => coerce(value, kind, catalog).map(Some),
            None => Ok(Some(Value::String(value.clone()))),
        }
    }

    /// Reads the option's occurrences as key/value pairs.
    ///
    /// Each occurrence contributes its first two values as a pair. An
    /// occurrence with a single value maps it to `"true"`.
    ///
    /// ```
    /// use optline_core::{Arity, OptionRegistry, OptionSpec};
    ///
    /// let mut registry = OptionRegistry::new();
    /// registry
    ///     .add_option(
    ///         OptionSpec::with_value(Some('D'), None)
    ///             .with_arity(Arity::Unbounded)
    ///             .with_separator('='),
    ///     )
    ///     .unwrap();
    ///
    /// let result = optline_parser::parse(&registry, ["-Dlevel=debug", "-Dcolor"], None, false).unwrap();
    /// let properties = result.option_properties('D');
    /// assert_eq!(properties["level"], "debug");
    /// assert_eq!(properties["color"], "true");
    /// ```
    pub fn option_properties(&self, option: impl OptionQuery) -> HashMap<String, String> {
        let Some(id) = option.select(&self.occurrences) else {
            return HashMap::new();
        };
        self.occurrences
            .iter()
            .filter(|o| o.id == id)
            .filter_map(|o| match o.values.as_slice() {
                [] => None,
                [key] => Some((key.clone(), "true".to_string())),
                [key, value, ..] => Some((key.clone(), value.clone())),
            })
            .collect()
    }

    /// Every occurrence, in command-line order.
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Distinct options found, in order of first appearance.
    pub fn options(&self) -> Vec<&OptionDescriptor> {
        let mut seen = Vec::new();
        let mut options = Vec::new();
        for occurrence in &self.occurrences {
            if !seen.contains(&occurrence.id) {
                seen.push(occurrence.id);
                options.push(&occurrence.descriptor);
            }
        }
        options
    }
}
