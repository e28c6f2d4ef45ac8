//! Mnemonic pattern compiler.
//!
//! A pattern is a compact string with one character per short option. A
//! type marker after the character makes the option take one value of that
//! kind, and `!` makes it required:
//!
//! | marker | kind                              |
//! |--------|-----------------------------------|
//! | `:`    | [`ValueKind::String`]             |
//! | `@`    | [`ValueKind::Object`]             |
//! | `%`    | [`ValueKind::Number`]             |
//! | `#`    | [`ValueKind::Date`]               |
//! | `+`    | [`ValueKind::Class`]              |
//! | `<`    | [`ValueKind::ExistingFile`]       |
//! | `>`    | [`ValueKind::File`]               |
//! | `*`    | [`ValueKind::Files`]              |
//! | `/`    | [`ValueKind::Url`]                |
//!
//! Markers and `!` apply to the option being built. When no option is being
//! built yet they carry over to the next one.

use crate::{Arity, DefinitionError, OptionRegistry, OptionSpec, ValueKind};

#[derive(Default)]
struct Pending {
    short: Option<char>,
    kind: Option<ValueKind>,
    required: bool,
}

impl Pending {
    fn flush(&mut self, registry: &mut OptionRegistry) -> Result<(), DefinitionError> {
        let Some(short) = self.short else {
            return Ok(());
        };
        let mut spec = OptionSpec::flag(Some(short), None);
        if let Some(kind) = self.kind {
            spec = spec.with_kind(kind).with_arity(Arity::Exactly(1));
        }
        spec.required = self.required;
        registry.add_option(spec)?;
        *self = Pending::default();
        Ok(())
    }
}

/// Compiles a mnemonic pattern into a registry of short options.
///
/// # Errors
///
/// Returns a [`DefinitionError`] if a character is not a valid short name
/// or appears twice.
///
/// # Examples
///
/// ```
/// use optline_core::{Arity, ValueKind, compile_pattern};
///
/// let registry = compile_pattern("vo>n%!").unwrap();
/// assert_eq!(registry.len(), 3);
///
/// let verbose = registry.option(registry.by_short('v').unwrap());
/// assert_eq!(verbose.arity(), Arity::None);
///
/// let output = registry.option(registry.by_short('o').unwrap());
/// assert_eq!(output.value_kind(), Some(ValueKind::File));
/// assert_eq!(output.arity(), Arity::Exactly(1));
///
/// let count = registry.option(registry.by_short('n').unwrap());
/// assert!(count.is_required());
/// ```
pub fn compile_pattern(pattern: &str) -> Result<OptionRegistry, DefinitionError> {
    let mut registry = OptionRegistry::new();
    let mut pending = Pending::default();

    for ch in pattern.chars() {
        if ch == '!' {
            pending.required = true;
        } else if let Some(kind) = ValueKind::from_pattern_char(ch) {
            pending.kind = Some(kind);
        } else {
            pending.flush(&mut registry)?;
            pending.short = Some(ch);
        }
    }
    pending.flush(&mut registry)?;

    Ok(registry)
}
