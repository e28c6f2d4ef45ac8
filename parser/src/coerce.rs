//! Conversion of option values to typed values.
//!
//! [`coerce`] turns the string collected for an option into a [`Value`]
//! according to the option's [`ValueKind`]. Named types used by the
//! [`Class`](ValueKind::Class) and [`Object`](ValueKind::Object) kinds are
//! looked up in a [`TypeCatalog`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use optline_core::ValueKind;
use regex::Regex;
use tracing::trace;
use url::Url;

use crate::error::CoercionError;

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)$").expect("static regex must compile"));

/// URL schemes accepted by the [`Url`](ValueKind::Url) kind.
pub const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "file", "jar", "mailto"];

/// A type registered in a [`TypeCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
}

impl ClassRef {
    /// Name the type was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this refers to `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

type Constructor = fn() -> Box<dyn Any + Send>;

fn construct<T: Any + Send + Default>() -> Box<dyn Any + Send> {
    Box::new(T::default())
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    class: ClassRef,
    constructor: Option<Constructor>,
}

/// Types that can be referred to by name on the command line.
///
/// # Examples
///
/// ```
/// use optline_parser::TypeCatalog;
///
/// #[derive(Default)]
/// struct Settings {
///     retries: u32,
/// }
///
/// let mut catalog = TypeCatalog::new();
/// catalog.register::<Settings>("Settings");
///
/// let class = catalog.resolve("Settings").unwrap();
/// assert!(class.is::<Settings>());
///
/// let object = catalog.instantiate("Settings").unwrap();
/// assert_eq!(object.downcast_ref::<Settings>().unwrap().retries, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of common standard library types.
    ///
    /// Constructible: `String`, `bool`, `i64`, `f64`, `PathBuf`,
    /// `Vec<String>` and `HashMap<String, String>`. Name only: `Read`,
    /// `Write` and `Error` (trait objects).
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog
            .register::<String>("String")
            .register::<bool>("bool")
            .register::<i64>("i64")
            .register::<f64>("f64")
            .register::<PathBuf>("PathBuf")
            .register::<Vec<String>>("Vec<String>")
            .register::<HashMap<String, String>>("HashMap<String, String>")
            .register_abstract::<dyn std::io::Read>("Read")
            .register_abstract::<dyn std::io::Write>("Write")
            .register_abstract::<dyn std::error::Error>("Error");
        catalog
    }

    /// Registers a type that can be named and instantiated.
    pub fn register<T: Any + Send + Default>(&mut self, name: &str) -> &mut Self {
        self.insert::<T>(name, Some(construct::<T>))
    }

    /// Registers a type that can be named but not instantiated.
    pub fn register_abstract<T: ?Sized + 'static>(&mut self, name: &str) -> &mut Self {
        self.insert::<T>(name, None)
    }

    /// Looks up a type by name.
    pub fn resolve(&self, name: &str) -> Option<&ClassRef> {
        self.entries.get(name).map(|entry| &entry.class)
    }

    /// Creates a default instance of the type registered as `name`.
    ///
    /// # Errors
    ///
    /// Fails if the name is unknown or the type was registered with
    /// [`register_abstract`](Self::register_abstract).
    pub fn instantiate(&self, name: &str) -> Result<Box<dyn Any + Send>, CoercionError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| CoercionError::failed(name, ValueKind::Object, "unknown type"))?;
        let constructor = entry.constructor.ok_or_else(|| {
            CoercionError::failed(name, ValueKind::Object, "type cannot be instantiated")
        })?;
        Ok(constructor())
    }

    fn insert<T: ?Sized + 'static>(
        &mut self,
        name: &str,
        constructor: Option<Constructor>,
    ) -> &mut Self {
        let class = ClassRef {
            name: name.to_string(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        };
        self.entries
            .insert(name.to_string(), CatalogEntry { class, constructor });
        self
    }
}

/// A converted option value.
pub enum Value {
    /// The raw string, unchanged.
    String(String),
    /// A number without a fractional part.
    Integer(i64),
    /// A number with a fractional part.
    Float(f64),
    /// A type resolved from the catalog.
    Class(ClassRef),
    /// A default-constructed instance of a catalog type.
    Object(Box<dyn Any + Send>),
    /// A path, not checked against the filesystem.
    File(PathBuf),
    /// A file opened for reading.
    ExistingFile(File),
    /// A URL with an accepted scheme.
    Url(Url),
}

impl Value {
    /// Returns the string of a [`String`](Value::String) value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the number if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the resolved type of a [`Class`](Value::Class) value.
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Returns the path of a [`File`](Value::File) value.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::File(path) => Some(path),
            _ => None,
        }
    }

    /// Returns the parsed URL.
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Value::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Returns the instantiated object if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(object) => object.downcast_ref(),
            _ => None,
        }
    }

    /// Takes the opened file out of an [`ExistingFile`](Value::ExistingFile) value.
    pub fn into_file(self) -> Option<File> {
        match self {
            Value::ExistingFile(file) => Some(file),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(value) => f.debug_tuple("String").field(value).finish(),
            Value::Integer(value) => f.debug_tuple("Integer").field(value).finish(),
            Value::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Value::Class(class) => f.debug_tuple("Class").field(&class.name).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
            Value::File(path) => f.debug_tuple("File").field(path).finish(),
            Value::ExistingFile(file) => f.debug_tuple("ExistingFile").field(file).finish(),
            Value::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
        }
    }
}

/// Converts `value` to `kind`.
///
/// # Errors
///
/// Returns [`CoercionError::Unsupported`] for [`ValueKind::Date`] and
/// [`ValueKind::Files`], and [`CoercionError::Failed`] when the value does
/// not convert.
///
/// # Examples
///
/// ```
/// use optline_core::ValueKind;
/// use optline_parser::{CoercionError, TypeCatalog, coerce};
///
/// let catalog = TypeCatalog::standard();
/// assert_eq!(coerce("42", ValueKind::Number, &catalog).unwrap().as_i64(), Some(42));
/// assert_eq!(coerce("4.5", ValueKind::Number, &catalog).unwrap().as_f64(), Some(4.5));
/// assert!(matches!(
///     coerce("yesterday", ValueKind::Date, &catalog),
///     Err(CoercionError::Unsupported { .. })
/// ));
/// ```
pub fn coerce(value: &str, kind: ValueKind, catalog: &TypeCatalog) -> Result<Value, CoercionError> {
    trace!(value, kind = %kind, "Coercing value");

    match kind {
        ValueKind::String => Ok(Value::String(value.to_string())),
        ValueKind::Number => parse_number(value),
        ValueKind::Class => catalog
            .resolve(value)
            .cloned()
            .map(Value::Class)
            .ok_or_else(|| CoercionError::failed(value, kind, "unknown type")),
        ValueKind::Object => catalog.instantiate(value).map(Value::Object),
        ValueKind::ExistingFile => open_existing(value),
        ValueKind::File => Ok(Value::File(PathBuf::from(value))),
        ValueKind::Url => parse_url(value),
        ValueKind::Date | ValueKind::Files => Err(CoercionError::Unsupported { kind }),
    }
}

fn parse_number(value: &str) -> Result<Value, CoercionError> {
    if let Ok(integer) = value.parse::<i64>() {
        return Ok(Value::Integer(integer));
    }
    if !DECIMAL_RE.is_match(value) {
        return Err(CoercionError::failed(value, ValueKind::Number, "not a decimal number"));
    }
    value
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|e| CoercionError::failed(value, ValueKind::Number, e))
}

fn open_existing(value: &str) -> Result<Value, CoercionError> {
    let kind = ValueKind::ExistingFile;
    let metadata = std::fs::metadata(value).map_err(|e| CoercionError::failed(value, kind, e))?;
    if !metadata.is_file() {
        return Err(CoercionError::failed(value, kind, "not a regular file"));
    }
    File::open(value)
        .map(Value::ExistingFile)
        .map_err(|e| CoercionError::failed(value, kind, e))
}

fn parse_url(value: &str) -> Result<Value, CoercionError> {
    let url = Url::parse(value).map_err(|e| CoercionError::failed(value, ValueKind::Url, e))?;
    if !URL_SCHEMES.contains(&url.scheme()) {
        return Err(CoercionError::failed(
            value,
            ValueKind::Url,
            format!("unknown scheme {:?}", url.scheme()),
        ));
    }
    Ok(Value::Url(url))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn test_number_prefers_integer() {
        let catalog = TypeCatalog::new();
        assert!(matches!(
            coerce("1", ValueKind::Number, &catalog),
            Ok(Value::Integer(1))
        ));
        assert!(matches!(
            coerce("-7", ValueKind::Number, &catalog),
            Ok(Value::Integer(-7))
        ));
        assert_eq!(
            coerce("2.1", ValueKind::Number, &catalog).unwrap().as_f64(),
            Some(2.1)
        );
        assert_eq!(
            coerce("99999999999999999999", ValueKind::Number, &catalog).unwrap().as_f64(),
            Some(1e20)
        );
        for value in ["3,5", "nan", "inf", "-infinity", "1e5", "0x1F", ""] {
            assert!(
                matches!(
                    coerce(value, ValueKind::Number, &catalog),
                    Err(CoercionError::Failed { .. })
                ),
                "{value}"
            );
        }
    }

    #[test]
    fn test_class_and_object() {
        let catalog = TypeCatalog::standard();

        let class = coerce("Vec<String>", ValueKind::Class, &catalog).unwrap();
        assert!(class.as_class().unwrap().is::<Vec<String>>());

        let read = coerce("Read", ValueKind::Class, &catalog).unwrap();
        assert!(read.as_class().unwrap().is::<dyn std::io::Read>());

        let object = coerce("Vec<String>", ValueKind::Object, &catalog).unwrap();
        assert_eq!(object.downcast_ref::<Vec<String>>(), Some(&Vec::new()));

        assert!(coerce("Read", ValueKind::Object, &catalog).is_err());
        assert!(coerce("System.DateTime", ValueKind::Class, &catalog).is_err());
        assert!(coerce("System.DateTime", ValueKind::Object, &catalog).is_err());
    }

    #[test]
    fn test_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "contents").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let value = coerce(&path, ValueKind::ExistingFile, &TypeCatalog::new()).unwrap();
        let mut opened = value.into_file().unwrap();
        let mut text = String::new();
        opened.read_to_string(&mut text).unwrap();
        assert_eq!(text, "contents");

        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();
        assert!(coerce(dir_path, ValueKind::ExistingFile, &TypeCatalog::new()).is_err());

        let missing = dir.path().join("missing.txt");
        assert!(
            coerce(
                missing.to_str().unwrap(),
                ValueKind::ExistingFile,
                &TypeCatalog::new()
            )
            .is_err()
        );
    }

    #[test]
    fn test_url_schemes() {
        let catalog = TypeCatalog::new();
        let url = coerce("http://commons.apache.org", ValueKind::Url, &catalog).unwrap();
        assert_eq!(url.as_url().unwrap().host_str(), Some("commons.apache.org"));

        assert!(coerce("foo://commons.apache.org", ValueKind::Url, &catalog).is_err());
        assert!(coerce("not a url", ValueKind::Url, &catalog).is_err());
    }

    #[test]
    fn test_unsupported_kinds() {
        let catalog = TypeCatalog::new();
        for kind in [ValueKind::Date, ValueKind::Files] {
            assert_eq!(
                coerce("anything", kind, &catalog).unwrap_err(),
                CoercionError::Unsupported { kind }
            );
        }
    }

    #[test]
    fn test_plain_kinds() {
        let catalog = TypeCatalog::new();
        assert_eq!(
            coerce("foo", ValueKind::String, &catalog).unwrap().as_str(),
            Some("foo")
        );
        assert_eq!(
            coerce("build.xml", ValueKind::File, &catalog)
                .unwrap()
                .as_path(),
            Some(Path::new("build.xml"))
        );
    }
}
