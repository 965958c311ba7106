//! User-supplied schemas and per-key schema resolution.
//!
//! A schema maps field names to either a scalar type tag or a nested schema.
//! Keys without an entry fall back to default inference, and so do entries
//! with a shape the engine cannot use.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::value::TypedValue;

/// Scalar type a schema can declare for a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeTag {
    /// `string`
    String,
    /// `bool` or `boolean`
    Bool,
    /// `float`, `float64` or `double`
    Float64,
    /// `int` or `int32`
    Int32,
    /// `uint` or `uint32`
    UInt32,
}

impl TypeTag {
    /// Canonical spelling of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Float64 => "float64",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
        }
    }

    /// Value substituted when a field does not match this tag in lenient mode.
    #[must_use]
    pub const fn zero_value(self) -> TypedValue {
        match self {
            Self::String => TypedValue::String(String::new()),
            Self::Bool => TypedValue::Bool(false),
            Self::Float64 => TypedValue::Float64(0.0),
            Self::Int32 => TypedValue::Int32(0),
            Self::UInt32 => TypedValue::UInt32(0),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a type tag is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown schema type '{0}'")]
pub struct UnknownTypeTag(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "bool" | "boolean" => Ok(Self::Bool),
            "float" | "float64" | "double" => Ok(Self::Float64),
            "int" | "int32" => Ok(Self::Int32),
            "uint" | "uint32" => Ok(Self::UInt32),
            _ => Err(UnknownTypeTag(s.to_owned())),
        }
    }
}

/// One schema entry.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaEntry {
    /// The field is a scalar of the given type.
    Type(TypeTag),
    /// The field is itself a record described by a sub-schema.
    Nested(Schema),
    /// The entry could not be interpreted; the description names its shape.
    Unsupported(String),
}

/// Recursive field-name → type mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    fields: BTreeMap<String, SchemaEntry>,
}

/// Outcome of resolving a key against an optional schema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution<'a> {
    /// The key has a declared scalar type.
    Typed(TypeTag),
    /// The key has a nested schema.
    Nested(&'a Schema),
    /// No usable schema; infer from the value.
    None,
}

impl Schema {
    /// Builds a schema from its JSON description.
    ///
    /// String entries become type tags, object entries nested schemas. Every
    /// other shape, and unknown tag names, are kept as
    /// [`SchemaEntry::Unsupported`] so resolution can report them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prefixdb::schema::{Resolution, Schema, TypeTag};
    /// use prefixdb::Diagnostics;
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_json(&json!({"asn": "uint", "geo": {"lat": "float"}}));
    /// let mut diagnostics = Diagnostics::new();
    /// assert_eq!(
    ///     schema.resolve("asn", &mut diagnostics),
    ///     Resolution::Typed(TypeTag::UInt32)
    /// );
    /// ```
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };
        let fields = map
            .iter()
            .map(|(key, entry)| (key.clone(), SchemaEntry::from_json(entry)))
            .collect();
        Self { fields }
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the entry for `key`.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&SchemaEntry> {
        self.fields.get(key)
    }

    /// Resolve `key` against this schema.
    ///
    /// Unsupported entries resolve to [`Resolution::None`] and leave a warning.
    pub fn resolve(&self, key: &str, diagnostics: &mut Diagnostics) -> Resolution<'_> {
        match self.fields.get(key) {
            None => Resolution::None,
            Some(SchemaEntry::Type(tag)) => Resolution::Typed(*tag),
            Some(SchemaEntry::Nested(schema)) => Resolution::Nested(schema),
            Some(SchemaEntry::Unsupported(shape)) => {
                diagnostics.warn(
                    DiagnosticKind::SchemaIgnored,
                    format!("schema for '{key}' is {shape}; using default inference"),
                );
                Resolution::None
            }
        }
    }
}

/// Resolve `key` against an optional schema.
pub fn resolve<'a>(
    key: &str,
    schema: Option<&'a Schema>,
    diagnostics: &mut Diagnostics,
) -> Resolution<'a> {
    schema.map_or(Resolution::None, |schema| schema.resolve(key, diagnostics))
}

impl SchemaEntry {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(tag) => tag
                .parse()
                .map_or_else(|err: UnknownTypeTag| Self::Unsupported(err.to_string()), Self::Type),
            Value::Object(_) => Self::Nested(Schema::from_json(value)),
            Value::Array(_) => Self::Unsupported("a list".to_owned()),
            Value::Null => Self::Unsupported("null".to_owned()),
            Value::Bool(_) => Self::Unsupported("a boolean".to_owned()),
            Value::Number(_) => Self::Unsupported("a number".to_owned()),
        }
    }
}
