//! Typed record values handed to and read back from a [`crate::Store`].
//!
//! [`TypedValue`] is a closed union mirroring the scalar and map types a
//! prefix store can persist. Datasets arrive as loosely typed JSON; the
//! [`crate::convert`] module turns them into trees of these values.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Map payload of [`TypedValue::Map`]. Keys are unique; ordering carries no meaning.
pub type TypedMap = BTreeMap<String, TypedValue>;

/// A strictly typed record value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedValue {
    /// UTF-8 text.
    String(String),
    /// Boolean flag.
    Bool(bool),
    /// IEEE-754 double.
    Float64(f64),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    #[serde(rename = "uint32")]
    UInt32(u32),
    /// Nested record.
    Map(TypedMap),
}

impl TypedValue {
    /// Returns an empty map value.
    #[must_use]
    pub const fn empty_map() -> Self {
        Self::Map(BTreeMap::new())
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Float64(_) => "float64",
            Self::Int32(_) => "int32",
            Self::UInt32(_) => "uint32",
            Self::Map(_) => "map",
        }
    }

    /// Borrows the map payload when this value is a [`TypedValue::Map`].
    #[must_use]
    pub const fn as_map(&self) -> Option<&TypedMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Renders the value as plain JSON, dropping type tags.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prefixdb::TypedValue;
    /// use serde_json::json;
    ///
    /// let value = TypedValue::Map([("asn".to_owned(), TypedValue::UInt32(13335))].into());
    /// assert_eq!(value.to_json(), json!({"asn": 13335}));
    /// ```
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(text) => Value::String(text.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Float64(number) => serde_json::Number::from_f64(*number)
                .map_or(Value::Null, Value::Number),
            Self::Int32(number) => Value::from(*number),
            Self::UInt32(number) => Value::from(*number),
            Self::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<TypedMap> for TypedValue {
    fn from(map: TypedMap) -> Self {
        Self::Map(map)
    }
}

impl From<&str> for TypedValue {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<bool> for TypedValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<f64> for TypedValue {
    fn from(number: f64) -> Self {
        Self::Float64(number)
    }
}

impl From<i32> for TypedValue {
    fn from(number: i32) -> Self {
        Self::Int32(number)
    }
}

impl From<u32> for TypedValue {
    fn from(number: u32) -> Self {
        Self::UInt32(number)
    }
}
