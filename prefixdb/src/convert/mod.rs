//! Schema-aware conversion of raw dataset records into typed value trees.
//!
//! [`RecordConverter`] walks an input record field by field, resolves each
//! key against the active schema and coerces the value. Malformed fields are
//! dropped or defaulted and reported as diagnostics; only strict mode and the
//! nesting bound turn them into errors.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::coerce::{self, Inferred, Mismatch};
use crate::config::EngineConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::schema::{self, Resolution, Schema, TypeTag};
use crate::value::{TypedMap, TypedValue};

/// Failures raised while converting a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConversionError {
    /// A field did not match its declared type (strict mode only).
    #[error("field '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Dotted path of the field.
        path: String,
        /// Declared type.
        expected: TypeTag,
        /// What was found instead.
        found: &'static str,
    },

    /// A field with a nested schema was not a record (strict mode only).
    #[error("field '{path}': expected a nested record, found {found}")]
    NotARecord {
        /// Dotted path of the field.
        path: String,
        /// What was found instead.
        found: &'static str,
    },

    /// Records nest deeper than the configured bound.
    #[error("field '{path}': records nest deeper than {limit} levels")]
    DepthExceeded {
        /// Dotted path of the field that crossed the bound.
        path: String,
        /// Configured maximum depth.
        limit: usize,
    },
}

/// Converts raw records into [`TypedValue::Map`] trees.
///
/// # Examples
///
/// ```rust
/// use prefixdb::convert::RecordConverter;
/// use prefixdb::{Diagnostics, EngineConfig, TypedValue};
/// use prefixdb::schema::Schema;
/// use serde_json::json;
///
/// let config = EngineConfig::default();
/// let mut diagnostics = Diagnostics::new();
/// let schema = Schema::from_json(&json!({"asn": "uint"}));
/// let record = json!({"asn": 13335, "org": "Cloudflare"});
///
/// let value = RecordConverter::new(&config, &mut diagnostics)
///     .convert(record.as_object().unwrap(), Some(&schema))
///     .unwrap();
/// assert_eq!(value.get("asn"), Some(&TypedValue::UInt32(13335)));
/// assert_eq!(value.get("org"), Some(&TypedValue::from("Cloudflare")));
/// ```
pub struct RecordConverter<'a> {
    config: &'a EngineConfig,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> RecordConverter<'a> {
    /// Create a converter reporting into `diagnostics`.
    pub const fn new(config: &'a EngineConfig, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// Convert `record` into a map value, guided by `schema` when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::DepthExceeded`] when records nest deeper
    /// than the configured bound, and mismatch errors in strict mode.
    pub fn convert(
        &mut self,
        record: &Map<String, Value>,
        schema: Option<&Schema>,
    ) -> Result<TypedValue, ConversionError> {
        self.convert_map(record, schema, "", 1).map(TypedValue::Map)
    }

    /// Coerce a single raw value, with or without a declared type.
    ///
    /// Returns `Ok(None)` when the value has an unsupported shape and was
    /// dropped.
    ///
    /// # Errors
    ///
    /// Same as [`RecordConverter::convert`].
    pub fn coerce(
        &mut self,
        raw: &Value,
        tag: Option<TypeTag>,
    ) -> Result<Option<TypedValue>, ConversionError> {
        match tag {
            Some(tag) => self.coerce_tagged("value", raw, tag).map(Some),
            None => self.infer("value", raw, 1),
        }
    }

    fn convert_map(
        &mut self,
        record: &Map<String, Value>,
        schema: Option<&Schema>,
        prefix: &str,
        depth: usize,
    ) -> Result<TypedMap, ConversionError> {
        if depth > self.config.max_depth {
            return Err(ConversionError::DepthExceeded {
                path: if prefix.is_empty() { "<root>".to_owned() } else { prefix.to_owned() },
                limit: self.config.max_depth,
            });
        }
        let mut out = TypedMap::new();
        for (key, raw) in record {
            let path = join(prefix, key);
            let converted = match schema::resolve(key, schema, self.diagnostics) {
                Resolution::Nested(sub) => self.nested(&path, raw, sub, depth)?,
                Resolution::Typed(tag) => Some(self.coerce_tagged(&path, raw, tag)?),
                Resolution::None => self.infer(&path, raw, depth)?,
            };
            if let Some(value) = converted {
                out.insert(key.clone(), value);
            }
        }
        Ok(out)
    }

    fn nested(
        &mut self,
        path: &str,
        raw: &Value,
        sub: &Schema,
        depth: usize,
    ) -> Result<Option<TypedValue>, ConversionError> {
        if let Value::Object(map) = raw {
            return self
                .convert_map(map, Some(sub), path, depth + 1)
                .map(|map| Some(TypedValue::Map(map)));
        }
        let found = coerce::raw_kind(raw);
        if self.config.strict {
            return Err(ConversionError::NotARecord {
                path: path.to_owned(),
                found,
            });
        }
        self.diagnostics.warn(
            DiagnosticKind::NestedSchemaMismatch,
            format!("field '{path}': schema declares a nested record but found {found}; using default inference"),
        );
        self.infer(path, raw, depth)
    }

    fn coerce_tagged(
        &mut self,
        path: &str,
        raw: &Value,
        tag: TypeTag,
    ) -> Result<TypedValue, ConversionError> {
        match coerce::coerce_as(raw, tag) {
            Ok(value) => Ok(value),
            Err(Mismatch { expected, found }) if self.config.strict => {
                Err(ConversionError::TypeMismatch {
                    path: path.to_owned(),
                    expected,
                    found,
                })
            }
            Err(Mismatch { expected, found }) => {
                let zero = expected.zero_value();
                self.diagnostics.warn(
                    DiagnosticKind::TypeMismatch,
                    format!("field '{path}': expected {expected}, found {found}; using {zero}"),
                );
                Ok(zero)
            }
        }
    }

    fn infer(
        &mut self,
        path: &str,
        raw: &Value,
        depth: usize,
    ) -> Result<Option<TypedValue>, ConversionError> {
        match coerce::infer(raw) {
            Inferred::Scalar(value) => Ok(Some(value)),
            Inferred::Widened(value) => {
                self.diagnostics.info(
                    DiagnosticKind::NumericWidened,
                    format!("field '{path}': integer does not fit int32; stored as float64"),
                );
                Ok(Some(value))
            }
            Inferred::Record(map) => self
                .convert_map(map, None, path, depth + 1)
                .map(|map| Some(TypedValue::Map(map))),
            Inferred::Unsupported(kind) => {
                self.diagnostics.warn(
                    DiagnosticKind::UnsupportedFieldType,
                    format!("field '{path}': unsupported data type ({kind}); field dropped"),
                );
                Ok(None)
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}
