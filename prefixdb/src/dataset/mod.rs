//! Dataset files: version, optional schema, metadata and the ordered entries.
//!
//! Top-level shape problems (wrong version, missing `dataset` array) fail the
//! whole dataset. Entries are kept raw and parsed one by one while
//! processing so that a malformed entry only fails itself.

mod entry;

use camino::Utf8Path;
use serde_json::{Map, Value};

pub use entry::{DatasetEntry, parse_network};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{EngineError, EngineResult};
use crate::metadata::DatabaseMetadata;
use crate::schema::Schema;

/// The only dataset version understood.
pub const SUPPORTED_VERSION: &str = "v1";

/// A parsed dataset file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Declared version, when present.
    pub version: Option<String>,
    /// Dataset-wide schema, when present and usable.
    pub schema: Option<Schema>,
    /// Raw `metadata` object; validated only when a store is created.
    pub metadata: Option<Value>,
    /// Entries in file order, unparsed.
    pub entries: Vec<Value>,
}

impl Dataset {
    /// Read and parse a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Io`] when the file cannot be read, and the errors
    /// of [`Dataset::from_json_str`] otherwise.
    pub fn load(path: &Utf8Path, diagnostics: &mut Diagnostics) -> EngineResult<Self> {
        let text = crate::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text, diagnostics)
    }

    /// Parse dataset JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Json`] for malformed JSON and the errors of
    /// [`Dataset::from_value`] otherwise.
    pub fn from_json_str(text: &str, diagnostics: &mut Diagnostics) -> EngineResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value, diagnostics)
    }

    /// Build a dataset from an already decoded JSON value.
    ///
    /// A `schema` that is not an object is ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when the root is not an object, the
    /// version is not `v1`, or `dataset` is missing or not an array.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prefixdb::dataset::Dataset;
    /// use prefixdb::Diagnostics;
    /// use serde_json::json;
    ///
    /// let mut diagnostics = Diagnostics::new();
    /// let dataset = Dataset::from_value(
    ///     json!({"version": "v1", "dataset": [{"network": "1.1.1.0/24", "data": {"asn": 13335}}]}),
    ///     &mut diagnostics,
    /// )?;
    /// assert_eq!(dataset.entries.len(), 1);
    ///
    /// let err = Dataset::from_value(json!({"version": "v2", "dataset": []}), &mut diagnostics);
    /// assert!(err.is_err());
    /// # Ok::<_, prefixdb::EngineError>(())
    /// ```
    pub fn from_value(value: Value, diagnostics: &mut Diagnostics) -> EngineResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(EngineError::validation(
                "dataset file must contain a JSON object",
            ));
        };

        let version = parse_version(root.remove("version"))?;
        let schema = parse_schema(root.remove("schema"), diagnostics);
        let metadata = root.remove("metadata").filter(|raw| !raw.is_null());
        let entries = match root.remove("dataset") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(EngineError::validation("'dataset' must be an array")),
            None => {
                return Err(EngineError::validation(
                    "no 'dataset' field found in input data",
                ));
            }
        };

        Ok(Self {
            version,
            schema,
            metadata,
            entries,
        })
    }

    /// Validate the `metadata` object for store creation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when metadata is absent or invalid.
    pub fn database_metadata(&self, diagnostics: &mut Diagnostics) -> EngineResult<DatabaseMetadata> {
        let raw = self.metadata.as_ref().ok_or_else(|| {
            EngineError::validation("no 'metadata' field found in input data")
        })?;
        DatabaseMetadata::from_json(raw, diagnostics)
    }

    /// Build a `v1` dataset document from metadata and entries.
    #[must_use]
    pub fn document(metadata: &DatabaseMetadata, entries: Vec<Value>) -> Value {
        let mut root = Map::new();
        root.insert("version".to_owned(), Value::from(SUPPORTED_VERSION));
        root.insert("metadata".to_owned(), metadata.to_dataset_json());
        root.insert("dataset".to_owned(), Value::Array(entries));
        Value::Object(root)
    }
}

fn parse_version(raw: Option<Value>) -> EngineResult<Option<String>> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(version)) if version == SUPPORTED_VERSION => Ok(Some(version)),
        Some(Value::String(version)) => Err(EngineError::validation(format!(
            "unsupported dataset version '{version}' (supported: {SUPPORTED_VERSION})"
        ))),
        Some(_) => Err(EngineError::validation("'version' must be a string")),
    }
}

fn parse_schema(raw: Option<Value>, diagnostics: &mut Diagnostics) -> Option<Schema> {
    match raw {
        None | Some(Value::Null) => None,
        Some(value @ Value::Object(_)) => Some(Schema::from_json(&value)),
        Some(_) => {
            diagnostics.warn(
                DiagnosticKind::SchemaIgnored,
                "top-level 'schema' is not an object; using default inference",
            );
            None
        }
    }
}

#[cfg(test)]
mod tests;
