//! Builders for dataset documents used across engine and CLI tests.
//!
//! ```
//! use prefixdb_test_helpers::dataset::DatasetBuilder;
//! use serde_json::json;
//!
//! let doc = DatasetBuilder::new()
//!     .schema(json!({"asn": "uint"}))
//!     .entry("1.1.1.0/24", "replace", json!({"asn": 13335}))
//!     .build();
//! assert_eq!(doc["dataset"][0]["method"], "replace");
//! ```

use serde_json::{Map, Value, json};

/// Metadata accepted by store creation: an IPv6 ASN database.
#[must_use]
pub fn asn_metadata() -> Value {
    json!({
        "DatabaseType": "Test-ASN",
        "Description": {"en": "Test ASN database"},
        "IPVersion": 6,
        "Languages": ["en"],
        "RecordSize": 28
    })
}

/// Fluent builder for `v1` dataset documents.
#[derive(Clone, Debug)]
pub struct DatasetBuilder {
    version: Option<String>,
    schema: Option<Value>,
    metadata: Option<Value>,
    entries: Vec<Value>,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetBuilder {
    /// Version `v1`, [`asn_metadata`] and no entries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Some("v1".to_owned()),
            schema: None,
            metadata: Some(asn_metadata()),
            entries: Vec::new(),
        }
    }

    /// Set or clear the version.
    #[must_use]
    pub fn version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_owned);
        self
    }

    /// Set the dataset-wide schema.
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Replace the metadata object.
    #[must_use]
    pub fn metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Drop the metadata object, as update datasets usually do.
    #[must_use]
    pub fn without_metadata(mut self) -> Self {
        self.metadata = None;
        self
    }

    /// Add an entry with an explicit method.
    #[must_use]
    pub fn entry(mut self, network: &str, method: &str, data: Value) -> Self {
        self.entries
            .push(json!({"network": network, "method": method, "data": data}));
        self
    }

    /// Add an entry that leaves the method to its default.
    #[must_use]
    pub fn entry_with_default_method(mut self, network: &str, data: Value) -> Self {
        self.entries.push(json!({"network": network, "data": data}));
        self
    }

    /// Add a `remove` entry.
    #[must_use]
    pub fn remove(mut self, network: &str) -> Self {
        self.entries
            .push(json!({"network": network, "method": "remove"}));
        self
    }

    /// Add an entry verbatim, for malformed-input tests.
    #[must_use]
    pub fn raw_entry(mut self, entry: Value) -> Self {
        self.entries.push(entry);
        self
    }

    /// Render the document.
    #[must_use]
    pub fn build(self) -> Value {
        let mut root = Map::new();
        if let Some(version) = self.version {
            root.insert("version".to_owned(), Value::String(version));
        }
        if let Some(schema) = self.schema {
            root.insert("schema".to_owned(), schema);
        }
        if let Some(metadata) = self.metadata {
            root.insert("metadata".to_owned(), metadata);
        }
        root.insert("dataset".to_owned(), Value::Array(self.entries));
        Value::Object(root)
    }
}
