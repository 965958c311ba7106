//! Schema-driven record conversion and merge updates for prefix-keyed stores.
//!
//! A dataset lists entries of the form `{network, data, method}`. Each record
//! is converted into a [`TypedValue`] tree, guided by an optional schema, and
//! then applied to a [`Store`] using one of the [`MergeMethod`]s. Warnings
//! raised along the way are returned as structured [`Diagnostics`] rather
//! than logged.
//!
//! ```rust
//! use prefixdb::dataset::Dataset;
//! use prefixdb::store::{MemoryStore, Store, StoreOptions};
//! use prefixdb::{DatasetProcessor, Diagnostics, EngineConfig, TypedValue};
//! use serde_json::json;
//!
//! let input = json!({
//!     "version": "v1",
//!     "schema": {"asn": "uint"},
//!     "metadata": {"DatabaseType": "ASN", "Description": {"en": "Autonomous systems"}},
//!     "dataset": [
//!         {"network": "1.1.1.0/24", "data": {"asn": 13335, "org": "Cloudflare"}},
//!         {"network": "1.1.1.0/24", "method": "deep_merge", "data": {"anycast": true}}
//!     ]
//! });
//!
//! let mut diagnostics = Diagnostics::new();
//! let dataset = Dataset::from_value(input, &mut diagnostics)?;
//! let metadata = dataset.database_metadata(&mut diagnostics)?;
//! let mut store = MemoryStore::create(metadata, StoreOptions::default());
//!
//! let report = DatasetProcessor::new(EngineConfig::default()).process(&dataset, &mut store);
//! assert_eq!(report.into_result()?, 2);
//!
//! let (_, record) = store.lookup("1.1.1.1".parse().unwrap()).unwrap();
//! assert_eq!(record.get("asn"), Some(&TypedValue::UInt32(13335)));
//! assert_eq!(record.get("anycast"), Some(&TypedValue::Bool(true)));
//! # Ok::<_, prefixdb::EngineError>(())
//! ```

pub mod coerce;
mod config;
pub mod convert;
pub mod dataset;
mod diagnostics;
mod error;
mod fs;
pub mod merge;
pub mod metadata;
mod process;
pub mod schema;
pub mod store;
mod value;

pub use config::{DEFAULT_MAX_DEPTH, EngineConfig, FailurePolicy};
pub use convert::{ConversionError, RecordConverter};
pub use dataset::{Dataset, DatasetEntry};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{AggregatedErrors, EngineError, EngineResult, EntryContext, WithEntryContext};
pub use merge::MergeMethod;
pub use metadata::{DatabaseMetadata, IpVersion, RecordSize};
pub use process::{DatasetProcessor, EntryOutcome, ProcessReport};
pub use schema::{Schema, TypeTag};
pub use store::{MemoryStore, Store, StoreError, StoreOptions};
pub use value::{TypedMap, TypedValue};
