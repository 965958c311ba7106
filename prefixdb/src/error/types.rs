//! Primary error enum for dataset processing flows.

use camino::Utf8PathBuf;
use thiserror::Error;

use super::{AggregatedErrors, EntryContext};
use crate::convert::ConversionError;
use crate::store::StoreError;

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Fatal failures while reading a dataset or applying it to a store.
///
/// Every variant tied to a dataset entry carries an [`EntryContext`] so the
/// message names the 1-based record index and the offending network.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The input has the wrong shape: a missing field, a bad CIDR or an
    /// unsupported dataset version.
    #[error("{context}{message}")]
    Validation {
        /// Entry the failure belongs to, if any.
        context: EntryContext,
        /// Human-readable explanation.
        message: String,
    },

    /// The entry names a merge method the engine does not know.
    #[error(
        "{context}unsupported method '{method}' (supported: remove, replace, top_level_merge, deep_merge)"
    )]
    UnsupportedMethod {
        /// Entry the failure belongs to.
        context: EntryContext,
        /// Method name as written in the dataset.
        method: String,
    },

    /// The record could not be converted into typed values.
    #[error("{context}{source}")]
    Conversion {
        /// Entry the failure belongs to.
        context: EntryContext,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// The store rejected the update.
    #[error("{context}store error: {source}")]
    Store {
        /// Entry the failure belongs to, if any.
        context: EntryContext,
        /// Underlying store failure.
        #[source]
        source: StoreError,
    },

    /// The dataset is not valid JSON.
    #[error("failed to parse dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the dataset failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Several entries failed while processing continued past failures.
    #[error("{} dataset entries failed:\n{}", .0.len(), .0)]
    Aggregate(Box<AggregatedErrors>),
}

impl From<StoreError> for EngineError {
    fn from(source: StoreError) -> Self {
        Self::Store {
            context: EntryContext::default(),
            source,
        }
    }
}

impl From<ConversionError> for EngineError {
    fn from(source: ConversionError) -> Self {
        Self::Conversion {
            context: EntryContext::default(),
            source,
        }
    }
}
