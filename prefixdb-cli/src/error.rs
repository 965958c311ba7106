//! Error types for `prefixdb`.

use camino::Utf8PathBuf;
use prefixdb::{EngineError, StoreError};
use thiserror::Error;

/// Errors surfaced by the `prefixdb` commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("configuration file not found: {0}")]
    MissingConfig(Utf8PathBuf),

    #[error("input file not found: {0}")]
    MissingInput(Utf8PathBuf),

    #[error("{path}: expected a .{expected} file")]
    InvalidExtension {
        path: Utf8PathBuf,
        expected: &'static str,
    },

    #[error("invalid query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    #[error("{path} failed verification with {problems} problem(s)")]
    VerificationFailed { path: Utf8PathBuf, problems: usize },

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}
