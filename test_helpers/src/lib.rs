//! Test fixtures shared across the prefixdb workspace.
//!
//! - [`dataset`] builds dataset documents without hand-writing JSON.
//! - [`files`] owns a temporary directory and writes fixtures into it.
//! - [`env`] guards `PREFIXDB_*` variables mutated by configuration tests.
//! - [`figment`] wraps `figment::Jail` for layered configuration tests.

pub mod dataset;
pub mod env;
pub mod figment;
pub mod files;
