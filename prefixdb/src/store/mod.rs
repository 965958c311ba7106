//! The prefix store contract and its in-memory implementation.
//!
//! The engine only ever talks to a store through [`Store`]: an exact insert,
//! an insert driven by a closure that sees the current record, a
//! longest-prefix lookup, and persistence to a writer. [`MemoryStore`] is the
//! implementation shipped with the crate.

mod memory;
mod reserved;
mod snapshot;

use std::io::Write;
use std::net::IpAddr;

use camino::Utf8PathBuf;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;
pub use reserved::{is_reserved, reserved_networks};
pub use snapshot::{FORMAT_VERSION, VerifyReport};

use crate::metadata::{DatabaseMetadata, IpVersion};
use crate::value::TypedValue;

/// Closure mapping the record currently stored for a prefix (if any) to its
/// replacement. Returning `None` removes the record.
pub type Inserter<'a> = dyn Fn(Option<&TypedValue>) -> Option<TypedValue> + 'a;

/// Failures raised by a store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An IPv6 network was written to an IPv4 store.
    #[error("cannot insert {network} into an IPv{ip_version} database")]
    IpVersionMismatch {
        /// Network being inserted.
        network: IpNetwork,
        /// Family of the store.
        ip_version: IpVersion,
    },

    /// The network lies wholly inside a reserved address range.
    #[error("{network} is inside a reserved network")]
    ReservedNetwork {
        /// Network being inserted.
        network: IpNetwork,
    },

    /// Reading a snapshot failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing a snapshot failed.
    #[error("failed to write database: {0}")]
    Write(#[source] std::io::Error),

    /// The snapshot is not valid JSON for the expected layout.
    #[error("malformed database snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The snapshot parsed but its content is inconsistent.
    #[error("invalid database snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Options fixed when a store is created or loaded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Do not resolve IPv4-mapped and 6to4 IPv6 addresses against IPv4 records.
    pub disable_ipv4_aliasing: bool,
    /// Accept inserts that fall wholly inside reserved address ranges
    /// instead of rejecting them.
    pub include_reserved_networks: bool,
}

/// A prefix-keyed associative store with longest-prefix-match lookup.
pub trait Store {
    /// Metadata the store was created with.
    fn metadata(&self) -> &DatabaseMetadata;

    /// Set the record for `network` and every more-specific prefix beneath it.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from [`Store::insert_with`].
    fn insert(&mut self, network: IpNetwork, value: TypedValue) -> Result<(), StoreError> {
        self.insert_with(network, &|_| Some(value.clone()))
    }

    /// Rewrite the record for `network` and every more-specific prefix
    /// beneath it with `inserter`.
    ///
    /// For `network` itself the inserter sees the exact record, or the record
    /// of the closest covering prefix when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IpVersionMismatch`] when the network does not fit
    /// the store's address family, and [`StoreError::ReservedNetwork`] when
    /// the store refuses reserved ranges.
    fn insert_with(&mut self, network: IpNetwork, inserter: &Inserter<'_>)
    -> Result<(), StoreError>;

    /// Longest-prefix match for `address`.
    fn lookup(&self, address: IpAddr) -> Option<(IpNetwork, &TypedValue)>;

    /// Write the store to `writer`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] or [`StoreError::Snapshot`] when
    /// serialising or writing fails.
    fn persist(&self, writer: &mut dyn Write) -> Result<u64, StoreError>;
}
