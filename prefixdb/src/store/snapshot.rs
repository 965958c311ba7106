//! Versioned JSON snapshot layout used to persist a [`super::MemoryStore`].

use std::collections::BTreeSet;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use super::reserved::covers;
use crate::metadata::{DatabaseMetadata, IpVersion};
use crate::value::TypedValue;

/// Snapshot layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Snapshot {
    pub(super) format_version: u32,
    pub(super) build_epoch: u64,
    pub(super) metadata: DatabaseMetadata,
    pub(super) entries: Vec<SnapshotEntry>,
}

/// One stored prefix; a missing record marks a removal beneath a covering prefix.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SnapshotEntry {
    pub(super) network: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) record: Option<TypedValue>,
}

/// Outcome of a structural check of a persisted store.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct VerifyReport {
    /// Number of stored prefixes inspected.
    pub entries: usize,
    /// Human-readable description of every problem found.
    pub problems: Vec<String>,
}

impl VerifyReport {
    /// Whether no problems were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

impl Snapshot {
    pub(super) fn verify(&self) -> VerifyReport {
        let mut problems = Vec::new();
        if self.format_version != FORMAT_VERSION {
            problems.push(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                self.format_version
            ));
        }
        if self.metadata.database_type.is_empty() {
            problems.push("metadata has an empty database type".to_owned());
        }
        if self.metadata.languages.is_empty() {
            problems.push("metadata lists no languages".to_owned());
        }

        let mut seen = BTreeSet::new();
        let mut records = Vec::new();
        let mut holes = Vec::new();
        for (position, entry) in self.entries.iter().enumerate() {
            let Some(network) = self.check_entry(position, entry, &mut problems) else {
                continue;
            };
            if !seen.insert((network.ip(), network.prefix())) {
                problems.push(format!("entry {position}: duplicate network {network}"));
                continue;
            }
            if entry.record.is_some() {
                records.push(network);
            } else {
                holes.push(network);
            }
        }

        for hole in holes {
            let covered = records
                .iter()
                .any(|&record| record.prefix() < hole.prefix() && covers(record, hole));
            if !covered {
                problems.push(format!("removal marker {hole} has no covering record"));
            }
        }

        VerifyReport {
            entries: self.entries.len(),
            problems,
        }
    }

    fn check_entry(
        &self,
        position: usize,
        entry: &SnapshotEntry,
        problems: &mut Vec<String>,
    ) -> Option<IpNetwork> {
        let network: IpNetwork = match entry.network.parse() {
            Ok(network) => network,
            Err(err) => {
                problems.push(format!("entry {position}: invalid network '{}': {err}", entry.network));
                return None;
            }
        };
        if network.ip() != network.network() {
            problems.push(format!("entry {position}: network {network} has host bits set"));
        }
        if self.metadata.ip_version == IpVersion::V4 && network.is_ipv6() {
            problems.push(format!(
                "entry {position}: IPv6 network {network} in an IPv4 database"
            ));
        }
        if let Some(record) = entry.record.as_ref().filter(|record| record.as_map().is_none()) {
            problems.push(format!(
                "entry {position}: record for {network} is a {} rather than a map",
                record.type_name()
            ));
        }
        Some(network)
    }
}
