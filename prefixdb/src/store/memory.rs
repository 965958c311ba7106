//! In-memory prefix map implementing [`Store`].

use std::collections::BTreeMap;
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use ipnetwork::IpNetwork;

use super::reserved::{covers, is_reserved};
use super::snapshot::{FORMAT_VERSION, Snapshot, SnapshotEntry, VerifyReport};
use super::{Inserter, Store, StoreError, StoreOptions};
use crate::metadata::{DatabaseMetadata, IpVersion};
use crate::value::TypedValue;

type Key = (IpAddr, u8);

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    network: IpNetwork,
    /// `None` marks a removal beneath a covering prefix.
    record: Option<TypedValue>,
}

/// Prefix store held entirely in memory and persisted as a JSON snapshot.
///
/// ```rust
/// use prefixdb::metadata::DatabaseMetadata;
/// use prefixdb::store::{MemoryStore, Store, StoreOptions};
/// use prefixdb::TypedValue;
///
/// let mut store = MemoryStore::create(DatabaseMetadata::new("ASN", "demo"), StoreOptions::default());
/// let record = TypedValue::Map([("asn".to_owned(), TypedValue::UInt32(13335))].into());
/// store.insert("1.1.1.0/24".parse().unwrap(), record.clone()).unwrap();
///
/// let (network, found) = store.lookup("1.1.1.1".parse().unwrap()).unwrap();
/// assert_eq!(network.to_string(), "1.1.1.0/24");
/// assert_eq!(found, &record);
/// ```
#[derive(Clone, Debug)]
pub struct MemoryStore {
    metadata: DatabaseMetadata,
    options: StoreOptions,
    build_epoch: Option<u64>,
    slots: BTreeMap<Key, Slot>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub const fn create(metadata: DatabaseMetadata, options: StoreOptions) -> Self {
        Self {
            metadata,
            options,
            build_epoch: None,
            slots: BTreeMap::new(),
        }
    }

    /// Load a store persisted with [`Store::persist`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file cannot be read and
    /// [`StoreError::Snapshot`] or [`StoreError::InvalidSnapshot`] when its
    /// content is not a usable snapshot.
    pub fn load(path: &Utf8Path, options: StoreOptions) -> Result<Self, StoreError> {
        let text = read_snapshot(path)?;
        Self::from_snapshot_str(&text, options)
    }

    /// Rebuild a store from snapshot text.
    ///
    /// # Errors
    ///
    /// See [`MemoryStore::load`].
    pub fn from_snapshot_str(text: &str, options: StoreOptions) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        if snapshot.format_version != FORMAT_VERSION {
            return Err(StoreError::InvalidSnapshot(format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                snapshot.format_version
            )));
        }

        let mut store = Self {
            metadata: snapshot.metadata,
            options,
            build_epoch: Some(snapshot.build_epoch),
            slots: BTreeMap::new(),
        };
        for entry in snapshot.entries {
            let network = canonical(entry.network.parse::<IpNetwork>().map_err(|err| {
                StoreError::InvalidSnapshot(format!("invalid network '{}': {err}", entry.network))
            })?);
            store.check_family(network)?;
            store.slots.insert(
                key(network),
                Slot {
                    network,
                    record: entry.record,
                },
            );
        }
        tracing::debug!(prefixes = store.slots.len(), "loaded database snapshot");
        Ok(store)
    }

    /// Structurally check a persisted store without loading it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Snapshot`] when the file
    /// cannot be read or parsed at all; every other problem is listed in the
    /// returned report.
    pub fn verify_file(path: &Utf8Path) -> Result<VerifyReport, StoreError> {
        let text = read_snapshot(path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        Ok(snapshot.verify())
    }

    /// Structurally check the in-memory content.
    #[must_use]
    pub fn verify(&self) -> VerifyReport {
        self.snapshot(self.build_epoch.unwrap_or_default()).verify()
    }

    /// Options the store was opened with.
    #[must_use]
    pub const fn options(&self) -> StoreOptions {
        self.options
    }

    /// Build time of a loaded store, in seconds since the Unix epoch.
    #[must_use]
    pub const fn build_epoch(&self) -> Option<u64> {
        self.build_epoch
    }

    /// Number of prefixes holding a record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.values().filter(|slot| slot.record.is_some()).count()
    }

    /// Whether no prefix holds a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over stored prefixes and their records in address order.
    pub fn iter(&self) -> impl Iterator<Item = (IpNetwork, &TypedValue)> + '_ {
        self.slots
            .values()
            .filter_map(|slot| slot.record.as_ref().map(|record| (slot.network, record)))
    }

    /// Prefixes removed from beneath a covering record.
    pub fn holes(&self) -> impl Iterator<Item = IpNetwork> + '_ {
        self.slots
            .values()
            .filter(|slot| slot.record.is_none())
            .map(|slot| slot.network)
    }

    /// Every stored prefix in address order, holes included as `None`.
    ///
    /// Replaying the sequence as replace and remove operations rebuilds the
    /// store, since a prefix always sorts after the prefixes covering it.
    pub fn entries(&self) -> impl Iterator<Item = (IpNetwork, Option<&TypedValue>)> + '_ {
        self.slots
            .values()
            .map(|slot| (slot.network, slot.record.as_ref()))
    }

    /// Records that apply to any address inside `query`.
    ///
    /// The closest covering record comes first when `query` has no record of
    /// its own, followed by every record at or beneath `query`.
    #[must_use]
    pub fn networks_within(&self, requested: IpNetwork) -> Vec<(IpNetwork, &TypedValue)> {
        let query = canonical(requested);
        if self.check_family(query).is_err() {
            return Vec::new();
        }
        let mut found = Vec::new();
        if !self.slots.contains_key(&key(query))
            && let Some(Slot {
                network,
                record: Some(record),
            }) = self.covering(query)
        {
            found.push((*network, record));
        }
        found.extend(
            self.within(query)
                .filter_map(|slot| slot.record.as_ref().map(|record| (slot.network, record))),
        );
        found
    }

    fn check_family(&self, network: IpNetwork) -> Result<(), StoreError> {
        if self.metadata.ip_version == IpVersion::V4 && network.is_ipv6() {
            return Err(StoreError::IpVersionMismatch {
                network,
                ip_version: self.metadata.ip_version,
            });
        }
        Ok(())
    }

    /// Slots at or beneath `network`.
    fn within(&self, network: IpNetwork) -> impl Iterator<Item = &Slot> + '_ {
        self.slots
            .range((network.network(), 0)..)
            .map(|(_, slot)| slot)
            .take_while(move |slot| network.contains(slot.network.network()))
            .filter(move |slot| covers(network, slot.network))
    }

    /// Closest slot strictly above `network`.
    fn covering(&self, network: IpNetwork) -> Option<&Slot> {
        (0..network.prefix())
            .rev()
            .find_map(|prefix| self.slots.get(&key(supernet(network, prefix)?)))
    }

    fn covering_record(&self, network: IpNetwork) -> Option<&TypedValue> {
        self.covering(network).and_then(|slot| slot.record.as_ref())
    }

    /// Drop removal markers that no longer shadow a record.
    fn prune(&mut self) {
        let mut holes: Vec<IpNetwork> = self.holes().collect();
        holes.sort_by_key(IpNetwork::prefix);
        for hole in holes {
            if self.covering_record(hole).is_none() {
                self.slots.remove(&key(hole));
            }
        }
    }

    fn resolve_alias(&self, address: IpAddr) -> Option<IpAddr> {
        match address {
            IpAddr::V6(_) if self.metadata.ip_version == IpVersion::V4 => None,
            IpAddr::V6(v6) if !self.options.disable_ipv4_aliasing => {
                Some(ipv4_alias(v6).map_or(address, IpAddr::V4))
            }
            _ => Some(address),
        }
    }

    fn snapshot(&self, build_epoch: u64) -> Snapshot {
        Snapshot {
            format_version: FORMAT_VERSION,
            build_epoch,
            metadata: self.metadata.clone(),
            entries: self
                .slots
                .values()
                .map(|slot| SnapshotEntry {
                    network: slot.network.to_string(),
                    record: slot.record.clone(),
                })
                .collect(),
        }
    }
}

impl Store for MemoryStore {
    fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    fn insert_with(
        &mut self,
        requested: IpNetwork,
        inserter: &Inserter<'_>,
    ) -> Result<(), StoreError> {
        let network = canonical(requested);
        self.check_family(network)?;
        if !self.options.include_reserved_networks && is_reserved(network) {
            return Err(StoreError::ReservedNetwork { network });
        }

        let exact = key(network);
        let seed = match self.slots.get(&exact) {
            Some(slot) => slot.record.clone(),
            None => self.covering_record(network).cloned(),
        };
        let nested: Vec<Key> = self
            .within(network)
            .map(|slot| key(slot.network))
            .filter(|nested| *nested != exact)
            .collect();
        for nested in nested {
            if let Some(slot) = self.slots.get_mut(&nested) {
                slot.record = inserter(slot.record.as_ref());
            }
        }
        let record = inserter(seed.as_ref());
        self.slots.insert(exact, Slot { network, record });
        self.prune();
        Ok(())
    }

    fn lookup(&self, requested: IpAddr) -> Option<(IpNetwork, &TypedValue)> {
        let address = self.resolve_alias(requested)?;
        let longest = if address.is_ipv4() { 32 } else { 128 };
        (0..=longest)
            .rev()
            .find_map(|prefix| {
                let network = IpNetwork::new(address, prefix).ok().map(canonical)?;
                self.slots.get(&key(network))
            })
            .and_then(|slot| slot.record.as_ref().map(|record| (slot.network, record)))
    }

    fn persist(&self, writer: &mut dyn Write) -> Result<u64, StoreError> {
        let snapshot = self.snapshot(current_epoch());
        let bytes = serde_json::to_vec(&snapshot)?;
        writer.write_all(&bytes).map_err(StoreError::Write)?;
        writer.flush().map_err(StoreError::Write)?;
        Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }
}

fn read_snapshot(path: &Utf8Path) -> Result<String, StoreError> {
    crate::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn key(network: IpNetwork) -> Key {
    (network.network(), network.prefix())
}

/// Clear host bits.
fn canonical(network: IpNetwork) -> IpNetwork {
    IpNetwork::new(network.network(), network.prefix()).unwrap_or(network)
}

fn supernet(network: IpNetwork, prefix: u8) -> Option<IpNetwork> {
    IpNetwork::new(network.network(), prefix).ok().map(canonical)
}

/// IPv4 address embedded in an IPv4-mapped (`::ffff:0:0/96`) or 6to4
/// (`2002::/16`) address.
fn ipv4_alias(address: Ipv6Addr) -> Option<Ipv4Addr> {
    if let Some(mapped) = address.to_ipv4_mapped() {
        return Some(mapped);
    }
    match address.octets() {
        [0x20, 0x02, a, b, c, d, ..] => Some(Ipv4Addr::new(a, b, c, d)),
        _ => None,
    }
}

fn current_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
