//! Parsing of individual dataset entries.

use ipnetwork::IpNetwork;
use serde_json::{Map, Value};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{EngineError, EngineResult, EntryContext, WithEntryContext};
use crate::merge::MergeMethod;

/// One entry of a dataset, borrowed from the raw JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetEntry<'a> {
    /// 1-based position in the dataset.
    pub index: usize,
    /// Target network with host bits cleared.
    pub network: IpNetwork,
    /// Update method.
    pub method: MergeMethod,
    /// Record from `data`, or `record` when `data` is absent or null.
    pub data: Option<&'a Map<String, Value>>,
}

impl<'a> DatasetEntry<'a> {
    /// Parse the entry at 1-based position `index`.
    ///
    /// A missing `method` defaults to `deep_merge` with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a non-object entry, a missing
    /// or malformed `network`, a non-string `method` or a non-object record,
    /// and [`EngineError::UnsupportedMethod`] for unknown method names. Every
    /// error carries the entry index, plus the network once it is known.
    pub fn parse(
        index: usize,
        raw: &'a Value,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<Self> {
        let Value::Object(fields) = raw else {
            return Err(EngineError::validation("entry must be an object")
                .in_context(EntryContext::entry(index)));
        };

        let network_text = match fields.get("network") {
            Some(Value::String(text)) => text.as_str(),
            Some(_) => {
                return Err(EngineError::validation("'network' must be a string")
                    .in_context(EntryContext::entry(index)));
            }
            None => {
                return Err(EngineError::validation("missing 'network'")
                    .in_context(EntryContext::entry(index)));
            }
        };
        let context = EntryContext::with_network(index, network_text);
        let network = parse_network(network_text).with_entry_context(context.clone())?;

        let method = match fields.get("method") {
            None | Some(Value::Null) => {
                diagnostics.warn(
                    DiagnosticKind::MethodDefaulted,
                    format!("no method given for {network}, defaulting to deep_merge"),
                );
                MergeMethod::DeepMerge
            }
            Some(Value::String(name)) => name
                .parse::<MergeMethod>()
                .with_entry_context(context.clone())?,
            Some(_) => {
                return Err(EngineError::validation("'method' must be a string").in_context(context));
            }
        };

        let data = match record_field(fields) {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                return Err(EngineError::validation("'data' must be an object").in_context(context));
            }
        };

        Ok(Self {
            index,
            network,
            method,
            data,
        })
    }
}

/// The entry's record: `data` unless it is absent or null, then `record`.
fn record_field(fields: &Map<String, Value>) -> Option<&Value> {
    ["data", "record"]
        .into_iter()
        .filter_map(|name| fields.get(name))
        .find(|value| !value.is_null())
}

/// Parse CIDR text into a network with host bits cleared.
///
/// An explicit `/prefix` is required; a bare address is rejected.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when `text` is not CIDR notation.
///
/// # Examples
///
/// ```rust
/// use prefixdb::dataset::parse_network;
///
/// assert_eq!(parse_network("192.168.1.0/24")?.to_string(), "192.168.1.0/24");
/// assert_eq!(parse_network("192.168.1.77/24")?.to_string(), "192.168.1.0/24");
/// assert!(parse_network("not-an-ip").is_err());
/// assert!(parse_network("192.168.1.1").is_err());
/// # Ok::<_, prefixdb::EngineError>(())
/// ```
pub fn parse_network(text: &str) -> EngineResult<IpNetwork> {
    let invalid = |reason: &dyn std::fmt::Display| {
        EngineError::validation(format!("invalid network '{text}': {reason}"))
    };
    if !text.contains('/') {
        return Err(invalid(&"expected CIDR notation such as 192.0.2.0/24"));
    }
    let parsed: IpNetwork = text.trim().parse().map_err(|err| invalid(&err))?;
    IpNetwork::new(parsed.network(), parsed.prefix()).map_err(|err| invalid(&err))
}
