//! Update semantics applied to a store prefix.
//!
//! Every method is expressed as an inserter closure handed to
//! [`Store::insert_with`], so the store decides which existing records the
//! closure sees.

use std::fmt;
use std::str::FromStr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::store::Store;
use crate::value::{TypedMap, TypedValue};

/// How an entry's record combines with what the store already holds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// Delete the record at the prefix.
    Remove,
    /// Overwrite the record wholesale.
    Replace,
    /// Overwrite top-level keys, keeping the rest.
    TopLevelMerge,
    /// Merge maps recursively; the incoming side wins at leaves.
    #[default]
    DeepMerge,
}

impl MergeMethod {
    /// Name as written in datasets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Replace => "replace",
            Self::TopLevelMerge => "top_level_merge",
            Self::DeepMerge => "deep_merge",
        }
    }

    /// Whether the method needs a record to apply.
    #[must_use]
    pub const fn requires_value(self) -> bool {
        !matches!(self, Self::Remove)
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            "top_level_merge" => Ok(Self::TopLevelMerge),
            "deep_merge" => Ok(Self::DeepMerge),
            other => Err(EngineError::unsupported_method(other)),
        }
    }
}

/// Apply `method` at `network`.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when a method other than
/// [`MergeMethod::Remove`] receives no value, and [`EngineError::Store`] when
/// the store rejects the update.
///
/// # Examples
///
/// ```rust
/// use prefixdb::merge::{MergeMethod, apply};
/// use prefixdb::metadata::DatabaseMetadata;
/// use prefixdb::store::{MemoryStore, Store, StoreOptions};
/// use prefixdb::TypedValue;
///
/// let mut store = MemoryStore::create(DatabaseMetadata::new("ASN", "demo"), StoreOptions::default());
/// let network = "8.8.8.0/24".parse().unwrap();
/// let a = TypedValue::Map([("a".to_owned(), TypedValue::Int32(1))].into());
/// let b = TypedValue::Map([("b".to_owned(), TypedValue::Int32(2))].into());
///
/// apply(&mut store, network, MergeMethod::DeepMerge, Some(a))?;
/// apply(&mut store, network, MergeMethod::DeepMerge, Some(b))?;
///
/// let (_, record) = store.lookup("8.8.8.8".parse().unwrap()).unwrap();
/// assert_eq!(record.as_map().map(|m| m.len()), Some(2));
/// # Ok::<_, prefixdb::EngineError>(())
/// ```
pub fn apply<S>(
    store: &mut S,
    network: IpNetwork,
    method: MergeMethod,
    record: Option<TypedValue>,
) -> EngineResult<()>
where
    S: Store + ?Sized,
{
    if method == MergeMethod::Remove {
        store.insert_with(network, &|_| None)?;
        return Ok(());
    }
    let Some(value) = record else {
        return Err(EngineError::validation(format!(
            "method '{method}' requires a 'data' record"
        )));
    };
    match method {
        MergeMethod::Remove | MergeMethod::Replace => store.insert(network, value)?,
        MergeMethod::TopLevelMerge => {
            store.insert_with(network, &|existing| Some(top_level_merge(existing, &value)))?;
        }
        MergeMethod::DeepMerge => {
            store.insert_with(network, &|existing| Some(deep_merge(existing, &value)))?;
        }
    }
    Ok(())
}

/// Overwrite the top-level keys of `existing` with those of `incoming`.
///
/// Values under a replaced key are not merged. When either side is not a map
/// the incoming value wins outright.
#[must_use]
pub fn top_level_merge(existing: Option<&TypedValue>, incoming: &TypedValue) -> TypedValue {
    match (existing, incoming) {
        (Some(TypedValue::Map(base)), TypedValue::Map(patch)) => {
            let mut merged = base.clone();
            merged.extend(patch.iter().map(|(key, value)| (key.clone(), value.clone())));
            TypedValue::Map(merged)
        }
        _ => incoming.clone(),
    }
}

/// Recursively merge `incoming` into `existing`.
///
/// Maps present on both sides merge key by key; anywhere else the incoming
/// value replaces the existing one. Keys only present in `existing` survive.
#[must_use]
pub fn deep_merge(existing: Option<&TypedValue>, incoming: &TypedValue) -> TypedValue {
    let mut target = existing.cloned().unwrap_or_else(TypedValue::empty_map);
    merge_value(&mut target, incoming);
    target
}

/// Overlay `layer` onto `target` in place.
fn merge_value(target: &mut TypedValue, layer: &TypedValue) {
    match layer {
        TypedValue::Map(map) => merge_map(target, map),
        _ => *target = layer.clone(),
    }
}

fn merge_map(target: &mut TypedValue, map: &TypedMap) {
    if target.as_map().is_none() {
        *target = TypedValue::empty_map();
    }
    let TypedValue::Map(target_map) = target else {
        return;
    };
    for (key, value) in map {
        match target_map.get_mut(key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target_map.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests;
