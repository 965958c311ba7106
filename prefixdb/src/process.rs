//! Drives conversion and dispatch over the entries of a dataset.

use std::sync::Arc;

use ipnetwork::IpNetwork;
use serde_json::Value;

use crate::config::{EngineConfig, FailurePolicy};
use crate::convert::RecordConverter;
use crate::dataset::{Dataset, DatasetEntry};
use crate::diagnostics::Diagnostics;
use crate::error::{EngineError, EngineResult, EntryContext, WithEntryContext};
use crate::merge::{self, MergeMethod};
use crate::schema::Schema;
use crate::store::Store;

/// Result of processing one dataset entry.
#[derive(Clone, Debug)]
pub struct EntryOutcome {
    /// 1-based position in the dataset.
    pub index: usize,
    /// Parsed network, when the entry got that far.
    pub network: Option<IpNetwork>,
    /// Parsed method, when the entry got that far.
    pub method: Option<MergeMethod>,
    /// Whether the entry was applied.
    pub result: Result<(), Arc<EngineError>>,
}

impl EntryOutcome {
    /// Whether the entry was applied.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a processing run.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Entries applied successfully.
    pub processed: usize,
    /// Per-entry outcomes in dataset order, up to where processing stopped.
    pub outcomes: Vec<EntryOutcome>,
    /// Warnings and notices raised along the way.
    pub diagnostics: Diagnostics,
    /// The first failure, if any.
    pub first_error: Option<Arc<EngineError>>,
}

impl ProcessReport {
    /// Number of entries that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| !outcome.is_ok()).count()
    }

    /// Whether every visited entry was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.first_error.is_none()
    }

    /// Failures in dataset order.
    pub fn errors(&self) -> impl Iterator<Item = &EngineError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(Arc::as_ref))
    }

    /// Collapse the report into the processed count or the failure(s).
    ///
    /// # Errors
    ///
    /// Returns the sole failure directly, or [`EngineError::Aggregate`] when
    /// several entries failed.
    pub fn into_result(self) -> EngineResult<usize> {
        let Self {
            processed,
            outcomes,
            first_error,
            ..
        } = self;
        drop(first_error);
        let errors: Vec<Arc<EngineError>> = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.result.err())
            .collect();
        EngineError::try_aggregate(errors).map_or(Ok(processed), Err)
    }
}

/// Applies dataset entries to a store in file order.
///
/// ```rust
/// use prefixdb::dataset::Dataset;
/// use prefixdb::metadata::DatabaseMetadata;
/// use prefixdb::store::{MemoryStore, StoreOptions};
/// use prefixdb::{DatasetProcessor, Diagnostics, EngineConfig};
/// use serde_json::json;
///
/// let mut diagnostics = Diagnostics::new();
/// let dataset = Dataset::from_value(
///     json!({"dataset": [
///         {"network": "1.1.1.0/24", "method": "replace", "data": {"asn": 13335}},
///         {"network": "8.8.8.0/24", "method": "replace", "data": {"asn": 15169}}
///     ]}),
///     &mut diagnostics,
/// )?;
/// let mut store = MemoryStore::create(DatabaseMetadata::new("ASN", "demo"), StoreOptions::default());
///
/// let report = DatasetProcessor::new(EngineConfig::default()).process(&dataset, &mut store);
/// assert_eq!(report.into_result()?, 2);
/// assert_eq!(store.len(), 2);
/// # Ok::<_, prefixdb::EngineError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct DatasetProcessor {
    config: EngineConfig,
}

impl DatasetProcessor {
    /// Processor using `config`.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply every entry of `dataset` to `store`.
    ///
    /// Under [`FailurePolicy::FailFast`] processing stops at the first failing
    /// entry; under [`FailurePolicy::Continue`] every entry is attempted.
    /// Store updates made before a failure are kept.
    pub fn process<S>(&self, dataset: &Dataset, store: &mut S) -> ProcessReport
    where
        S: Store + ?Sized,
    {
        let mut report = ProcessReport::default();
        for (position, raw) in dataset.entries.iter().enumerate() {
            let index = position + 1;
            report.diagnostics.enter_entry(index);
            let outcome = self.process_entry(
                index,
                raw,
                dataset.schema.as_ref(),
                store,
                &mut report.diagnostics,
            );
            report.diagnostics.leave_entry();

            let failed = match &outcome.result {
                Ok(()) => {
                    report.processed += 1;
                    false
                }
                Err(err) => {
                    tracing::debug!(index, error = %err, "dataset entry failed");
                    if report.first_error.is_none() {
                        report.first_error = Some(Arc::clone(err));
                    }
                    true
                }
            };
            report.outcomes.push(outcome);
            if failed && self.config.failure_policy == FailurePolicy::FailFast {
                break;
            }
        }
        tracing::debug!(
            processed = report.processed,
            failed = report.failed(),
            total = dataset.entries.len(),
            "finished processing dataset"
        );
        report
    }

    fn process_entry<S>(
        &self,
        index: usize,
        raw: &Value,
        schema: Option<&Schema>,
        store: &mut S,
        diagnostics: &mut Diagnostics,
    ) -> EntryOutcome
    where
        S: Store + ?Sized,
    {
        let entry = match DatasetEntry::parse(index, raw, diagnostics) {
            Ok(entry) => entry,
            Err(err) => {
                return EntryOutcome {
                    index,
                    network: None,
                    method: None,
                    result: Err(Arc::new(err)),
                };
            }
        };
        let context = EntryContext::with_network(index, entry.network.to_string());
        let result = self
            .apply_entry(&entry, schema, store, diagnostics)
            .with_entry_context(context)
            .map_err(Arc::new);
        EntryOutcome {
            index,
            network: Some(entry.network),
            method: Some(entry.method),
            result,
        }
    }

    fn apply_entry<S>(
        &self,
        entry: &DatasetEntry<'_>,
        schema: Option<&Schema>,
        store: &mut S,
        diagnostics: &mut Diagnostics,
    ) -> EngineResult<()>
    where
        S: Store + ?Sized,
    {
        let value = match entry.data {
            Some(data) if entry.method.requires_value() => {
                Some(RecordConverter::new(&self.config, diagnostics).convert(data, schema)?)
            }
            _ => None,
        };
        tracing::debug!(
            index = entry.index,
            network = %entry.network,
            method = %entry.method,
            "applying dataset entry"
        );
        merge::apply(store, entry.network, entry.method, value)
    }
}
