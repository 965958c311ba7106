//! Failures collected from several dataset entries in one run.

use std::{error::Error, fmt, sync::Arc};

use super::EngineError;

/// Failures of several dataset entries, in dataset order.
///
/// Rendered one failure per line, each naming its record and network:
///
/// ```
/// use prefixdb::{EngineError, EntryContext};
///
/// let err = EngineError::try_aggregate(vec![
///     EngineError::validation("missing 'network'").in_context(EntryContext::entry(1)),
///     EngineError::unsupported_method("upsert")
///         .in_context(EntryContext::with_network(4, "1.1.1.0/24")),
/// ]);
/// if let Some(EngineError::Aggregate(failures)) = err {
///     assert_eq!(failures.entries().collect::<Vec<_>>(), vec![1, 4]);
///     assert!(failures.to_string().contains("\n  record 4 (network: 1.1.1.0/24): "));
/// }
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors {
    failures: Vec<Arc<EngineError>>,
}

impl AggregatedErrors {
    pub(super) const fn new(failures: Vec<Arc<EngineError>>) -> Self {
        Self { failures }
    }

    /// Iterate over the failures.
    pub fn iter(&self) -> impl Iterator<Item = &EngineError> {
        self.failures.iter().map(Arc::as_ref)
    }

    /// 1-based indices of the failing entries, skipping failures not tied to
    /// an entry.
    pub fn entries(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter()
            .filter_map(|failure| failure.context().and_then(|context| context.index))
    }

    /// Number of failures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether nothing failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separator = "";
        for failure in self.iter() {
            f.write_str(separator)?;
            separator = "\n";
            match failure.context() {
                Some(context) if !context.is_empty() => write!(f, "  {failure}")?,
                _ => write!(f, "  dataset: {failure}")?,
            }
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}
