//! Entry context attached to errors raised while processing a dataset.

use std::fmt;

use super::{EngineError, EngineResult};

/// Position of the failing entry within the dataset.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntryContext {
    /// 1-based entry index.
    pub index: Option<usize>,
    /// Network as written or as parsed.
    pub network: Option<String>,
}

impl EntryContext {
    /// Context naming only the entry index.
    #[must_use]
    pub const fn entry(index: usize) -> Self {
        Self {
            index: Some(index),
            network: None,
        }
    }

    /// Context naming the entry and its network.
    #[must_use]
    pub fn with_network(index: usize, network: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            network: Some(network.into()),
        }
    }

    /// Whether neither the index nor the network is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.index.is_none() && self.network.is_none()
    }
}

impl fmt::Display for EntryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.index, self.network.as_deref()) {
            (Some(index), Some(network)) => write!(f, "record {index} (network: {network}): "),
            (Some(index), None) => write!(f, "record {index}: "),
            (None, Some(network)) => write!(f, "network {network}: "),
            (None, None) => Ok(()),
        }
    }
}

/// Attach an [`EntryContext`] to errors that do not yet carry one.
///
/// # Examples
///
/// ```rust
/// use prefixdb::{EngineError, EntryContext, WithEntryContext};
///
/// let result: Result<(), EngineError> = Err(EngineError::validation("missing 'data'"));
/// let err = result
///     .with_entry_context(EntryContext::with_network(4, "1.1.1.0/24"))
///     .unwrap_err();
/// assert_eq!(err.to_string(), "record 4 (network: 1.1.1.0/24): missing 'data'");
/// ```
pub trait WithEntryContext<T> {
    /// Fill in the context of the contained error.
    ///
    /// # Errors
    ///
    /// Propagates the original error with its context populated.
    fn with_entry_context(self, context: EntryContext) -> EngineResult<T>;
}

impl<T, E> WithEntryContext<T> for Result<T, E>
where
    E: Into<EngineError>,
{
    fn with_entry_context(self, context: EntryContext) -> EngineResult<T> {
        self.map_err(|err| err.into().in_context(context))
    }
}
