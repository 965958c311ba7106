//! Constructors and aggregation helpers for `EngineError`.

use std::sync::Arc;

use super::{AggregatedErrors, EngineError, EntryContext};

impl EngineError {
    /// Construct a validation error without entry context.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefixdb::EngineError;
    /// let e = EngineError::validation("no 'dataset' field found in input data");
    /// assert!(matches!(e, EngineError::Validation { .. }));
    /// ```
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            context: EntryContext::default(),
            message: message.into(),
        }
    }

    /// Construct an unsupported-method error without entry context.
    #[must_use]
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            context: EntryContext::default(),
            method: method.into(),
        }
    }

    /// Returns the entry context, when the variant carries one.
    #[must_use]
    pub const fn context(&self) -> Option<&EntryContext> {
        match self {
            Self::Validation { context, .. }
            | Self::UnsupportedMethod { context, .. }
            | Self::Conversion { context, .. }
            | Self::Store { context, .. } => Some(context),
            Self::Json(_) | Self::Io { .. } | Self::Aggregate(_) => None,
        }
    }

    /// Fill in the entry context when none has been recorded yet.
    ///
    /// Errors that already name an entry keep their original context.
    #[must_use]
    pub fn in_context(mut self, new_context: EntryContext) -> Self {
        match &mut self {
            Self::Validation { context, .. }
            | Self::UnsupportedMethod { context, .. }
            | Self::Conversion { context, .. }
            | Self::Store { context, .. } => {
                if context.is_empty() {
                    *context = new_context;
                }
            }
            Self::Json(_) | Self::Io { .. } | Self::Aggregate(_) => {}
        }
        self
    }

    /// Collapse the failures of a processing run into one error.
    ///
    /// Returns `None` when nothing failed and the failure itself when exactly
    /// one uniquely owned failure is given. Anything else becomes
    /// [`Self::Aggregate`], keeping the given order.
    #[must_use]
    pub fn try_aggregate<I, E>(failures: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut failures: Vec<Arc<Self>> = failures.into_iter().map(Into::into).collect();
        match failures.len() {
            0 => None,
            1 => failures.pop().map(|only| {
                Arc::try_unwrap(only).unwrap_or_else(|shared| {
                    Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared])))
                })
            }),
            _ => Some(Self::Aggregate(Box::new(AggregatedErrors::new(failures)))),
        }
    }
}
