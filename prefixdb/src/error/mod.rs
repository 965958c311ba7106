//! Error types produced by the conversion and merge-update engine.

mod aggregate;
mod constructors;
mod context;
mod types;

pub use aggregate::AggregatedErrors;
pub use context::{EntryContext, WithEntryContext};
pub use types::{EngineError, EngineResult};

#[cfg(test)]
mod tests;
