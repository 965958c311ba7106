//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// What the processor does when an entry fails.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing entry.
    #[default]
    FailFast,
    /// Record the failure and carry on with the next entry.
    Continue,
}

/// Options controlling conversion and processing.
///
/// Deserialises from partial input; absent keys take their defaults.
///
/// ```rust
/// use prefixdb::{EngineConfig, FailurePolicy};
///
/// let config: EngineConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
/// assert!(config.strict);
/// assert_eq!(config.max_depth, 32);
/// assert_eq!(config.failure_policy, FailurePolicy::FailFast);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fail an entry on type mismatches instead of substituting zero values.
    pub strict: bool,
    /// Maximum record nesting depth; deeper input is rejected.
    pub max_depth: usize,
    /// Behaviour when an entry fails.
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            failure_policy: FailurePolicy::FailFast,
        }
    }
}

impl EngineConfig {
    /// Enable or disable strict type checking.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set the nesting bound.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
