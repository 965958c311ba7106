//! Guards for environment variables mutated by tests.
//!
//! Mutations take a global re-entrant lock and return an RAII guard that puts
//! the previous value back on drop. Hold an [`EnvLock`] when a test needs
//! several variables to stay consistent for its whole body.
//!
//! # Examples
//!
//! ```
//! use prefixdb_test_helpers::env;
//!
//! let _guard = env::set_var("PREFIXDB_STRICT", "true");
//! assert_eq!(std::env::var("PREFIXDB_STRICT").as_deref(), Ok("true"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Prefix shared by every configuration variable the CLI reads.
pub const PREFIX: &str = "PREFIXDB_";

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// RAII guard restoring a variable to its prior value on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish()
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _lock = ENV_MUTEX.lock();
        match self.original.take() {
            // SAFETY: the environment lock is held.
            Some(value) => unsafe { env::set_var(&self.key, value) },
            // SAFETY: the environment lock is held.
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

/// Holds the environment lock; restores its guards before releasing it.
#[must_use = "dropping releases the environment lock"]
pub struct EnvLock {
    guards: Vec<EnvVarGuard>,
    _lock: ReentrantMutexGuard<'static, ()>,
}

impl EnvLock {
    /// Set `key` for as long as the lock is held.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl AsRef<OsStr>) -> &mut Self {
        self.guards.push(set_var(key, value));
        self
    }

    /// Unset `key` for as long as the lock is held.
    pub fn remove_var(&mut self, key: impl Into<String>) -> &mut Self {
        self.guards.push(remove_var(key));
        self
    }
}

impl Drop for EnvLock {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

fn mutate(key: String, set_to: Option<&OsStr>) -> EnvVarGuard {
    let _lock = ENV_MUTEX.lock();
    let original = env::var_os(&key);
    match set_to {
        // SAFETY: the environment lock is held.
        Some(value) => unsafe { env::set_var(&key, value) },
        // SAFETY: the environment lock is held.
        None => unsafe { env::remove_var(&key) },
    }
    EnvVarGuard { key, original }
}

/// Set `key` and return a guard restoring its prior value.
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
    mutate(key.into(), Some(value.as_ref()))
}

/// Unset `key` and return a guard restoring its prior value.
pub fn remove_var(key: impl Into<String>) -> EnvVarGuard {
    mutate(key.into(), None)
}

/// Take the environment lock.
pub fn lock() -> EnvLock {
    EnvLock {
        guards: Vec::new(),
        _lock: ENV_MUTEX.lock(),
    }
}

/// Take the environment lock with every `PREFIXDB_*` variable unset.
///
/// ```
/// use prefixdb_test_helpers::env;
///
/// let _outer = env::set_var("PREFIXDB_VERBOSE", "1");
/// {
///     let _clean = env::isolated();
///     assert!(std::env::var_os("PREFIXDB_VERBOSE").is_none());
/// }
/// assert_eq!(std::env::var("PREFIXDB_VERBOSE").as_deref(), Ok("1"));
/// ```
pub fn isolated() -> EnvLock {
    let mut held = lock();
    let keys: Vec<String> = env::vars_os()
        .filter_map(|(key, _)| key.into_string().ok())
        .filter(|key| key.starts_with(PREFIX))
        .collect();
    for key in keys {
        held.remove_var(key);
    }
    held
}
