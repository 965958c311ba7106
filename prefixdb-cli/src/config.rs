//! Layered configuration for `prefixdb`.
//!
//! Settings are merged from, lowest precedence first: built-in defaults, a
//! TOML file (`--config`, else `prefixdb.toml` in the working directory when
//! present), `PREFIXDB_*` environment variables, and command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use prefixdb::{DEFAULT_MAX_DEPTH, EngineConfig, FailurePolicy, StoreOptions};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::fs_helpers;

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "PREFIXDB_";

/// Configuration file read from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "prefixdb.toml";

/// Fully merged settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fail on schema type mismatches.
    pub strict: bool,
    /// Keep processing after a failing entry.
    pub continue_on_error: bool,
    /// Maximum record nesting depth.
    pub max_depth: usize,
    /// Disable IPv4 aliasing in IPv6 stores.
    pub disable_ipv4_aliasing: bool,
    /// Accept networks inside reserved ranges.
    pub include_reserved_networks: bool,
    /// Rendering for structured output.
    pub format: OutputFormat,
    /// Log at debug level.
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: false,
            continue_on_error: false,
            max_depth: DEFAULT_MAX_DEPTH,
            disable_ipv4_aliasing: false,
            include_reserved_networks: false,
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Engine configuration derived from these settings.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            strict: self.strict,
            max_depth: self.max_depth,
            failure_policy: if self.continue_on_error {
                FailurePolicy::Continue
            } else {
                FailurePolicy::FailFast
            },
        }
    }

    /// Store options derived from these settings.
    #[must_use]
    pub const fn store_options(&self) -> StoreOptions {
        StoreOptions {
            disable_ipv4_aliasing: self.disable_ipv4_aliasing,
            include_reserved_networks: self.include_reserved_networks,
        }
    }
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Overrides {
    /// `--strict`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// `--continue-on-error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<bool>,
    /// `--max-depth`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    /// `--disable-ipv4-aliasing`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_ipv4_aliasing: Option<bool>,
    /// `--include-reserved-networks`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_reserved_networks: Option<bool>,
    /// `--format`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// `--verbose`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Merge every configuration layer into [`Settings`].
///
/// # Errors
///
/// Returns [`CliError::MissingConfig`] when an explicit configuration file
/// does not exist and [`CliError::Config`] when any layer holds a value of
/// the wrong type.
pub fn load(config_path: Option<&Utf8Path>, overrides: &Overrides) -> Result<Settings, CliError> {
    let file = config_file(config_path)?;
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(path) = &file {
        tracing::debug!(%path, "reading configuration file");
        figment = figment.merge(Toml::file_exact(path.as_std_path()));
    }
    figment
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
        .extract()
        .map_err(|err| CliError::Config(Box::new(err)))
}

fn config_file(explicit: Option<&Utf8Path>) -> Result<Option<Utf8PathBuf>, CliError> {
    match explicit {
        Some(path) if fs_helpers::is_file(path)? => Ok(Some(path.to_path_buf())),
        Some(path) => Err(CliError::MissingConfig(path.to_path_buf())),
        None => {
            let fallback = Utf8Path::new(DEFAULT_CONFIG_FILE);
            Ok(fs_helpers::is_file(fallback)?.then(|| fallback.to_path_buf()))
        }
    }
}
