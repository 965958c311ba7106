//! Helpers for running configuration tests inside a `figment::Jail`.
//!
//! A jail gives the closure a private working directory and restores the
//! environment afterwards, which is what layered configuration tests need
//! when they drop a `prefixdb.toml` next to the process or set `PREFIXDB_*`
//! variables.

use anyhow::{Result, anyhow};

/// Runs `f` inside a [`figment::Jail`] and returns its output.
///
/// The jail is torn down even when the closure fails.
///
/// # Errors
///
/// Returns an error when the jail cannot be set up or the closure fails.
///
/// # Examples
///
/// ```
/// use prefixdb_test_helpers::figment::with_jail;
///
/// let contents = with_jail(|jail| {
///     jail.create_file("prefixdb.toml", "strict = true")?;
///     Ok(std::fs::read_to_string("prefixdb.toml").map_err(|e| e.to_string())?)
/// })?;
/// assert_eq!(contents, "strict = true");
/// # Ok::<_, anyhow::Error>(())
/// ```
pub fn with_jail<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&mut figment::Jail) -> figment::error::Result<T>,
{
    let mut output = None;
    figment::Jail::try_with(|jail| {
        output = Some(f(jail)?);
        Ok(())
    })
    .map_err(|err| anyhow!(err.to_string()))?;
    output.ok_or_else(|| anyhow!("jail closure did not return a value"))
}

/// Converts any displayable error into a [`figment::Error`] so it can cross
/// the jail boundary with `?`.
#[expect(
    clippy::needless_pass_by_value,
    reason = "used as a map_err adaptor, which hands over ownership"
)]
pub fn figment_error<E: ToString>(err: E) -> figment::Error {
    figment::Error::from(err.to_string())
}
