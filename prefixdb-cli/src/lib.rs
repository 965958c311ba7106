//! Library interface for the `prefixdb` command-line tool.
//!
//! [`run`] takes parsed [`Cli`] arguments, merges configuration layers and
//! dispatches to the selected subcommand. Output goes to the supplied writer
//! so commands can be exercised without a terminal.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs_helpers;
pub mod logging;
pub mod output;

use std::io::Write;

pub use cli::Cli;
pub use error::CliError;

/// Run the command described by `cli`, writing results to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when configuration cannot be loaded or the command
/// fails.
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let mut overrides = cli.command.overrides();
    if cli.global.is_verbose {
        overrides.verbose = Some(true);
    }
    let settings = config::load(cli.global.config.as_deref(), &overrides)?;
    logging::init(settings.verbose);
    tracing::debug!(?settings, "resolved configuration");
    commands::dispatch(&cli.command, &settings, out)
}
