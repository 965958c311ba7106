//! Subcommand implementations.
//!
//! Each command validates its paths, does its work through the engine and
//! writes human-readable or structured output to the writer it is handed.

mod dump;
mod generate;
mod inspect;
mod metadata;
mod update;
mod verify;
mod version;

use std::io::Write;

use camino::Utf8Path;
use prefixdb::store::{MemoryStore, Store};
use prefixdb::{Dataset, DatasetProcessor, Diagnostics};

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;
use crate::{fs_helpers, logging};

/// Run `command` with merged `settings`, writing results to `out`.
///
/// # Errors
///
/// Returns the first failure of the command.
pub fn dispatch(command: &Command, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Generate(args) => generate::run(args, settings, out),
        Command::Update(args) => update::run(args, settings, out),
        Command::Inspect(args) => inspect::run(args, settings, out),
        Command::Metadata(args) => metadata::run(args, settings, out),
        Command::Dump(args) => dump::run(args, out),
        Command::Verify(args) => verify::run(args, out),
        Command::Version => version::run(out),
    }
}

/// Load a dataset, forwarding parse diagnostics to the log.
fn load_dataset(path: &Utf8Path, diagnostics: &mut Diagnostics) -> Result<Dataset, CliError> {
    fs_helpers::require_input(path, fs_helpers::DATASET_EXTENSION)?;
    let dataset = Dataset::load(path, diagnostics)?;
    tracing::debug!(%path, entries = dataset.entries.len(), "loaded dataset");
    Ok(dataset)
}

/// Apply `dataset` to `store`, returning the number of entries applied.
///
/// With `continue_on_error` failing entries are logged and skipped;
/// otherwise the first failure is returned.
fn apply(
    dataset: &Dataset,
    store: &mut MemoryStore,
    settings: &Settings,
    diagnostics: &Diagnostics,
) -> Result<usize, CliError> {
    let report = DatasetProcessor::new(settings.engine_config()).process(dataset, store);
    logging::forward(diagnostics);
    logging::forward(&report.diagnostics);
    if settings.continue_on_error {
        for err in report.errors() {
            tracing::error!(error = %err, "skipped dataset entry");
        }
        return Ok(report.processed);
    }
    Ok(report.into_result()?)
}

/// Load a database from an existing `.prefixdb` file.
fn load_store(path: &Utf8Path, settings: &Settings) -> Result<MemoryStore, CliError> {
    fs_helpers::require_input(path, fs_helpers::DATABASE_EXTENSION)?;
    Ok(MemoryStore::load(path, settings.store_options())?)
}

/// Persist `store` to `path`, returning the number of bytes written.
fn persist(store: &MemoryStore, path: &Utf8Path) -> Result<u64, CliError> {
    let mut file = fs_helpers::create_output(path)?;
    let written = store.persist(&mut file)?;
    tracing::debug!(%path, bytes = written, "wrote database");
    Ok(written)
}
