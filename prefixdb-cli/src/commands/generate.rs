//! `prefixdb generate`: build a database from a dataset.

use std::io::Write;

use prefixdb::Diagnostics;
use prefixdb::store::MemoryStore;

use crate::cli::GenerateArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::{fs_helpers, output};

pub(super) fn run(args: &GenerateArgs, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    fs_helpers::require_extension(&args.output, fs_helpers::DATABASE_EXTENSION)?;
    let mut diagnostics = Diagnostics::new();
    let dataset = super::load_dataset(&args.input, &mut diagnostics)?;
    let metadata = dataset.database_metadata(&mut diagnostics)?;

    let mut store = MemoryStore::create(metadata, settings.store_options());
    let processed = super::apply(&dataset, &mut store, settings, &diagnostics)?;
    let written = super::persist(&store, &args.output)?;
    output::line(
        out,
        format_args!(
            "generated {} from {processed} entries ({written} bytes)",
            args.output
        ),
    )
}
