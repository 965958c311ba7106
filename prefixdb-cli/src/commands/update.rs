//! `prefixdb update`: apply a dataset to an existing database.

use std::io::Write;

use prefixdb::Diagnostics;

use crate::cli::UpdateArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::{fs_helpers, output};

pub(super) fn run(args: &UpdateArgs, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    fs_helpers::require_extension(&args.output, fs_helpers::DATABASE_EXTENSION)?;
    let mut store = super::load_store(&args.input, settings)?;
    let mut diagnostics = Diagnostics::new();
    let dataset = super::load_dataset(&args.dataset, &mut diagnostics)?;

    let processed = super::apply(&dataset, &mut store, settings, &diagnostics)?;
    let written = super::persist(&store, &args.output)?;
    output::line(
        out,
        format_args!(
            "updated {} with {processed} entries into {} ({written} bytes)",
            args.input, args.output
        ),
    )
}
