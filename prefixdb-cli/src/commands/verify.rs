//! `prefixdb verify`: check a database for structural problems.

use std::io::Write;

use prefixdb::store::MemoryStore;

use crate::cli::VerifyArgs;
use crate::error::CliError;
use crate::{fs_helpers, output};

pub(super) fn run(args: &VerifyArgs, out: &mut dyn Write) -> Result<(), CliError> {
    fs_helpers::require_input(&args.input, fs_helpers::DATABASE_EXTENSION)?;
    let report = MemoryStore::verify_file(&args.input)?;
    if report.is_valid() {
        return output::line(
            out,
            format_args!("{}: valid ({} entries)", args.input, report.entries),
        );
    }
    output::line(out, format_args!("{}: invalid", args.input))?;
    for problem in &report.problems {
        output::line(out, format_args!("  {problem}"))?;
    }
    Err(CliError::VerificationFailed {
        path: args.input.clone(),
        problems: report.problems.len(),
    })
}
