//! `prefixdb version`.

use std::io::Write;

use crate::error::CliError;
use crate::output;

pub(super) fn run(out: &mut dyn Write) -> Result<(), CliError> {
    output::line(out, format_args!("prefixdb {}", env!("CARGO_PKG_VERSION")))?;
    output::line(out, env!("CARGO_PKG_DESCRIPTION"))?;
    output::line(out, format_args!("homepage: {}", env!("CARGO_PKG_HOMEPAGE")))
}
