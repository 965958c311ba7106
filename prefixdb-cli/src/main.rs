//! CLI entrypoint for `prefixdb`.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use prefixdb_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match prefixdb_cli::run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut stderr = std::io::stderr().lock();
            if writeln!(stderr, "prefixdb: {err}").is_err() {
                return ExitCode::from(2);
            }
            ExitCode::FAILURE
        }
    }
}
