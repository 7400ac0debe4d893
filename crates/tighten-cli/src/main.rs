//! CLI entrypoint for the `tighten` line-tightening tool.
//!
//! The binary delegates to [`tighten_cli::run`], which loads configuration,
//! parses the subcommand, and drives the engine against the configured
//! recipe.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tighten_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
