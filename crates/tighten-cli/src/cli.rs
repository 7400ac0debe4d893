//! Clap definitions for the `tighten` command surface.

use clap::{Parser, Subcommand};

/// Help text describing the configuration flags split out before parsing.
const CONFIG_HELP: &str = "\
Configuration flags must precede the subcommand:
  --config-path <PATH>          Configuration file to layer over the defaults
  --recipe-path <PATH>          Recipe describing roots, rules and the verification plan
  --backup-path <PATH>          Backup slot written while an edit is in flight
  --log-filter <FILTER>         tracing filter expression
  --log-format <json|compact>   Log output format
  --verify-timeout-secs <SECS>  Deadline for each verification step (0 waits indefinitely)";

#[derive(Parser, Debug)]
#[command(
    name = "tighten",
    version,
    about = "Applies textual rules one line at a time, keeping only edits that still verify.",
    after_help = CONFIG_HELP,
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// Operation to perform against the configured recipe.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Applies every rule, committing edits that pass verification.
    Run,
    /// Lists the lines each rule would currently attempt.
    Preview,
    /// Runs the verification plan once against the unmodified tree.
    Verify,
    /// Lists the files discovered under the recipe's roots.
    Files,
}
