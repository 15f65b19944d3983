//! Command-line interface definitions for the `rdb-lifecycle` binary.
//!
//! Shared between the binary and the build script, which renders the manual
//! page from the same parser.

use clap::Parser;

/// Provisions a demonstration database instance and reports on it.
///
/// The run takes no flags beyond `--help` and `--version`. Control-plane
/// settings are read from `RDB_*` environment variables and
/// `rdb-lifecycle.toml`.
#[derive(Debug, Parser)]
#[command(
    name = "rdb-lifecycle",
    version,
    about = "Create a managed database instance, wait for it, and print how to connect"
)]
pub(crate) struct Cli {}
