//! Command-line interface definitions for the `ci-trigger` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use camino::Utf8PathBuf;
use clap::Parser;

/// Top-level CLI for the `ci-trigger` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ci-trigger",
    about = "Package a source tree and submit virtual device builds to Cloud Build",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Submit one build per selected device.
    #[command(name = "submit", about = "Submit one build per selected device")]
    Submit(SubmitCommand),
}

/// Arguments for the `ci-trigger submit` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct SubmitCommand {
    /// Device catalog listing the virtual devices and their tests.
    #[arg(long, value_name = "FILE")]
    pub(crate) devices: Utf8PathBuf,
    /// Root of the source tree to package.
    ///
    /// The tree must contain `cloudbuild/virtual.yaml`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub(crate) source: Utf8PathBuf,
    /// Only submit devices whose platform key matches (for example
    /// `qemu_x86_64`).
    #[arg(long, value_name = "KEY")]
    pub(crate) platform: Option<String>,
}
