//! Command-line interface for the `wsync` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `wsync-admin` crate.

use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    wsync_admin::run()
}
