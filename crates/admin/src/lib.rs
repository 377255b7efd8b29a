//! This crate provides the command-line front end of `wsync`.
//!
//! The main entry point is [`run`], which parses arguments, loads process
//! configuration and dispatches to a command handler. The reconciliation
//! logic itself lives in `wsync-reconcile`; this crate only wires it to
//! Slack, the environment and the terminal.
//!
//! Listings and summaries are printed to stdout. Progress and diagnostics
//! go through `tracing` to stderr, filtered by `RUST_LOG` (default `info`).

mod app;
pub mod cli;
mod commands;

pub use app::run;
