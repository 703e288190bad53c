//! Command Line Interface (CLI) layer for sarbrowse.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and manifest-driven
//! batch processing. It wires user-provided options to the library
//! functionality exposed via `sarbrowse::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
