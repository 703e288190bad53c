//! sarbrowse CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, build the item
//! list, dispatch to the library and exit with appropriate status.
//! For programmatic use, prefer the library API (`sarbrowse::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
