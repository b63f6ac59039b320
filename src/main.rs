//! splitdb CLI entry point
//!
//! Parsing, configuration and dispatch all live in the CLI module. This file
//! only maps the outcome to an exit status.

use splitdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}
