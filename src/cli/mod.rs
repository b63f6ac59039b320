//! Command-line interface
//!
//! - validate: check the year files and the existing index
//! - build-index: rebuild the index from the year files
//! - ingest: merge candidate splits into the year files

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, OutputFormat};
pub use commands::{
    build_index, ingest, load_schemas, run, run_command, validate, BuildOutcome, IngestOutcome,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{render_report, write_json, write_text};
