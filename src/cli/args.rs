//! CLI argument definitions using clap
//!
//! Commands:
//! - splitdb validate [--skip-index] [--format text|json]
//! - splitdb build-index [--force] [--dry-run]
//! - splitdb ingest --candidates <path> [--dry-run]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// splitdb - validate yearly stock-split files and build the lookup index
#[derive(Parser, Debug)]
#[command(name = "splitdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the year files and the index
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the schema files
    #[arg(long, global = true)]
    pub schema_dir: Option<PathBuf>,

    /// Minimum log severity written to stderr (trace, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check every year file and the existing index
    Validate {
        /// Do not check the index file
        #[arg(long)]
        skip_index: bool,

        /// Report format on stdout
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rebuild the index from the year files
    BuildIndex {
        /// Build even when the dataset has findings
        #[arg(long)]
        force: bool,

        /// Build and check the index without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Merge candidate splits from a JSON file into the year files
    Ingest {
        /// JSON array of {ticker, execution_date, split_from, split_to}
        #[arg(long)]
        candidates: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
