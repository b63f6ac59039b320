//! CLI command implementations
//!
//! Each command is a plain function from configuration to an outcome, so it
//! can be driven from tests. `run_command` owns printing and turns findings
//! into a failing exit status.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::dataset::{merge_candidates, CandidateSplit, IngestOptions, IngestSummary, SourceFile};
use crate::index::{BuildSummary, IndexBuilder};
use crate::integrity::{IntegrityChecker, IntegrityReport};
use crate::model::{IndexFile, YearFile};
use crate::observability::{log_event_with_fields, Event, Logger, ObservationScope};
use crate::schema::SchemaLoader;

use super::args::{Cli, Command, OutputFormat};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{render_report, write_json, write_text};

/// Parse arguments, resolve configuration and run the command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::resolve(
        cli.config.as_deref(),
        cli.data_dir,
        cli.schema_dir,
        cli.log_level,
    )?;
    Logger::set_min_severity(config.severity()?);

    let data_dir = config.data_dir.display().to_string();
    let schema_dir = config.schema_dir.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("data_dir", &data_dir), ("schema_dir", &schema_dir)],
    );

    run_command(cli.command, &config)
}

/// Run the appropriate command and print its outcome
pub fn run_command(cmd: Command, config: &Config) -> CliResult<()> {
    match cmd {
        Command::Validate { skip_index, format } => {
            let report = validate(config, skip_index)?;
            match format {
                OutputFormat::Text => write_text(&render_report(&report))?,
                OutputFormat::Json => write_json(&report)?,
            }
            if report.has_errors() {
                return Err(CliError::validation_failed(format!(
                    "{} finding(s) in {} file(s)",
                    report.finding_count(),
                    report.invalid_file_count()
                )));
            }
            Ok(())
        }
        Command::BuildIndex { force, dry_run } => {
            let outcome = build_index(config, force, dry_run)?;
            write_json(&outcome)?;
            Ok(())
        }
        Command::Ingest {
            candidates,
            dry_run,
        } => {
            let outcome = ingest(config, &candidates, dry_run)?;
            write_json(&outcome)?;
            Ok(())
        }
    }
}

/// Loads the schema set named by the configuration.
pub fn load_schemas(config: &Config) -> CliResult<SchemaLoader> {
    let mut loader = SchemaLoader::new(&config.schema_dir);
    let builtin = loader.load_all()?;

    let count = loader.schema_count().to_string();
    if builtin {
        log_event_with_fields(
            Event::SchemasBuiltinFallback,
            &[("schema_dir", &config.schema_dir.display().to_string())],
        );
    }
    log_event_with_fields(Event::SchemasLoaded, &[("count", &count)]);
    Ok(loader)
}

fn read_dataset(config: &Config) -> CliResult<Vec<SourceFile>> {
    let sources = config.data().read_year_files()?;
    log_event_with_fields(
        Event::DatasetLoaded,
        &[("files", &sources.len().to_string())],
    );
    Ok(sources)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Checks every year file and, unless `skip_index`, the existing index.
pub fn validate(config: &Config, skip_index: bool) -> CliResult<IntegrityReport> {
    let loader = load_schemas(config)?;
    let scope = ObservationScope::new("VALIDATE");

    let sources = read_dataset(config)?;
    let index = if skip_index {
        None
    } else {
        config.data().read_index()?
    };

    let report = IntegrityChecker::new(&loader).check_all(&sources, index.as_ref())?;

    for file in &report.files {
        let event = if file.valid {
            Event::FileChecked
        } else {
            Event::FileInvalid
        };
        log_event_with_fields(
            event,
            &[
                ("file", &file.file),
                ("findings", &file.findings.len().to_string()),
            ],
        );
    }
    if let Some(index) = &report.index {
        log_event_with_fields(
            Event::IndexChecked,
            &[("file", &index.file), ("valid", &index.valid.to_string())],
        );
    }

    let findings = report.finding_count().to_string();
    let invalid = report.invalid_file_count().to_string();
    log_event_with_fields(
        Event::ValidationComplete,
        &[("findings", &findings), ("invalid_files", &invalid)],
    );
    scope.complete_with_fields(&[("findings", &findings)]);
    Ok(report)
}

/// Result of `build-index`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    pub path: PathBuf,
    pub written: bool,
    /// Year files left out because they do not decode
    pub skipped_files: Vec<String>,
    pub summary: BuildSummary,
    #[serde(skip)]
    pub index: IndexFile,
}

/// Rebuilds the index from the year files.
///
/// Refuses when the dataset has findings unless `force` is set. The built
/// index is checked against the index schema before anything is written;
/// with `dry_run` nothing is written at all.
pub fn build_index(config: &Config, force: bool, dry_run: bool) -> CliResult<BuildOutcome> {
    let loader = load_schemas(config)?;
    let checker = IntegrityChecker::new(&loader);
    let data = config.data();

    let sources = read_dataset(config)?;
    let report = checker.check_dataset(&sources)?;
    if report.has_errors() {
        let findings = report.finding_count().to_string();
        if !force {
            log_event_with_fields(Event::IndexBuildRefused, &[("findings", &findings)]);
            return Err(CliError::validation_failed(format!(
                "Dataset has {} finding(s) in {} file(s); run 'splitdb validate' or pass --force",
                findings,
                report.invalid_file_count()
            )));
        }
        log_event_with_fields(Event::IndexBuildForced, &[("findings", &findings)]);
    }

    let scope = ObservationScope::new("BUILD_INDEX");
    let (files, skipped_files) = decode_year_files(&sources);

    let build = IndexBuilder::new(config.build_options()).build_named(&files, today());
    for moved in &build.summary.isin_reassignments {
        log_event_with_fields(
            Event::IsinReassigned,
            &[
                ("isin", &moved.isin),
                ("previous_symbol", &moved.previous_symbol),
                ("symbol", &moved.symbol),
                ("year", &moved.year.to_string()),
            ],
        );
    }
    log_event_with_fields(
        Event::IndexBuilt,
        &[
            ("symbols", &build.summary.symbols.to_string()),
            ("total_splits", &build.summary.total_splits.to_string()),
        ],
    );

    let index_check = checker.check_built_index(data.index_file_name(), &build.index)?;
    if !index_check.is_valid() {
        let first = index_check
            .findings
            .first()
            .map(|f| f.to_string())
            .unwrap_or_default();
        scope.fail(&first);
        return Err(CliError::validation_failed(format!(
            "Built index does not conform to the index schema: {}",
            first
        )));
    }

    let path = if dry_run {
        data.index_path()
    } else {
        let path = data.write_index(&build.index)?;
        log_event_with_fields(
            Event::IndexWritten,
            &[("path", &path.display().to_string())],
        );
        path
    };

    scope.complete_with_fields(&[("dry_run", &dry_run.to_string())]);
    Ok(BuildOutcome {
        path,
        written: !dry_run,
        skipped_files,
        summary: build.summary,
        index: build.index,
    })
}

fn decode_year_files(sources: &[SourceFile]) -> (Vec<(String, YearFile)>, Vec<String>) {
    let mut files = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();
    for source in sources {
        match source.to_year_file() {
            Ok(file) => files.push((source.name.clone(), file)),
            Err(reason) => {
                log_event_with_fields(
                    Event::YearFileSkipped,
                    &[("file", &source.name), ("reason", &reason)],
                );
                skipped.push(source.name.clone());
            }
        }
    }
    (files, skipped)
}

/// Result of `ingest`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    #[serde(flatten)]
    pub summary: IngestSummary,
    /// Year files written, in year order; empty on a dry run
    pub written: Vec<PathBuf>,
}

/// Reads candidate splits from `candidates_path` and merges them into the
/// year files.
///
/// Existing year files must decode and declare the year their name carries.
/// Anything else is a hard error, since the merge rewrites files by year.
pub fn ingest(config: &Config, candidates_path: &Path, dry_run: bool) -> CliResult<IngestOutcome> {
    let content = fs::read_to_string(candidates_path).map_err(|e| {
        CliError::io_error(format!(
            "Failed to read candidates {}: {}",
            candidates_path.display(),
            e
        ))
    })?;
    let candidates: Vec<CandidateSplit> = serde_json::from_str(&content)?;
    log_event_with_fields(
        Event::CandidatesLoaded,
        &[("count", &candidates.len().to_string())],
    );

    let scope = ObservationScope::new("INGEST");
    let data = config.data();

    let mut files = data.load_year_files()?;

    let options = IngestOptions {
        source: config.ingest_source.clone(),
        year_file_schema_ref: config.year_file_schema_ref.clone(),
        today: today(),
    };
    let summary = merge_candidates(&mut files, &candidates, &options);

    for rejected in &summary.rejected {
        log_event_with_fields(
            Event::CandidateRejected,
            &[
                ("ticker", &rejected.candidate.ticker),
                ("execution_date", &rejected.candidate.execution_date),
                ("reason", rejected.reason),
            ],
        );
    }

    let mut written = Vec::new();
    if !dry_run {
        for year in &summary.touched_years {
            if let Some(file) = files.get(year) {
                let path = data.write_year_file(file)?;
                log_event_with_fields(
                    Event::YearFileWritten,
                    &[
                        ("path", &path.display().to_string()),
                        ("count", &file.count.to_string()),
                    ],
                );
                written.push(path);
            }
        }
    }

    let added = summary.added.len().to_string();
    let skipped = summary.skipped.len().to_string();
    let rejected = summary.rejected.len().to_string();
    log_event_with_fields(
        Event::IngestComplete,
        &[("added", &added), ("skipped", &skipped), ("rejected", &rejected)],
    );
    scope.complete_with_fields(&[("dry_run", &dry_run.to_string())]);

    Ok(IngestOutcome { summary, written })
}
