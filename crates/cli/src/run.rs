//! `devtrack run | validate`: config-driven full reconciliation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use devtrack_engine::Workbook;
use devtrack_io::StagedOutputs;
use devtrack_recon::{reconcile, ReconConfig, ReconInputs, Reconciliation, Remark, SheetRef};

use crate::exit_codes::EXIT_USAGE;
use crate::track::{default_output, load_workbook, print_overview, print_statistics, print_transcription, select_sheet};
use crate::{run_context, CliError};

fn read_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot read config {}: {e}", config_path.display()),
        hint: None,
    })?;
    ReconConfig::from_toml(&config_str).map_err(CliError::recon)
}

/// Workbooks keyed by resolved path; a file named by several sections is read once.
struct Sources {
    base_dir: PathBuf,
    books: HashMap<PathBuf, Workbook>,
}

impl Sources {
    fn new(config_path: &Path) -> Self {
        // Resolve file paths relative to config file's directory
        let base_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { base_dir, books: HashMap::new() }
    }

    fn resolve(&self, file: &str) -> PathBuf {
        self.base_dir.join(file)
    }

    fn load(&mut self, file: &str) -> Result<PathBuf, CliError> {
        let path = self.resolve(file);
        if !self.books.contains_key(&path) {
            let book = load_workbook(&path)?;
            self.books.insert(path.clone(), book);
        }
        Ok(path)
    }

    fn book(&self, path: &Path) -> Result<&Workbook, CliError> {
        self.books
            .get(path)
            .ok_or_else(|| CliError::general(format!("{} was not loaded", path.display())))
    }
}

pub fn cmd_run(config_path: PathBuf, json_output: bool, today: Option<NaiveDate>) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let mut sources = Sources::new(&config_path);

    let overview_path = sources.load(&config.overview.file)?;
    let statistics_path = match config.statistics {
        Some(ref stats) => Some(sources.load(&stats.file)?),
        None => None,
    };
    let database_path = match config.database {
        Some(ref db) => Some(sources.load(&db.file)?),
        None => None,
    };

    let overview = SheetRef::new(
        select_sheet(sources.book(&overview_path)?, config.overview.sheet.as_deref())?,
        config.overview.header_row,
    );
    let statistics = match (&config.statistics, &statistics_path) {
        (Some(stats), Some(path)) => Some(SheetRef::new(
            select_sheet(sources.book(path)?, stats.sheet.as_deref())?,
            stats.header_row,
        )),
        _ => None,
    };
    let database = match (&config.database, &database_path) {
        (Some(db), Some(path)) => Some(SheetRef::new(
            select_sheet(sources.book(path)?, db.sheet.as_deref())?,
            db.header_row,
        )),
        _ => None,
    };

    let ctx = run_context(today, config.project_label(), &config.station);
    let inputs = ReconInputs { overview, statistics, database };
    let result = reconcile(&inputs, &ctx, &config.rules.ingest_options()).map_err(CliError::recon)?;

    let written = write_outputs(&config, &sources, database_path.as_deref(), &result)?;
    info!(config = %config.name, files = written.len(), "run complete");

    if json_output {
        let summary = json_summary(&config, &result, &written);
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        println!("{}", config.name);
        print_overview(&result.overview);
        if let Some(ref stats) = result.statistics {
            print_statistics(stats);
        }
        if let Some(ref transcription) = result.transcription {
            print_transcription(&transcription.stats);
        }
    }
    Ok(())
}

/// Write the report, the transcribed database and the JSON statistics.
/// Every file is staged first; none lands unless all of them could be
/// written. Returns the paths written, in that order.
fn write_outputs(
    config: &ReconConfig,
    sources: &Sources,
    database_path: Option<&Path>,
    result: &Reconciliation,
) -> Result<Vec<PathBuf>, CliError> {
    let mut staged = StagedOutputs::new();

    let report_path = sources.resolve(&config.report.output);
    staged.stage_report(&result.report, &report_path).map_err(CliError::io)?;

    if let (Some(db), Some(path), Some(transcription)) = (&config.database, database_path, &result.transcription) {
        let mut book = sources.book(path)?.clone();
        book.replace(transcription.sheet.clone());
        let out = match db.output {
            Some(ref output) => sources.resolve(output),
            None => default_output(path),
        };
        staged.stage_workbook(&book, &out).map_err(CliError::io)?;
    }

    if let (Some(json_file), Some(stats)) = (&config.report.json, &result.statistics) {
        let path = sources.resolve(json_file);
        staged.stage_statistics(stats, &path).map_err(CliError::io)?;
    }

    let written = staged.commit().map_err(CliError::io)?;
    for path in &written {
        eprintln!("wrote {}", path.display());
    }
    Ok(written)
}

fn json_summary(config: &ReconConfig, result: &Reconciliation, written: &[PathBuf]) -> serde_json::Value {
    let overview = &result.overview;
    json!({
        "name": config.name,
        "overview": {
            "deviations": overview.deviations.len(),
            "overdue": overview.count(Remark::Overdue),
            "due_soon": overview.count(Remark::DueSoon),
            "no_date": overview.count(Remark::NoDate),
            "concepts": overview.concepts.len(),
            "action_holders": overview.action_holders,
        },
        "statistics": result.statistics.as_ref().map(|s| &s.summary),
        "transcription": result.transcription.as_ref().map(|t| &t.stats),
        "written": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
    })
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    println!("{}: ok", config.name);
    println!("  overview:   {}", config.overview.file);
    if let Some(ref stats) = config.statistics {
        println!("  statistics: {}", stats.file);
    }
    if let Some(ref db) = config.database {
        println!("  database:   {} (header row {})", db.file, db.header_row);
    }
    println!("  report:     {}", config.report.output);
    Ok(())
}
