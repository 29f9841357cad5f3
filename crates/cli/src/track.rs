//! `devtrack overdue | stats | transcribe`: single-pass commands on one export.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use devtrack_engine::{Sheet, Workbook};
use devtrack_recon::aggregate::build_statistics;
use devtrack_recon::ingest::{ingest_overview, ingest_statistics};
use devtrack_recon::report::build_report;
use devtrack_recon::transcribe::{transcribe, TranscriptionStats};
use devtrack_recon::{IngestOptions, OverviewIngest, Remark, ReconError, StatisticsReport};

use crate::{run_context, CliError, SourceArgs};

/// Load a workbook, mapping read failures to exit codes.
pub(crate) fn load_workbook(path: &Path) -> Result<Workbook, CliError> {
    devtrack_io::load(path).map_err(CliError::io)
}

/// Pick a sheet by name, or the first one.
pub(crate) fn select_sheet<'a>(workbook: &'a Workbook, name: Option<&str>) -> Result<&'a Sheet, CliError> {
    workbook.resolve(name).ok_or_else(|| {
        let sheet = name.unwrap_or("<first>").to_string();
        CliError::recon(ReconError::SheetNotFound { sheet })
            .with_hint(format!("available sheets: {}", workbook.sheet_names().join(", ")))
    })
}

/// Where a rewritten workbook goes when no output path is given: the input
/// itself when it is xlsx, otherwise an `.xlsx` next to it.
pub(crate) fn default_output(input: &Path) -> PathBuf {
    let is_xlsx = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        input.to_path_buf()
    } else {
        input.with_extension("xlsx")
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("devtrack")
        .to_string()
}

// ============================================================================
// overdue
// ============================================================================

pub fn cmd_overdue(
    source: SourceArgs,
    report: Option<PathBuf>,
    json: bool,
    allow_missing_holder: bool,
    project: Option<String>,
    today: Option<NaiveDate>,
) -> Result<(), CliError> {
    let workbook = load_workbook(&source.file)?;
    let sheet = select_sheet(&workbook, source.sheet.as_deref())?;

    let project = project.unwrap_or_else(|| file_label(&source.file));
    let ctx = run_context(today, &project, "");
    let options = IngestOptions {
        require_action_holder: !allow_missing_holder,
        ..IngestOptions::default()
    };

    let ingest = ingest_overview(sheet, source.header_row, ctx.now, &options).map_err(CliError::recon)?;

    if let Some(ref path) = report {
        devtrack_io::xlsx::export_report(&build_report(&ingest, &ctx), path).map_err(CliError::io)?;
        eprintln!("wrote {}", path.display());
    }

    if json {
        let json_str = serde_json::to_string_pretty(&ingest)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print_overview(&ingest);
    }
    Ok(())
}

pub(crate) fn print_overview(ingest: &OverviewIngest) {
    println!(
        "{} active measures need attention, {} concepts",
        ingest.deviations.len(),
        ingest.concepts.len()
    );
    for remark in [Remark::Overdue, Remark::DueSoon, Remark::NoDate] {
        println!("  {:<26} {}", remark.label(), ingest.count(remark));
    }
    if ingest.unparsable_dates > 0 {
        println!("  {} planned dates could not be read", ingest.unparsable_dates);
    }
    if !ingest.action_holders.is_empty() {
        let holders: Vec<&str> = ingest.action_holders.iter().map(String::as_str).collect();
        println!("action holders: {}", holders.join(", "));
    }
}

// ============================================================================
// stats
// ============================================================================

pub fn cmd_stats(source: SourceArgs, json: bool) -> Result<(), CliError> {
    let workbook = load_workbook(&source.file)?;
    let sheet = select_sheet(&workbook, source.sheet.as_deref())?;

    let records = ingest_statistics(sheet, source.header_row, &IngestOptions::default())
        .map_err(CliError::recon)?;
    let report = build_statistics(records);

    if json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    } else {
        print_statistics(&report);
    }
    Ok(())
}

pub(crate) fn print_statistics(report: &StatisticsReport) {
    let s = &report.summary;
    println!(
        "{} handled measures: {} with both dates, {} missing a date",
        s.total_filtered, s.valid_dates, s.missing_dates
    );
    println!("  on time   {:>5} ({:.1}%)", s.on_time_count, s.on_time_percent);
    println!("  late      {:>5} ({:.1}%)", s.overdue_count, s.overdue_percent);
    println!("  status    {}", s.traffic_light);

    if !report.disciplines.is_empty() {
        println!("late days per discipline:");
        for d in &report.disciplines {
            println!(
                "  {:<28} {:>4} late, {:>6} days, {:>7.1} avg",
                d.discipline, d.occurrences, d.total_late_days, d.average_late_days
            );
        }
    }
}

// ============================================================================
// transcribe
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn cmd_transcribe(
    overview: PathBuf,
    database: PathBuf,
    overview_sheet: Option<String>,
    overview_header_row: usize,
    sheet: Option<String>,
    header_row: usize,
    station: String,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let source_book = load_workbook(&overview)?;
    let source = select_sheet(&source_book, overview_sheet.as_deref())?;

    let mut target_book = load_workbook(&database)?;
    let target = select_sheet(&target_book, sheet.as_deref())?;

    let ctx = run_context(None, &file_label(&overview), &station);
    let result = transcribe(source, overview_header_row, target, header_row, &ctx).map_err(CliError::recon)?;

    target_book.replace(result.sheet);
    let out = output.unwrap_or_else(|| default_output(&database));
    devtrack_io::xlsx::export_workbook(&target_book, &out).map_err(CliError::io)?;
    eprintln!("wrote {}", out.display());

    print_transcription(&result.stats);
    Ok(())
}

pub(crate) fn print_transcription(stats: &TranscriptionStats) {
    println!(
        "transcribed {} rows ({} before, {} stale rows cleared)",
        stats.source_rows, stats.previous_rows, stats.cleared_rows
    );
    println!("  matched columns:   {}", stats.matched_columns.len());
    if !stats.unmatched_columns.is_empty() {
        println!("  unmatched columns: {}", stats.unmatched_columns.join(", "));
    }
}
