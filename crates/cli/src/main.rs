// devtrack CLI - deviation tracking from spreadsheet exports

mod exit_codes;
mod run;
mod track;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use devtrack_io::IoError;
use devtrack_recon::{ReconError, RunContext};

use exit_codes::{io_exit_code, recon_exit_code, EXIT_ERROR, EXIT_SUCCESS};

#[derive(Parser)]
#[command(name = "devtrack")]
#[command(about = "Deviation tracking: overdue measures, completion statistics, database transcription")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log more to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Input table location shared by the ingesting commands.
#[derive(Args)]
struct SourceArgs {
    /// Overview export (xlsx, xls, ods or csv)
    file: PathBuf,

    /// Sheet name (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based row holding the column labels
    #[arg(long, default_value_t = 0)]
    header_row: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// List active measures that are overdue or due within 31 days
    #[command(after_help = "\
Examples:
  devtrack overdue overview.xlsx
  devtrack overdue overview.xlsx --report report.xlsx --project 'Station Noord'
  devtrack overdue overview.csv --json --today 2026-10-17")]
    Overdue {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the styled report workbook
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Keep active measures that have no action holder
        #[arg(long)]
        allow_missing_holder: bool,

        /// Project label for the report metadata (default: file name)
        #[arg(long)]
        project: Option<String>,

        /// Classify against this date instead of the local clock (YYYY-MM-DD)
        #[arg(long, env = "DEVTRACK_TODAY")]
        today: Option<NaiveDate>,
    },

    /// Completion statistics for handled measures
    #[command(after_help = "\
Examples:
  devtrack stats overview.xlsx
  devtrack stats overview.xlsx --sheet Export --json")]
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// Copy overview rows into the deviation database, matching columns by label
    #[command(after_help = "\
Examples:
  devtrack transcribe overview.xlsx database.xlsx
  devtrack transcribe overview.xlsx database.xlsx --sheet Data --station Noord
  devtrack transcribe overview.xlsx database.xlsx --output database.new.xlsx")]
    Transcribe {
        /// Overview export (xlsx, xls, ods or csv)
        overview: PathBuf,

        /// Database workbook to update
        database: PathBuf,

        /// Overview sheet name (default: first sheet)
        #[arg(long)]
        overview_sheet: Option<String>,

        /// 0-based header row of the overview
        #[arg(long, default_value_t = 0)]
        overview_header_row: usize,

        /// Database sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// 0-based header row of the database
        #[arg(long, default_value_t = 1)]
        header_row: usize,

        /// Label written into the Station column
        #[arg(long, default_value = "")]
        station: String,

        /// Write here instead of overwriting the database
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run every pass from a TOML config
    #[command(after_help = "\
Examples:
  devtrack run devtrack.toml
  devtrack run devtrack.toml --json")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        /// Output JSON summary to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Classify against this date instead of the local clock (YYYY-MM-DD)
        #[arg(long, env = "DEVTRACK_TODAY")]
        today: Option<NaiveDate>,
    },

    /// Validate a config without running
    #[command(after_help = "\
Examples:
  devtrack validate devtrack.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  devtrack-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

/// Logs go to stderr so JSON on stdout stays machine-readable.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: devtrack <command> [options]");
            eprintln!("       devtrack --help for more information");
            Ok(())
        }
        Some(Commands::Overdue {
            source,
            report,
            json,
            allow_missing_holder,
            project,
            today,
        }) => track::cmd_overdue(source, report, json, allow_missing_holder, project, today),
        Some(Commands::Stats { source, json }) => track::cmd_stats(source, json),
        Some(Commands::Transcribe {
            overview,
            database,
            overview_sheet,
            overview_header_row,
            sheet,
            header_row,
            station,
            output,
        }) => track::cmd_transcribe(
            overview,
            database,
            overview_sheet,
            overview_header_row,
            sheet,
            header_row,
            station,
            output,
        ),
        Some(Commands::Run { config, json, today }) => run::cmd_run(config, json, today),
        Some(Commands::Validate { config }) => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Context for one invocation. `--today` pins the date; the time of day
/// still comes from the local clock.
pub(crate) fn run_context(today: Option<NaiveDate>, project: &str, station: &str) -> RunContext {
    match today {
        Some(date) => RunContext::new(date.and_time(Local::now().time()), project, station),
        None => RunContext::now_local(project, station),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Failure with no more specific exit code.
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumns { .. } => {
                Some("check --header-row points at the row with the column labels".to_string())
            }
            ReconError::EmptyInput { .. } => {
                Some("the export has a header but no rows; re-export the overview".to_string())
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn io(err: IoError) -> Self {
        Self { code: io_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
