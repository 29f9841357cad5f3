use devtrack_engine::Sheet;
use tracing::info;

use crate::aggregate::build_statistics;
use crate::config::IngestOptions;
use crate::context::RunContext;
use crate::error::ReconError;
use crate::ingest::{ingest_overview, ingest_statistics};
use crate::model::{OverviewIngest, StatisticsReport};
use crate::report::{build_report, Report};
use crate::transcribe::{transcribe, Transcription};

/// A sheet plus the 0-based row holding its column labels.
#[derive(Debug, Clone, Copy)]
pub struct SheetRef<'a> {
    pub sheet: &'a Sheet,
    pub header_row: usize,
}

impl<'a> SheetRef<'a> {
    pub fn new(sheet: &'a Sheet, header_row: usize) -> Self {
        Self { sheet, header_row }
    }
}

/// Loaded inputs for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReconInputs<'a> {
    pub overview: SheetRef<'a>,
    pub statistics: Option<SheetRef<'a>>,
    pub database: Option<SheetRef<'a>>,
}

/// Everything one run produces. Built fresh on every call.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub overview: OverviewIngest,
    pub statistics: Option<StatisticsReport>,
    pub report: Report,
    /// Transcribed copy of the database sheet, when one was given.
    pub transcription: Option<Transcription>,
}

/// Run every pass over the inputs.
///
/// All-or-nothing: the first hard failure is returned and nothing else is
/// produced. Same inputs and context give the same result.
pub fn reconcile(
    inputs: &ReconInputs<'_>,
    ctx: &RunContext,
    options: &IngestOptions,
) -> Result<Reconciliation, ReconError> {
    let overview = ingest_overview(
        inputs.overview.sheet,
        inputs.overview.header_row,
        ctx.now,
        options,
    )?;

    let statistics = match inputs.statistics {
        Some(src) => Some(build_statistics(ingest_statistics(
            src.sheet,
            src.header_row,
            options,
        )?)),
        None => None,
    };

    let report = build_report(&overview, ctx);

    let transcription = match inputs.database {
        Some(db) => Some(transcribe(
            inputs.overview.sheet,
            inputs.overview.header_row,
            db.sheet,
            db.header_row,
            ctx,
        )?),
        None => None,
    };

    info!(
        deviations = overview.deviations.len(),
        statistics = statistics.is_some(),
        transcribed = transcription.is_some(),
        "reconciliation complete"
    );

    Ok(Reconciliation {
        overview,
        statistics,
        report,
        transcription,
    })
}
