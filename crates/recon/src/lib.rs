//! `devtrack-recon`: deviation tracking reconciliation engine.
//!
//! Pure engine crate: receives loaded sheets, returns classified records,
//! statistics, a transcribed copy of the database sheet and a report layout.
//! No IO, no state kept between calls.

pub mod aggregate;
pub mod columns;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod report;
pub mod rules;
pub mod transcribe;

pub use config::{IngestOptions, ReconConfig};
pub use context::RunContext;
pub use engine::{reconcile, ReconInputs, Reconciliation, SheetRef};
pub use error::{IngestPass, ReconError};
pub use model::{
    Completion, ConceptRecord, DeviationRecord, DisciplineStat, OverviewIngest, Remark,
    StatisticsRecord, StatisticsReport, SummaryStatistics, TrafficLight,
};
