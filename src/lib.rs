// Core module with the error taxonomy
pub mod core;

// Data model and per-record features
pub mod dataset;
pub mod error;
pub mod features;

// Analyses
pub mod analysis;
pub mod groupby;
pub mod kpi;
pub mod stats;
pub mod time_series;

// Loading, persistence and settings
pub mod config;
pub mod io;

// Re-export core types
pub use core::error::{Error, Result};

pub use analysis::{run, AnalysisReport, DatasetInspection};
pub use config::AnalysisConfig;
pub use dataset::{Column, ColumnSet, OrderRecord, OrderTable};
pub use features::derive_features;
pub use groupby::OrderGroupBy;
pub use kpi::{compute_all_kpis, compute_kpis, GroupDimension, KpiOutcome, KpiRow};
pub use stats::{
    ConfidenceInterval, DescriptiveStats, Indicator, IndicatorInterval, IndicatorOutcome,
    NormalityOutcome,
};
pub use time_series::{
    AutocorrelationOutcome, MonthlyField, MonthlySummary, MonthlySummaryTable, YearMonth,
};

// Export version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
