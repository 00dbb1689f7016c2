//! Time Series Analysis Module
//!
//! Monthly aggregation of the order stream and autocorrelation diagnostics
//! of the resulting series.

pub mod autocorrelation;
pub mod monthly;

pub use autocorrelation::{
    autocorrelation, ljung_box, test_autocorrelation, AcfPoint, AutocorrelationOutcome,
    AutocorrelationResult, AutocorrelationVerdict, LjungBoxLag,
};
pub use monthly::{monthly_summary, MonthlyField, MonthlySummary, MonthlySummaryTable, YearMonth};
