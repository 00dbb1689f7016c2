//! Persisting analysis results: KPI and monthly tables as CSV, the whole
//! report as JSON

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisReport;
use crate::config::OutputConfig;
use crate::error::{Error, Result};
use crate::io::csv::{cell, write_rows};
use crate::kpi::{GroupDimension, KpiRow};
use crate::time_series::monthly::MonthlySummaryTable;

/// File name of the KPI table of one dimension
pub fn kpi_file_name(dimension: GroupDimension) -> String {
    format!("kpis_{}.csv", dimension)
}

pub const MONTHLY_SUMMARY_FILE: &str = "monthly_summary.csv";
pub const REPORT_FILE: &str = "report.json";

/// Write `kpis_<dimension>.csv` into `dir`
pub fn write_kpis(dir: &Path, dimension: GroupDimension, rows: &[KpiRow]) -> Result<PathBuf> {
    let path = dir.join(kpi_file_name(dimension));
    let header = [
        dimension.as_str(),
        "total_orders",
        "total_revenue",
        "avg_ticket",
        "avg_lead_time",
        "total_discount",
        "avg_freight_share",
        "pct_canceled",
        "pct_late",
    ];

    write_rows(
        &path,
        &header,
        rows.iter().map(|r| {
            vec![
                r.key.clone(),
                r.orders.to_string(),
                r.total_revenue.to_string(),
                cell(r.avg_ticket),
                cell(r.avg_lead_time),
                r.total_discount.to_string(),
                cell(r.avg_freight_share),
                cell(r.pct_canceled),
                cell(r.pct_late),
            ]
        }),
    )?;

    Ok(path)
}

/// Write `monthly_summary.csv` into `dir`
pub fn write_monthly_summary(dir: &Path, summary: &MonthlySummaryTable) -> Result<PathBuf> {
    let path = dir.join(MONTHLY_SUMMARY_FILE);

    write_rows(
        &path,
        &["year_month", "revenue", "freight", "orders"],
        summary.rows().iter().map(|r| {
            vec![
                r.month.to_string(),
                r.revenue.to_string(),
                r.freight.to_string(),
                r.orders.to_string(),
            ]
        }),
    )?;

    Ok(path)
}

/// Write the full report as pretty-printed JSON into `dir`
pub fn write_report_json(dir: &Path, report: &AnalysisReport) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE);
    let file = File::create(&path).map_err(Error::Io)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).map_err(Error::Json)?;
    Ok(path)
}

/// Write every table of the report, and the JSON report when enabled
///
/// Creates the output directory if needed and returns the written paths.
pub fn write_outputs(report: &AnalysisReport, output: &OutputConfig) -> Result<Vec<PathBuf>> {
    let dir = output.directory.as_path();
    fs::create_dir_all(dir).map_err(|e| {
        Error::IoError(format!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let mut written = Vec::new();

    for outcome in &report.kpis {
        if let Some(rows) = outcome.rows() {
            written.push(write_kpis(dir, outcome.dimension(), rows)?);
        }
    }

    written.push(write_monthly_summary(dir, &report.monthly)?);

    if output.write_json {
        written.push(write_report_json(dir, report)?);
    }

    for path in &written {
        log::info!("Wrote {}", path.display());
    }

    Ok(written)
}
