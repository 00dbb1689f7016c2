pub mod csv;
pub mod report;

// Re-export commonly used functions
pub use csv::{read_orders, read_orders_from_reader};
pub use report::{
    kpi_file_name, write_kpis, write_monthly_summary, write_outputs, write_report_json,
    MONTHLY_SUMMARY_FILE, REPORT_FILE,
};
