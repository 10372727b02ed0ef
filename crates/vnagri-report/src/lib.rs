//! Serializers for analysis results.
//!
//! - **Reports**: any serializable report as YAML or pretty JSON
//! - **Row export**: selected price rows as comma-separated text

mod error;
mod export;
mod writer;

pub use error::{ReportError, Result};
pub use export::{export_rows_csv, write_rows_csv, write_table_csv};
pub use writer::{ReportFormat, write_json, write_report, write_report_file, write_yaml};
