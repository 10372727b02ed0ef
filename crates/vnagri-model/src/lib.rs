//! Shared data model for the market-price analysis crates.
//!
//! The loader produces a [`PriceTable`]; the statistics engine consumes it and
//! produces the report types in [`metadata`] and [`stats`]. Process-wide
//! defaults (price floor, IQR multiplier, display window, source column
//! headers) live in [`options`].

pub mod error;
pub mod metadata;
pub mod options;
pub mod stats;
pub mod table;

pub use error::{ModelError, Result};
pub use metadata::{
    CategoryCount, ColumnMetadata, ColumnSummary, ColumnType, DatasetReport, ItemMetadata,
    REPORT_DATE_FORMAT, ValueDomain, format_report_date,
};
pub use options::{
    AnalysisOptions, ColumnNames, DEFAULT_IQR_MULTIPLIER, DEFAULT_PRICE_FLOOR, DisplayWindow,
    OutlierPolicy,
};
pub use stats::{ItemOutlierInfo, OutlierThresholds, StatSummary};
pub use table::{CellRef, Column, ColumnRole, PriceRecord, PriceTable, SOURCE_DATE_FORMAT};
