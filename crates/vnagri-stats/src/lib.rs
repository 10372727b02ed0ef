//! Outlier and metadata engine for commodity price tables.
//!
//! Statistics are computed at three granularities: the whole table, each
//! column, and each item. Outlier fences are always per item; the only pooled
//! fence is the one reported in a numeric column's summary.
//!
//! Table rewrites ([`remove_outliers`], [`substitute_outliers`]) return a new
//! table and leave their input alone.

mod descriptive;
mod error;
mod inference;
mod outliers;
mod series;
mod summary;

pub use descriptive::{compute_stats, multimode, quantile};
pub use error::{Result, StatsError};
pub use inference::{TypedColumn, infer_column, infer_text_column};
pub use outliers::{
    ItemOutliers, OutlierDetection, Replacement, adopt_substitution, compute_outlier_thresholds,
    detect_outliers, outlier_rows, remove_outliers, remove_outliers_once, substitute_outliers,
};
pub use series::{PricePoint, price_series};
pub use summary::{summarize_columns, summarize_dataset, summarize_items};
