//! Statistical summaries and outlier fences.

use serde::{Deserialize, Serialize};

/// Descriptive statistics of a price distribution.
///
/// Spread measures use population formulas (divide by N).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Every value sharing the highest frequency, in order of first appearance.
    pub mode: Vec<f64>,
    pub std_dev: f64,
    pub variance: f64,
}

/// Quartiles and the IQR fence derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierThresholds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierThresholds {
    /// Outlier predicate: below the price floor, or outside the fence.
    pub fn is_outlier(&self, value: f64, price_floor: f64) -> bool {
        value < price_floor || value < self.lower || value > self.upper
    }

    /// Lowest price that survives outlier removal.
    pub fn removal_floor(&self, price_floor: f64) -> f64 {
        price_floor.max(self.lower)
    }
}

/// Outlier diagnostics for one item, computed from that item's prices only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutlierInfo {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub has_outliers: bool,
    pub outlier_count: usize,
    /// Outlier rows over the total row count of the table.
    pub outlier_fraction: f64,
    /// Outlier rows over the row count of this item.
    pub item_outlier_fraction: f64,
}

impl ItemOutlierInfo {
    pub fn thresholds(&self) -> OutlierThresholds {
        OutlierThresholds {
            q1: self.q1,
            q3: self.q3,
            iqr: self.iqr,
            lower: self.min_threshold,
            upper: self.max_threshold,
        }
    }
}
