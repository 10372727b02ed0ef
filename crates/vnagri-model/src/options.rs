//! Analysis options and their defaults.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Minimum plausible unit price in the source currency.
pub const DEFAULT_PRICE_FLOOR: f64 = 1000.0;

/// Multiplier applied to the IQR when building outlier fences.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Outlier classification rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierPolicy {
    /// Prices below this value are always outliers, whatever the fence says.
    pub price_floor: f64,
    pub iqr_multiplier: f64,
}

impl Default for OutlierPolicy {
    fn default() -> Self {
        Self {
            price_floor: DEFAULT_PRICE_FLOOR,
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
        }
    }
}

/// Inclusive date window used for price-series views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DisplayWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap_or_default(),
        }
    }
}

/// Header text of the required source columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub item_name: String,
    pub price: String,
    pub date: String,
    pub unit: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            item_name: "Tên_mặt_hàng".to_string(),
            price: "Giá".to_string(),
            date: "Ngày".to_string(),
            unit: "Đơn_vị_tính".to_string(),
        }
    }
}

/// Options shared by the loader, the engine and the CLI.
///
/// Loaded from TOML; every field is optional and falls back to its default.
///
/// ```toml
/// [outliers]
/// price_floor = 500.0
///
/// [display_window]
/// start = "2021-01-01"
/// end = "2024-12-31"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub outliers: OutlierPolicy,
    pub display_window: DisplayWindow,
    pub columns: ColumnNames,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = toml::from_str(&text).map_err(|source| ModelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }

    #[must_use]
    pub fn with_price_floor(mut self, price_floor: f64) -> Self {
        self.outliers.price_floor = price_floor;
        self
    }

    #[must_use]
    pub fn with_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.outliers.iqr_multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn with_display_window(mut self, window: DisplayWindow) -> Self {
        self.display_window = window;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Reject option values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.outliers.price_floor.is_finite() {
            return Err(ModelError::InvalidOption {
                name: "price_floor",
                reason: format!("must be finite, got {}", self.outliers.price_floor),
            });
        }
        let multiplier = self.outliers.iqr_multiplier;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(ModelError::InvalidOption {
                name: "iqr_multiplier",
                reason: format!("must be a non-negative finite number, got {multiplier}"),
            });
        }
        if self.display_window.start > self.display_window.end {
            return Err(ModelError::InvalidOption {
                name: "display_window",
                reason: format!(
                    "start {} is after end {}",
                    self.display_window.start, self.display_window.end
                ),
            });
        }
        for (name, header) in [
            ("columns.item_name", &self.columns.item_name),
            ("columns.price", &self.columns.price),
            ("columns.date", &self.columns.date),
            ("columns.unit", &self.columns.unit),
        ] {
            if header.trim().is_empty() {
                return Err(ModelError::InvalidOption {
                    name,
                    reason: "header must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}
