//! Report structures for columns, items and whole datasets.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::stats::{ItemOutlierInfo, OutlierThresholds, StatSummary};

/// Date layout used for every timestamp written into a report.
pub const REPORT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Format a timestamp the way reports show it (`YYYY/MM/DD`).
pub fn format_report_date(value: NaiveDateTime) -> String {
    value.format(REPORT_DATE_FORMAT).to_string()
}

fn serialize_report_date<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_report_date(*value))
}

/// Column type inferred from the values a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Float,
    Datetime,
    Unknown,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of values a column ranges over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Distinct values, in order of first appearance.
    Categories { values: Vec<String> },
    Interval { min: f64, max: f64 },
    Period { first: String, last: String },
    Unspecified,
}

/// Occurrence count of one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Type-specific summary of a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSummary {
    Categorical {
        distinct_count: usize,
        categories: Vec<CategoryCount>,
    },
    /// Statistics plus the pooled (whole-column) IQR fence.
    Numeric {
        stats: StatSummary,
        thresholds: OutlierThresholds,
    },
    Temporal {
        first: String,
        last: String,
    },
    /// Column type could not be determined; no type-specific fields.
    Omitted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    /// Position of the column in the source table.
    pub id: usize,
    pub name: String,
    pub inferred_type: ColumnType,
    pub value_domain: ValueDomain,
    pub summary_data: ColumnSummary,
}

/// Per-item report entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemMetadata {
    pub name: String,
    pub unit: String,
    #[serde(serialize_with = "serialize_report_date")]
    pub first_update: NaiveDateTime,
    #[serde(serialize_with = "serialize_report_date")]
    pub last_update: NaiveDateTime,
    pub stats: StatSummary,
    pub outliers: ItemOutlierInfo,
}

/// Top-level report for one loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub source: String,
    pub row_count: usize,
    pub column_count: usize,
    pub price_stats: StatSummary,
    pub columns: BTreeMap<String, ColumnMetadata>,
    /// Keyed by item id (first-appearance order).
    pub items: BTreeMap<usize, ItemMetadata>,
}

impl DatasetReport {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items whose own fence or the price floor flags at least one row.
    pub fn items_with_outliers(&self) -> impl Iterator<Item = (&usize, &ItemMetadata)> {
        self.items
            .iter()
            .filter(|(_, item)| item.outliers.has_outliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn report_dates_use_slashes() {
        let value = NaiveDate::from_ymd_opt(2021, 3, 7)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        assert_eq!(format_report_date(value), "2021/03/07");
    }

    #[test]
    fn column_type_serializes_lowercase() {
        let json = serde_json::to_string(&ColumnType::Datetime).unwrap();
        assert_eq!(json, "\"datetime\"");
        assert_eq!(ColumnType::Unknown.to_string(), "unknown");
    }

    #[test]
    fn summary_is_tagged_by_kind() {
        let summary = ColumnSummary::Temporal {
            first: "2020/01/01".to_string(),
            last: "2024/12/31".to_string(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["kind"], "temporal");
        assert_eq!(value["first"], "2020/01/01");
    }
}
