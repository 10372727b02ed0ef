//! Column, item and dataset summaries.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};
use vnagri_model::{
    CategoryCount, ColumnMetadata, ColumnSummary, DatasetReport, ItemMetadata, OutlierPolicy,
    PriceTable, ValueDomain, format_report_date,
};

use crate::descriptive::compute_stats;
use crate::error::{Result, StatsError};
use crate::inference::{TypedColumn, infer_column};
use crate::outliers::{compute_outlier_thresholds, detect_outliers};

fn count_categories(values: &[&str]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for &value in values {
        match slots.get(value) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(value, counts.len());
                counts.push(CategoryCount {
                    name: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}

fn describe(
    typed: &TypedColumn<'_>,
    policy: &OutlierPolicy,
) -> Result<(ValueDomain, ColumnSummary)> {
    let described = match typed {
        TypedColumn::Text(values) => {
            let categories = count_categories(values);
            (
                ValueDomain::Categories {
                    values: categories.iter().map(|entry| entry.name.clone()).collect(),
                },
                ColumnSummary::Categorical {
                    distinct_count: categories.len(),
                    categories,
                },
            )
        }
        TypedColumn::Float(values) => {
            let stats = compute_stats(values)?;
            // Pooled over the whole column, unlike the per-item fences.
            let thresholds = compute_outlier_thresholds(values, policy.iqr_multiplier)?;
            (
                ValueDomain::Interval {
                    min: stats.min,
                    max: stats.max,
                },
                ColumnSummary::Numeric { stats, thresholds },
            )
        }
        TypedColumn::Datetime(values) => {
            let (Some(first), Some(last)) = (values.iter().min(), values.iter().max()) else {
                return Ok((ValueDomain::Unspecified, ColumnSummary::Omitted));
            };
            let first = format_report_date(*first);
            let last = format_report_date(*last);
            (
                ValueDomain::Period {
                    first: first.clone(),
                    last: last.clone(),
                },
                ColumnSummary::Temporal { first, last },
            )
        }
        TypedColumn::Unknown => (ValueDomain::Unspecified, ColumnSummary::Omitted),
    };
    Ok(described)
}

/// Metadata for every column of `table`, keyed by column name.
///
/// A column whose type cannot be inferred is reported as `unknown` with no
/// type-specific summary. When two columns share a header, the later one is
/// keyed `name#id`.
pub fn summarize_columns(
    table: &PriceTable,
    policy: &OutlierPolicy,
) -> Result<BTreeMap<String, ColumnMetadata>> {
    let mut columns = BTreeMap::new();
    for (id, column) in table.columns.iter().enumerate() {
        let typed = infer_column(table, column);
        let inferred_type = typed.column_type();
        let (value_domain, summary_data) = describe(&typed, policy)?;
        debug!(column = %column.name, id, %inferred_type, "summarized column");

        let key = if columns.contains_key(&column.name) {
            format!("{}#{id}", column.name)
        } else {
            column.name.clone()
        };
        columns.insert(
            key,
            ColumnMetadata {
                id,
                name: column.name.clone(),
                inferred_type,
                value_domain,
                summary_data,
            },
        );
    }
    Ok(columns)
}

/// Per-item statistics, date span and outlier diagnostics, keyed by item id.
pub fn summarize_items(
    table: &PriceTable,
    policy: &OutlierPolicy,
) -> Result<BTreeMap<usize, ItemMetadata>> {
    let detection = detect_outliers(table, policy)?;
    let mut items = BTreeMap::new();
    for entry in detection.items {
        let records: Vec<_> = table.item_records(&entry.name).collect();
        let prices: Vec<f64> = records.iter().map(|record| record.price).collect();
        let stats = compute_stats(&prices)?;
        let (Some(first_update), Some(last_update)) = (
            records.iter().map(|record| record.date).min(),
            records.iter().map(|record| record.date).max(),
        ) else {
            return Err(StatsError::empty(format!("dates of item {:?}", entry.name)));
        };
        let unit = records
            .first()
            .map(|record| record.unit.clone())
            .unwrap_or_default();

        items.insert(
            entry.id,
            ItemMetadata {
                name: entry.name,
                unit,
                first_update,
                last_update,
                stats,
                outliers: entry.info,
            },
        );
    }
    Ok(items)
}

/// Full report: table shape, whole-table price statistics, column and item
/// summaries.
///
/// # Errors
///
/// [`StatsError::EmptyInput`] when the table has no rows.
pub fn summarize_dataset(table: &PriceTable, policy: &OutlierPolicy) -> Result<DatasetReport> {
    if table.is_empty() {
        return Err(StatsError::empty(format!("table {}", table.source)));
    }
    let price_stats = compute_stats(&table.prices())?;
    let columns = summarize_columns(table, policy)?;
    let items = summarize_items(table, policy)?;

    let report = DatasetReport {
        source: table.source.clone(),
        row_count: table.len(),
        column_count: table.column_count(),
        price_stats,
        columns,
        items,
    };
    info!(
        source = %report.source,
        rows = report.row_count,
        items = report.item_count(),
        items_with_outliers = report.items_with_outliers().count(),
        "summarized dataset"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use vnagri_model::{Column, ColumnRole, ColumnType, PriceRecord};

    fn at(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn table() -> PriceTable {
        let mut table = PriceTable::new(
            "gia-nong-san.html",
            vec![
                Column::new("STT", ColumnRole::Descriptive(0)),
                Column::new("Tên_mặt_hàng", ColumnRole::ItemName),
                Column::new("Giá", ColumnRole::Price),
                Column::new("Ngày", ColumnRole::Date),
                Column::new("Đơn_vị_tính", ColumnRole::Unit),
                Column::new("Ghi_chú", ColumnRole::Descriptive(1)),
            ],
        );
        let rows = [
            ("Cà chua", 12000.0, at(3, 2)),
            ("Bắp cải", 8000.0, at(1, 5)),
            ("Cà chua", 12500.0, at(1, 4)),
            ("Cà chua", 13000.0, at(2, 9)),
        ];
        for (index, (item, price, date)) in rows.into_iter().enumerate() {
            table.push(
                PriceRecord::new(item, price, date, "đ/kg")
                    .with_attributes(vec![(index + 1).to_string(), String::new()]),
            );
        }
        table
    }

    #[test]
    fn columns_are_typed_and_summarized() {
        let columns = summarize_columns(&table(), &OutlierPolicy::default()).unwrap();
        assert_eq!(columns.len(), 6);

        let counter = &columns["STT"];
        assert_eq!(counter.inferred_type, ColumnType::Unknown);
        assert_eq!(counter.summary_data, ColumnSummary::Omitted);
        assert_eq!(columns["Ghi_chú"].inferred_type, ColumnType::Unknown);

        let items = &columns["Tên_mặt_hàng"];
        assert_eq!(items.id, 1);
        assert_eq!(
            items.summary_data,
            ColumnSummary::Categorical {
                distinct_count: 2,
                categories: vec![
                    CategoryCount {
                        name: "Cà chua".into(),
                        count: 3
                    },
                    CategoryCount {
                        name: "Bắp cải".into(),
                        count: 1
                    },
                ],
            }
        );

        match &columns["Giá"].summary_data {
            ColumnSummary::Numeric { stats, thresholds } => {
                assert_eq!(stats.count, 4);
                assert_eq!(stats.min, 8000.0);
                // Pooled quartiles of [8000, 12000, 12500, 13000].
                assert_eq!(thresholds.q1, 11000.0);
                assert_eq!(thresholds.q3, 12625.0);
            }
            other => panic!("unexpected summary: {other:?}"),
        }

        assert_eq!(
            columns["Ngày"].summary_data,
            ColumnSummary::Temporal {
                first: "2024/01/04".into(),
                last: "2024/03/02".into(),
            }
        );
    }

    #[test]
    fn duplicate_headers_get_distinct_keys() {
        let mut table = table();
        table.columns[5].name = "STT".into();
        let columns = summarize_columns(&table, &OutlierPolicy::default()).unwrap();
        assert_eq!(columns["STT"].id, 0);
        assert_eq!(columns["STT#5"].id, 5);
    }

    #[test]
    fn items_carry_dates_units_and_outliers() {
        let items = summarize_items(&table(), &OutlierPolicy::default()).unwrap();
        assert_eq!(items.len(), 2);

        let tomato = &items[&0];
        assert_eq!(tomato.name, "Cà chua");
        assert_eq!(tomato.unit, "đ/kg");
        assert_eq!(tomato.first_update, at(1, 4));
        assert_eq!(tomato.last_update, at(3, 2));
        assert_eq!(tomato.stats.count, 3);
        assert_eq!(tomato.stats.median, 12500.0);
        assert!(!tomato.outliers.has_outliers);

        assert_eq!(items[&1].name, "Bắp cải");
        assert_eq!(items[&1].outliers.iqr, 0.0);
    }

    #[test]
    fn dataset_report_combines_everything() {
        let report = summarize_dataset(&table(), &OutlierPolicy::default()).unwrap();
        assert_eq!(report.source, "gia-nong-san.html");
        assert_eq!(report.row_count, 4);
        assert_eq!(report.column_count, 6);
        assert_eq!(report.price_stats.max, 13000.0);
        assert_eq!(report.item_count(), 2);
        assert_eq!(report.items_with_outliers().count(), 0);
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = table().with_records(Vec::new());
        assert!(matches!(
            summarize_dataset(&table, &OutlierPolicy::default()),
            Err(StatsError::EmptyInput { .. })
        ));
        // Column summaries degrade to unknown instead.
        let columns = summarize_columns(&table, &OutlierPolicy::default()).unwrap();
        assert!(
            columns
                .values()
                .all(|column| column.inferred_type == ColumnType::Unknown)
        );
    }
}
