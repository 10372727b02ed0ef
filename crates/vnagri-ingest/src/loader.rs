//! Loading a price table from an export file.

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use vnagri_model::{
    AnalysisOptions, Column, ColumnNames, ColumnRole, PriceRecord, PriceTable, SOURCE_DATE_FORMAT,
};

use crate::decode::decode_utf16;
use crate::error::{IngestError, Result};
use crate::html::{RawTable, extract_first_table};

/// Parse a timestamp in the export's `month/day/year hour:minute:second AM|PM`
/// layout. Anything else is rejected; there is no lenient fallback.
pub fn parse_source_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), SOURCE_DATE_FORMAT).ok()
}

/// Parse a price cell. Comma thousands separators are accepted; negative and
/// non-finite values are not.
pub fn parse_price(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Load the price table at `path`.
///
/// # Errors
///
/// - [`IngestError::FileNotFound`] when the path does not exist
/// - a parse error (see [`IngestError::is_parse_error`]) when the document
///   holds no table, lacks a required column, or any date or price cell is
///   malformed; no partial table is returned
pub fn load_price_table(path: &Path, options: &AnalysisOptions) -> Result<PriceTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let html = decode_utf16(&bytes, path)?;
    let raw = extract_first_table(&html, path)?;
    let table = build_price_table(&raw, &path.display().to_string(), &options.columns, path)?;
    info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.column_count(),
        items = table.items().len(),
        "loaded price table"
    );
    Ok(table)
}

fn resolve_columns(raw: &RawTable, names: &ColumnNames, path: &Path) -> Result<Vec<Column>> {
    let required = [
        (names.item_name.as_str(), ColumnRole::ItemName),
        (names.price.as_str(), ColumnRole::Price),
        (names.date.as_str(), ColumnRole::Date),
        (names.unit.as_str(), ColumnRole::Unit),
    ];
    for (header, _) in &required {
        if raw.column_index(header).is_none() {
            return Err(IngestError::MissingColumn {
                column: (*header).to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    let mut assigned = Vec::new();
    let mut descriptive = 0usize;
    let mut columns = Vec::with_capacity(raw.headers.len());
    for header in &raw.headers {
        let role = required
            .iter()
            .find(|(name, role)| name.trim() == header.trim() && !assigned.contains(role))
            .map(|(_, role)| *role);
        let role = match role {
            Some(role) => {
                assigned.push(role);
                role
            }
            None => {
                descriptive += 1;
                ColumnRole::Descriptive(descriptive - 1)
            }
        };
        columns.push(Column::new(header.clone(), role));
    }
    Ok(columns)
}

/// Coerce a raw table into typed price records.
pub fn build_price_table(
    raw: &RawTable,
    source: &str,
    names: &ColumnNames,
    path: &Path,
) -> Result<PriceTable> {
    let columns = resolve_columns(raw, names, path)?;
    let mut table = PriceTable::new(source, columns.clone());

    for (index, cells) in raw.rows.iter().enumerate() {
        let row = index + 1;
        let mut item_name = "";
        let mut price = None;
        let mut date = None;
        let mut unit = "";
        let mut attributes = Vec::new();

        for (column, cell) in columns.iter().zip(cells) {
            match column.role {
                ColumnRole::ItemName => item_name = cell.as_str(),
                ColumnRole::Unit => unit = cell.as_str(),
                ColumnRole::Price => {
                    price = Some(parse_price(cell).ok_or_else(|| IngestError::InvalidPrice {
                        row,
                        value: cell.clone(),
                        path: path.to_path_buf(),
                    })?);
                }
                ColumnRole::Date => {
                    date = Some(parse_source_date(cell).ok_or_else(|| {
                        IngestError::InvalidDate {
                            row,
                            value: cell.clone(),
                            path: path.to_path_buf(),
                        }
                    })?);
                }
                ColumnRole::Descriptive(_) => attributes.push(cell.clone()),
            }
        }

        if item_name.trim().is_empty() {
            return Err(IngestError::EmptyItemName {
                row,
                path: path.to_path_buf(),
            });
        }
        // Rows are padded to the header width, so both cells were visited.
        let (Some(price), Some(date)) = (price, date) else {
            return Err(IngestError::InvalidPrice {
                row,
                value: String::new(),
                path: path.to_path_buf(),
            });
        };
        table.push(PriceRecord::new(item_name, price, date, unit).with_attributes(attributes));
    }

    debug!(
        source,
        rows = table.len(),
        descriptive_columns = table
            .columns
            .iter()
            .filter(|column| matches!(column.role, ColumnRole::Descriptive(_)))
            .count(),
        "coerced price records"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn raw(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable {
            headers: ["STT", "Tên_mặt_hàng", "Giá", "Ngày", "Đơn_vị_tính", "Thị_trường"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    fn build(raw: &RawTable) -> Result<PriceTable> {
        build_price_table(raw, "test", &ColumnNames::default(), Path::new("test.html"))
    }

    #[test]
    fn parses_source_dates() {
        let date = parse_source_date("03/15/2024 02:30:00 PM").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(date.hour(), 14);
        assert_eq!(
            parse_source_date(" 12/01/2023 12:00:00 AM ").unwrap().hour(),
            0
        );
    }

    #[test]
    fn rejects_other_date_layouts() {
        assert!(parse_source_date("2024-03-15").is_none());
        assert!(parse_source_date("2024-03-15 14:30:00").is_none());
        assert!(parse_source_date("15/03/2024 02:30:00 PM").is_none());
        assert!(parse_source_date("03/15/2024").is_none());
        assert!(parse_source_date("").is_none());
    }

    #[test]
    fn parses_prices_with_separators() {
        assert_eq!(parse_price("12000"), Some(12000.0));
        assert_eq!(parse_price("12,000"), Some(12000.0));
        assert_eq!(parse_price(" 1500.5 "), Some(1500.5));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("n/a"), None);
        assert_eq!(parse_price("NaN"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price("-350"), None);
        assert_eq!(parse_price("-1,200"), None);
        assert_eq!(parse_price("0"), Some(0.0));
    }

    #[test]
    fn assigns_roles_and_keeps_descriptive_columns() {
        let table = build(&raw(vec![vec![
            "1",
            "Cà chua",
            "12000",
            "01/15/2024 08:00:00 AM",
            "đ/kg",
            "Hà Nội",
        ]]))
        .unwrap();
        let roles: Vec<ColumnRole> = table.columns.iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                ColumnRole::Descriptive(0),
                ColumnRole::ItemName,
                ColumnRole::Price,
                ColumnRole::Date,
                ColumnRole::Unit,
                ColumnRole::Descriptive(1),
            ]
        );
        let record = &table.records[0];
        assert_eq!(record.item_name, "Cà chua");
        assert_eq!(record.price, 12000.0);
        assert_eq!(record.unit, "đ/kg");
        assert_eq!(record.attributes, vec!["1", "Hà Nội"]);
    }

    #[test]
    fn missing_required_column_fails() {
        let mut table = raw(vec![]);
        table.headers[2] = "Price".to_string();
        let err = build(&table).unwrap_err();
        match err {
            IngestError::MissingColumn { column, .. } => assert_eq!(column, "Giá"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn one_bad_date_fails_the_whole_table() {
        let err = build(&raw(vec![
            vec!["1", "Cà chua", "12000", "01/15/2024 08:00:00 AM", "đ/kg", ""],
            vec!["2", "Cà chua", "12500", "2024-01-16", "đ/kg", ""],
        ]))
        .unwrap_err();
        match err {
            IngestError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "2024-01-16");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_price_fails() {
        let err = build(&raw(vec![vec![
            "1",
            "Cà chua",
            "liên hệ",
            "01/15/2024 08:00:00 AM",
            "đ/kg",
            "",
        ]]))
        .unwrap_err();
        assert!(matches!(err, IngestError::InvalidPrice { row: 1, .. }));
    }

    #[test]
    fn negative_price_fails() {
        let err = build(&raw(vec![
            vec!["1", "Cà chua", "12000", "01/15/2024 08:00:00 AM", "đ/kg", ""],
            vec!["2", "Cà chua", "-500", "01/16/2024 08:00:00 AM", "đ/kg", ""],
        ]))
        .unwrap_err();
        match err {
            IngestError::InvalidPrice { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "-500");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_item_name_fails() {
        let err = build(&raw(vec![vec![
            "1",
            " ",
            "12000",
            "01/15/2024 08:00:00 AM",
            "đ/kg",
            "",
        ]]))
        .unwrap_err();
        assert!(matches!(err, IngestError::EmptyItemName { row: 1, .. }));
    }
}
