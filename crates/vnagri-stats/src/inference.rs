//! Column type inference.
//!
//! The typed roles decide directly: the price column is `float` and the date
//! column is `datetime`. Text columns are classified from their non-empty
//! cells, in this order:
//! 1. No non-empty cell -> `unknown`
//! 2. Every cell is a date -> `datetime`
//! 3. Every cell is numeric and at least one has a fractional part -> `float`
//! 4. Every cell is a whole number -> `unknown` (counters and codes are
//!    neither categories nor measurements)
//! 5. Otherwise -> `string`

use chrono::{NaiveDate, NaiveDateTime};
use vnagri_model::{CellRef, Column, ColumnRole, ColumnType, PriceTable, SOURCE_DATE_FORMAT};

/// Day-only layouts accepted for descriptive date columns.
const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// A column's cells, converted to the type inferred for it.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedColumn<'a> {
    Text(Vec<&'a str>),
    Float(Vec<f64>),
    Datetime(Vec<NaiveDateTime>),
    Unknown,
}

impl TypedColumn<'_> {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::String,
            Self::Float(_) => ColumnType::Float,
            Self::Datetime(_) => ColumnType::Datetime,
            Self::Unknown => ColumnType::Unknown,
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDateTime> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, SOURCE_DATE_FORMAT) {
        return Some(datetime);
    }
    DATE_ONLY_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

fn is_whole(value: &str, number: f64) -> bool {
    !value.contains('.') && number.fract() == 0.0
}

/// Classify text cells; empty cells are ignored.
pub fn infer_text_column<'a>(cells: impl IntoIterator<Item = &'a str>) -> TypedColumn<'a> {
    let cells: Vec<&str> = cells
        .into_iter()
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    if cells.is_empty() {
        return TypedColumn::Unknown;
    }

    let dates: Option<Vec<NaiveDateTime>> = cells.iter().map(|cell| parse_date(cell)).collect();
    if let Some(dates) = dates {
        return TypedColumn::Datetime(dates);
    }

    let numbers: Option<Vec<f64>> = cells.iter().map(|cell| parse_number(cell)).collect();
    if let Some(numbers) = numbers {
        let all_whole = cells
            .iter()
            .zip(&numbers)
            .all(|(cell, number)| is_whole(cell, *number));
        return if all_whole {
            TypedColumn::Unknown
        } else {
            TypedColumn::Float(numbers)
        };
    }

    TypedColumn::Text(cells)
}

/// Read one column of `table` and infer its type.
pub fn infer_column<'a>(table: &'a PriceTable, column: &Column) -> TypedColumn<'a> {
    if table.is_empty() {
        return TypedColumn::Unknown;
    }
    match column.role {
        ColumnRole::Price => TypedColumn::Float(table.prices()),
        ColumnRole::Date => {
            TypedColumn::Datetime(table.records.iter().map(|record| record.date).collect())
        }
        role => infer_text_column(table.records.iter().map(|record| match record.cell(role) {
            CellRef::Text(text) => text,
            // Typed roles are handled above.
            CellRef::Price(_) | CellRef::Date(_) => "",
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnagri_model::PriceRecord;

    #[test]
    fn identical_dates_are_datetime() {
        let column = infer_text_column(["01/15/2024 08:00:00 AM"; 4]);
        assert_eq!(column.column_type(), ColumnType::Datetime);
        let column = infer_text_column(["2024-01-15", "2024-01-15"]);
        assert_eq!(column.column_type(), ColumnType::Datetime);
    }

    #[test]
    fn names_are_strings() {
        let column = infer_text_column(["Hà Nội", "Đà Lạt", "Hà Nội"]);
        assert_eq!(
            column,
            TypedColumn::Text(vec!["Hà Nội", "Đà Lạt", "Hà Nội"])
        );
    }

    #[test]
    fn decimals_are_float_and_counters_unknown() {
        assert_eq!(
            infer_text_column(["1.5", "2", "3,000.25"]),
            TypedColumn::Float(vec![1.5, 2.0, 3000.25])
        );
        assert_eq!(
            infer_text_column(["1", "2", "3"]).column_type(),
            ColumnType::Unknown
        );
    }

    #[test]
    fn mixed_cells_fall_back_to_string() {
        assert_eq!(
            infer_text_column(["1.5", "n/a"]).column_type(),
            ColumnType::String
        );
        assert_eq!(
            infer_text_column(["2024-01-15", "Hà Nội"]).column_type(),
            ColumnType::String
        );
    }

    #[test]
    fn empty_cells_are_ignored() {
        assert_eq!(infer_text_column(["", " "]), TypedColumn::Unknown);
        assert_eq!(
            infer_text_column(["", "Bán lẻ"]),
            TypedColumn::Text(vec!["Bán lẻ"])
        );
    }

    #[test]
    fn typed_roles_skip_inference() {
        let at = NaiveDate::from_ymd_opt(2023, 5, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut table = PriceTable::new(
            "test",
            vec![
                Column::new("Tên_mặt_hàng", ColumnRole::ItemName),
                Column::new("Giá", ColumnRole::Price),
                Column::new("Ngày", ColumnRole::Date),
            ],
        );
        assert_eq!(
            infer_column(&table, &table.columns[1]),
            TypedColumn::Unknown
        );

        table.push(PriceRecord::new("Tiêu", 150000.0, at, "đ/kg"));
        assert_eq!(
            infer_column(&table, &table.columns[1]),
            TypedColumn::Float(vec![150000.0])
        );
        assert_eq!(
            infer_column(&table, &table.columns[2]),
            TypedColumn::Datetime(vec![at])
        );
        assert_eq!(
            infer_column(&table, &table.columns[0]),
            TypedColumn::Text(vec!["Tiêu"])
        );
    }
}
