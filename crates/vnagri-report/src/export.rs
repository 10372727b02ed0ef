//! Comma-separated export of price rows.
//!
//! The header is the source table's own column headers in source order, and
//! dates are written back in the source layout, so an export carries the same
//! column mapping as the file it came from.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;
use vnagri_model::{CellRef, Column, PriceRecord, PriceTable, SOURCE_DATE_FORMAT};

use crate::error::{ReportError, Result};

fn render_cell(cell: CellRef<'_>) -> String {
    match cell {
        CellRef::Text(text) => text.to_string(),
        CellRef::Price(price) => price.to_string(),
        CellRef::Date(date) => date.format(SOURCE_DATE_FORMAT).to_string(),
    }
}

/// Write `rows` under the header formed by `columns`.
pub fn write_rows_csv<'a, W: Write>(
    columns: &[Column],
    rows: impl IntoIterator<Item = &'a PriceRecord>,
    writer: W,
) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(columns.iter().map(|column| column.name.as_str()))?;
    let mut written = 0usize;
    for row in rows {
        csv.write_record(columns.iter().map(|column| render_cell(row.cell(column.role))))?;
        written += 1;
    }
    csv.flush()?;
    Ok(written)
}

pub fn write_table_csv<W: Write>(table: &PriceTable, writer: W) -> Result<usize> {
    write_rows_csv(&table.columns, &table.records, writer)
}

/// Export `rows` to a new file at `path`; returns the number of data rows.
pub fn export_rows_csv<'a>(
    columns: &[Column],
    rows: impl IntoIterator<Item = &'a PriceRecord>,
    path: &Path,
) -> Result<usize> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_rows_csv(columns, rows, file)?;
    info!(path = %path.display(), rows = written, "exported rows");
    Ok(written)
}
