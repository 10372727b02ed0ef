//! Terminal tables for command results.

use std::collections::BTreeMap;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use vnagri_model::{ItemMetadata, format_report_date};
use vnagri_stats::{ItemOutliers, OutlierDetection, PricePoint};

pub fn outlier_table(detection: &OutlierDetection) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Item"),
        header_cell("Q1"),
        header_cell("Q3"),
        header_cell("IQR"),
        header_cell("Lower"),
        header_cell("Upper"),
        header_cell("Outliers"),
        header_cell("% of table"),
        header_cell("% of item"),
    ]);
    apply_table_style(&mut table);
    for index in 0..table.column_count() {
        if index != 1 {
            align_column(&mut table, index, CellAlignment::Right);
        }
    }
    for entry in &detection.items {
        table.add_row(outlier_row(entry));
    }
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(format!("{} items", detection.items.len())),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(detection.outlier_count()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

fn outlier_row(entry: &ItemOutliers) -> Vec<Cell> {
    let info = &entry.info;
    vec![
        Cell::new(entry.id),
        item_cell(&entry.name, info.has_outliers),
        Cell::new(price(info.q1)),
        Cell::new(price(info.q3)),
        Cell::new(price(info.iqr)),
        Cell::new(price(info.min_threshold)),
        Cell::new(price(info.max_threshold)),
        count_cell(info.outlier_count),
        percent_cell(info.outlier_fraction),
        percent_cell(info.item_outlier_fraction),
    ]
}

pub fn item_table(items: &BTreeMap<usize, ItemMetadata>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Item"),
        header_cell("Unit"),
        header_cell("Count"),
        header_cell("Min"),
        header_cell("Max"),
        header_cell("Mean"),
        header_cell("Median"),
        header_cell("First"),
        header_cell("Last"),
        header_cell("Outliers"),
    ]);
    apply_table_style(&mut table);
    for index in [0, 3, 4, 5, 6, 7, 10] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (id, item) in items {
        table.add_row(vec![
            Cell::new(id),
            item_cell(&item.name, item.outliers.has_outliers),
            Cell::new(&item.unit),
            Cell::new(item.stats.count),
            Cell::new(price(item.stats.min)),
            Cell::new(price(item.stats.max)),
            Cell::new(price(item.stats.mean)),
            Cell::new(price(item.stats.median)),
            Cell::new(format_report_date(item.first_update)),
            Cell::new(format_report_date(item.last_update)),
            count_cell(item.outliers.outlier_count),
        ]);
    }
    table
}

pub fn series_table(points: &[PricePoint]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Date"), header_cell("Price")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for point in points {
        table.add_row(vec![
            Cell::new(format_report_date(point.date)),
            Cell::new(price(point.price)),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Prices are whole currency units in practice; keep two decimals otherwise.
fn price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn total_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn item_cell(name: &str, flagged: bool) -> Cell {
    if flagged {
        Cell::new(name).fg(Color::Yellow)
    } else {
        Cell::new(name)
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn percent_cell(fraction: f64) -> Cell {
    if fraction > 0.0 {
        Cell::new(format!("{:.2}%", fraction * 100.0))
    } else {
        dim_cell("0%")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_drop_zero_decimals() {
        assert_eq!(price(12000.0), "12000");
        assert_eq!(price(1600.0), "1600");
        assert_eq!(price(2237.5), "2237.50");
        assert_eq!(price(-350.0), "-350");
    }
}
