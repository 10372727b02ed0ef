//! Dated price series of a single item.

use chrono::NaiveDateTime;
use vnagri_model::{DisplayWindow, PriceTable};

/// One observation of an item's price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDateTime,
    pub price: f64,
}

/// Prices of `item` whose date falls inside `window`, sorted by date.
///
/// Rows sharing a timestamp keep their table order.
pub fn price_series(table: &PriceTable, item: &str, window: &DisplayWindow) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = table
        .item_records(item)
        .filter(|record| window.contains(record.date.date()))
        .map(|record| PricePoint {
            date: record.date,
            price: record.price,
        })
        .collect();
    points.sort_by_key(|point| point.date);
    points
}
