//! In-memory price table produced by the loader.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the market-price database export.
pub const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// What a source column holds.
///
/// The four required columns are typed on load; every other column is kept
/// as raw text and addressed by its position in [`PriceRecord::attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "index", rename_all = "snake_case")]
pub enum ColumnRole {
    ItemName,
    Price,
    Date,
    Unit,
    Descriptive(usize),
}

/// A source column: its header text and how it maps onto a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
}

impl Column {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// One row of the price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub item_name: String,
    pub price: f64,
    pub date: NaiveDateTime,
    pub unit: String,
    /// Descriptive cells, indexed by [`ColumnRole::Descriptive`].
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl PriceRecord {
    pub fn new(
        item_name: impl Into<String>,
        price: f64,
        date: NaiveDateTime,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            price,
            date,
            unit: unit.into(),
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Borrow the cell this record holds for `role`.
    pub fn cell(&self, role: ColumnRole) -> CellRef<'_> {
        match role {
            ColumnRole::ItemName => CellRef::Text(&self.item_name),
            ColumnRole::Price => CellRef::Price(self.price),
            ColumnRole::Date => CellRef::Date(self.date),
            ColumnRole::Unit => CellRef::Text(&self.unit),
            ColumnRole::Descriptive(index) => self
                .attributes
                .get(index)
                .map_or(CellRef::Text(""), |value| CellRef::Text(value.as_str())),
        }
    }
}

/// Borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Text(&'a str),
    Price(f64),
    Date(NaiveDateTime),
}

/// Ordered collection of price records plus the column layout they came from.
///
/// Rows are kept in source order; nothing here sorts by item or date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Identifier of the source (usually the input path).
    pub source: String,
    pub columns: Vec<Column>,
    pub records: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn new(source: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            source: source.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: PriceRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Distinct item names in order of first appearance.
    ///
    /// The position of a name in this list is its item id in reports.
    pub fn items(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for record in &self.records {
            if seen.insert(record.item_name.as_str()) {
                items.push(record.item_name.as_str());
            }
        }
        items
    }

    /// Records belonging to `item`, in table order.
    pub fn item_records<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a PriceRecord> {
        self.records
            .iter()
            .filter(move |record| record.item_name == item)
    }

    /// Prices of `item`, in table order.
    pub fn item_prices(&self, item: &str) -> Vec<f64> {
        self.item_records(item).map(|record| record.price).collect()
    }

    /// Every price in the table, in table order.
    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.price).collect()
    }

    /// Copy of this table's layout with a different set of rows.
    #[must_use]
    pub fn with_records(&self, records: Vec<PriceRecord>) -> Self {
        Self {
            source: self.source.clone(),
            columns: self.columns.clone(),
            records,
        }
    }
}
