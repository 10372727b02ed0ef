//! Market-price table ingestion.
//!
//! The source database exports its price listings as an HTML document holding
//! a single table, encoded as UTF-16. This crate turns such a file into a
//! [`PriceTable`](vnagri_model::PriceTable):
//!
//! - **Decoding**: BOM-sniffed UTF-16 (little-endian when no BOM is present)
//! - **Extraction**: the first `<table>` element, header row plus data rows
//! - **Coercion**: prices to `f64`, dates from `month/day/year h:m:s AM|PM`
//!
//! Loading is all-or-nothing: a single malformed date or price fails the load.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use vnagri_ingest::load_price_table;
//! use vnagri_model::AnalysisOptions;
//!
//! let table = load_price_table(Path::new("data/Rau, qua"), &AnalysisOptions::default())?;
//! println!("{} rows, {} items", table.len(), table.items().len());
//! ```

mod decode;
mod error;
mod html;
mod loader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Decoding ===
pub use decode::decode_utf16;

// === HTML Tables ===
pub use html::{RawTable, extract_first_table};

// === Loading ===
pub use loader::{build_price_table, load_price_table, parse_price, parse_source_date};
