//! Error types for market-price ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a price table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file does not exist.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parse Errors ===
    /// Bytes are not valid text in the detected encoding.
    #[error("malformed {encoding} text in {path}")]
    Encoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Markup could not be tokenized.
    #[error("malformed markup in {path}: {message}")]
    Markup { path: PathBuf, message: String },

    /// Document holds no table with a header row.
    #[error("no table found in {path}")]
    NoTable { path: PathBuf },

    /// Required column not found in the table header.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Date cell does not match the source timestamp layout.
    #[error("invalid date '{value}' in row {row} of {path}")]
    InvalidDate {
        row: usize,
        value: String,
        path: PathBuf,
    },

    /// Price cell is not a finite, non-negative number.
    #[error("invalid price '{value}' in row {row} of {path}")]
    InvalidPrice {
        row: usize,
        value: String,
        path: PathBuf,
    },

    /// Item name cell is empty.
    #[error("empty item name in row {row} of {path}")]
    EmptyItemName { row: usize, path: PathBuf },
}

impl IngestError {
    /// True for every error caused by the content of the file rather than
    /// its absence or unreadability.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::FileNotFound { .. } | Self::FileRead { .. })
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
