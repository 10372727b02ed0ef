//! Error types for the data model and its configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating analysis options.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::AnalysisOptions`].
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An option value is outside its accepted range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
