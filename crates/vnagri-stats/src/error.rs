//! Error types for the statistics engine.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    /// Statistics were requested over zero values.
    #[error("no values to summarize: {context}")]
    EmptyInput { context: String },

    /// Caller supplied an argument the engine cannot act on.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl StatsError {
    pub(crate) fn empty(context: impl Into<String>) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
