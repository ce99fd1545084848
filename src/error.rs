//! Error types for filter parsing and query execution

use thiserror::Error;

/// Errors that can occur while parsing request parameters or running a query
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Filter key is empty")]
    EmptyKey,

    #[error("Filter key [{key}] is required")]
    RequiredValueMissing { key: String },

    #[error("Filter key [{key}] expects {kind}, got '{raw}'")]
    ValueConversion {
        kind: &'static str,
        key: String,
        raw: String,
    },

    #[error("Predicate has {found} placeholder(s) but {expected} value(s)")]
    Placeholder { expected: usize, found: usize },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("{0}")]
    Custom(String),
}

impl QueryError {
    pub fn required(key: impl Into<String>) -> Self {
        Self::RequiredValueMissing { key: key.into() }
    }

    pub fn conversion(kind: &'static str, key: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::ValueConversion {
            kind,
            key: key.into(),
            raw: raw.into(),
        }
    }

    /// Error for use by custom parse hooks
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Whether the store reported that no rows matched
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Sql(sqlx::Error::RowNotFound))
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
