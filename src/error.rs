//! Error types for the ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Working-day counts that cannot produce a salary
    #[error("invalid working days: {0}")]
    InvalidWorkingDays(String),

    #[error("marks obtained ({obtained}) exceed maximum ({max})")]
    MarksExceedMaximum { obtained: f64, max: f64 },

    #[error("invalid marks: {0}")]
    InvalidMarks(String),

    #[error("maximum marks must be greater than zero (got {0})")]
    InvalidMaxMarks(f64),

    /// Negative or non-finite money amount
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A record that fails a domain rule before it is written
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// A stored document that does not match its schema
    #[error("malformed {collection} record {id}: {reason}")]
    MalformedRecord {
        collection: String,
        id: String,
        reason: String,
    },

    #[error("{collection} record not found: {id}")]
    NotFound { collection: String, id: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        LedgerError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Stable error code used on the sidecar protocol.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidWorkingDays(_) => "invalid_working_days",
            LedgerError::MarksExceedMaximum { .. } => "marks_exceed_maximum",
            LedgerError::InvalidMarks(_) => "invalid_marks",
            LedgerError::InvalidMaxMarks(_) => "invalid_max_marks",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::InvalidRecord(_) => "invalid_record",
            LedgerError::MalformedRecord { .. } => "malformed_record",
            LedgerError::NotFound { .. } => "not_found",
            LedgerError::Storage(_) => "db_query_failed",
            LedgerError::Serialization(_) => "malformed_record",
            LedgerError::Config(_) => "bad_config",
        }
    }
}
