//! Error types for feed decoding
//!
//! Decode error taxonomy using thiserror. None of these are fatal: a
//! mapping error skips one pair, a line error drops one event line.

use thiserror::Error;

/// Mapping-table errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The whole payload was empty or whitespace. Recoverable: the cycle
    /// continues with an empty table.
    #[error("mapping payload is empty")]
    EmptyPayload,

    #[error("invalid mapping pair: {pair}")]
    MalformedPair { pair: String },
}

impl MappingError {
    /// Whether this is a warning rather than a malformed-input error.
    pub fn is_warning(&self) -> bool {
        matches!(self, MappingError::EmptyPayload)
    }
}

/// Event-line errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("invalid event line format: {line}")]
    TooFewFields { line: String, found: usize },

    #[error("missing mapping for {field}: {id}")]
    MissingMapping { field: &'static str, id: String },

    #[error("invalid scores format: {entry}")]
    MalformedScores { entry: String },

    #[error("invalid start time: {value}")]
    InvalidStartTime { value: String },

    /// The status id resolved to the tombstone marker, which only
    /// reconciliation may assign.
    #[error("status {id} resolves to reserved status REMOVED")]
    ReservedStatus { id: String },
}

impl LineError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LineError::TooFewFields { .. } => "too_few_fields",
            LineError::MissingMapping { .. } => "missing_mapping",
            LineError::MalformedScores { .. } => "malformed_scores",
            LineError::InvalidStartTime { .. } => "invalid_start_time",
            LineError::ReservedStatus { .. } => "reserved_status",
        }
    }
}
