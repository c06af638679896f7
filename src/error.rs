use thiserror::Error;

use crate::types::ValueType;

/// Convenience result type for analysis construction and evaluation.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type shared by the value store, pipeline, selector, record sources and initializer.
///
/// Construction-time variants abort startup; evaluation-time variants abort the run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Underlying I/O error (e.g. configuration or input file not found).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV record source error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The analysis description is not valid JSON or does not match the expected shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A name was registered in the value store twice.
    #[error("variable '{name}' is already registered")]
    DuplicateName { name: String },

    /// A name was requested before it was registered.
    #[error("variable '{name}' is not registered")]
    UnknownName { name: String },

    /// A name was requested with a type different from its registered type.
    #[error("variable '{name}' has type {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueType,
        found: ValueType,
    },

    /// A declared quantity, cut or plot is malformed.
    #[error("invalid declaration of '{quantity}': {message}")]
    InvalidDeclaration { quantity: String, message: String },

    /// A cut with the same short name or the same test is already registered.
    #[error("cut '{name}' duplicates an already registered cut")]
    DuplicateCut { name: String },

    /// More cuts were registered than fit into a [`crate::selection::CutMask`].
    #[error("cut '{name}' exceeds the maximum of {max} cuts")]
    TooManyCuts { name: String, max: usize },

    /// A component was initialized a second time.
    #[error("{component} is already initialized")]
    AlreadyInitialized { component: &'static str },

    /// A component was used before its prerequisites were initialized.
    #[error("{component} is not initialized")]
    NotInitialized { component: &'static str },

    /// A handle does not address a slot of the store it was used with.
    #[error("handle {index} does not address a {value_type} slot")]
    UnknownHandle { value_type: ValueType, index: usize },

    /// A computation step failed; the run cannot continue.
    #[error("computation step {index} ({step}) failed: {message}")]
    StepFailed {
        index: usize,
        step: &'static str,
        message: String,
    },

    /// A cut failed to evaluate; the run cannot continue.
    #[error("cut {index} ('{cut}') failed: {message}")]
    CutFailed {
        index: usize,
        cut: String,
        message: String,
    },

    /// The record source does not provide what the store expects.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A raw value could not be parsed into the registered [`ValueType`].
    #[error("failed to parse value at record {record} field '{field}': {message} (raw='{raw}')")]
    ParseError {
        record: usize,
        field: String,
        raw: String,
        message: String,
    },
}

impl AnalysisError {
    pub(crate) fn invalid(quantity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDeclaration {
            quantity: quantity.into(),
            message: message.into(),
        }
    }
}
