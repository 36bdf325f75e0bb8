//! Error types for the simsql crate.
//!
//! Filtering is fail-soft: [`FieldAccessError`] and [`EvalError`] raised
//! while evaluating a condition only exclude the record. Ordering and grouping
//! are fail-hard and surface as [`QueryError`].

use thiserror::Error;

/// Errors that abort building or executing a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A sort column could not be resolved or its values could not be ordered.
    #[error("invalid sort field '{column}' on {record_type}: {reason}")]
    InvalidSortField {
        record_type: &'static str,
        column: String,
        reason: FieldError,
    },

    /// A group-by column could not be resolved or extracted.
    #[error("invalid group-by field '{column}' on {record_type}: {reason}")]
    InvalidGroupByField {
        record_type: &'static str,
        column: String,
        reason: FieldError,
    },
}

impl QueryError {
    /// The column that caused the failure, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            QueryError::InvalidRegex(_) => None,
            QueryError::InvalidSortField { column, .. }
            | QueryError::InvalidGroupByField { column, .. } => Some(column),
        }
    }
}

/// Why a column failed during ordering or grouping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The record type declares no column with this name.
    #[error("no such column")]
    UnknownColumn,

    /// The accessor could not read the column from a record.
    #[error(transparent)]
    Access(#[from] FieldAccessError),

    /// Two extracted values have no defined order.
    #[error("cannot order {left} against {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },
}

/// A field accessor was applied to a record that does not expose its column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record of type {actual} does not expose column '{column}' of {record_type}")]
pub struct FieldAccessError {
    /// Type the accessor was resolved for.
    pub record_type: &'static str,
    /// Column the accessor reads.
    pub column: String,
    /// Runtime type of the record it was applied to.
    pub actual: &'static str,
}

/// Failure raised by a condition evaluator.
///
/// Returned from closures passed to
/// [`ColumnCondition::try_of`](crate::ColumnCondition::try_of); the condition
/// then evaluates to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Type mismatch between expected and extracted value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Any other evaluator failure.
    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    /// Builds a type mismatch for an extracted value.
    pub fn mismatch(expected: &'static str, actual: &crate::Value<'_>) -> Self {
        EvalError::TypeMismatch {
            expected,
            actual: actual.kind(),
        }
    }
}

/// Result type for simsql operations.
pub type Result<T> = std::result::Result<T, QueryError>;
