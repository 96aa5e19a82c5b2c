//! Error types for building and evaluating specifications.

use thiserror::Error;

/// Errors raised while building or evaluating a specification.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A criterion names a field the record does not expose.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Operator is not valid for the field's kind.
    #[error("operator '{op}' is not valid for {kind} field '{field}'")]
    InvalidOperatorForType {
        field: String,
        op: &'static str,
        kind: &'static str,
    },

    /// Criterion value does not match the field's kind.
    #[error("type mismatch on field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The same field is already part of the sort order.
    #[error("field '{field}' is already sorted on")]
    DuplicateSortField { field: String },

    /// Paging values outside their domain.
    #[error("invalid paging: {0}")]
    InvalidPaging(&'static str),

    /// Both field mappings and a project-many expression were requested.
    #[error("a specification cannot combine field projections with a project-many expression")]
    ProjectionAmbiguity,

    /// Projecting evaluation without any projection defined.
    #[error("no projection defined: add field projections or a project-many expression")]
    NoProjection,
}

/// Result type for specification operations.
pub type Result<T> = std::result::Result<T, SpecError>;
