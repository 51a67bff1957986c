//! Errors reported by the text pipeline front end.
//!
//! The generic adapters never fail at runtime; capability mismatches are
//! compile errors. Everything here comes from parsing pipeline text, reading
//! input data, or evaluating DSL arithmetic on the wrong kind of value.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("Pipeline is empty")]
    Empty,

    #[error("Pipeline must have at least 2 stages")]
    TooShort,

    #[error("{stage} cannot be the first stage (try SEQUENCE, SET, or MAP)")]
    NotASource { stage: &'static str },

    #[error("{stage} can only be the first stage")]
    MisplacedSource { stage: &'static str },

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Input line {line}: {message}")]
    Input { line: usize, message: String },

    #[error("{stage}: {message}")]
    Type {
        stage: &'static str,
        message: String,
    },
}
