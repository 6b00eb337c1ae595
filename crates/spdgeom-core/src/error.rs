//! Error types for SPD matrix statistics.
//!
//! Every fallible operation of the workspace reports its failure through
//! [`SpdError`]. Failures are never retried; callers decide what to do.

use thiserror::Error;

/// Errors that can occur while computing statistics on SPD matrices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpdError {
    /// An operation received an empty collection or an empty matrix.
    #[error("Empty input: {context}")]
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// A square matrix was required.
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows of the offending matrix
        rows: usize,
        /// Number of columns of the offending matrix
        cols: usize,
    },

    /// Dimension mismatch between two operands.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// A scalar parameter lies outside its admissible range.
    #[error("Parameter {parameter} = {value} is outside {range}")]
    OutOfRange {
        /// Name of the parameter
        parameter: String,
        /// Offending value
        value: String,
        /// Admissible range
        range: String,
    },

    /// Numerical failure such as a non-positive eigenvalue or a singular matrix.
    ///
    /// Raised when an SPD-only matrix function receives a matrix that
    /// violates the SPD invariant.
    #[error("Numerical error: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },

    /// The metric has no definition for the requested operation.
    #[error("{operation} is not supported for the {metric} metric")]
    Unsupported {
        /// Display name of the metric
        metric: String,
        /// Name of the operation
        operation: String,
    },

    /// Invalid configuration value.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of the invalid parameter
        reason: String,
    },

    /// A name could not be parsed into one of the known tags.
    #[error("Unknown {kind} name: '{name}'")]
    UnknownName {
        /// Kind of tag being parsed (metric, adaptation, ...)
        kind: String,
        /// The string that failed to parse
        name: String,
    },
}

impl SpdError {
    /// Create an EmptyInput error.
    pub fn empty_input<S: Into<String>>(context: S) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }

    /// Create a NotSquare error for a `rows x cols` matrix.
    pub fn not_square(rows: usize, cols: usize) -> Self {
        Self::NotSquare { rows, cols }
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an OutOfRange error.
    pub fn out_of_range<V, R>(parameter: &str, value: V, range: R) -> Self
    where
        V: std::fmt::Display,
        R: std::fmt::Display,
    {
        Self::OutOfRange {
            parameter: parameter.to_string(),
            value: value.to_string(),
            range: range.to_string(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Create an Unsupported error.
    pub fn unsupported<M, O>(metric: M, operation: O) -> Self
    where
        M: std::fmt::Display,
        O: Into<String>,
    {
        Self::Unsupported {
            metric: metric.to_string(),
            operation: operation.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter<S: Into<String>>(reason: S) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }

    /// Create an UnknownName error.
    pub fn unknown_name<K: Into<String>, N: Into<String>>(kind: K, name: N) -> Self {
        Self::UnknownName {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Returns true for errors caused by the shape of the inputs.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput { .. } | Self::NotSquare { .. } | Self::DimensionMismatch { .. }
        )
    }
}

/// Result type alias for SPD operations.
pub type Result<T> = std::result::Result<T, SpdError>;
