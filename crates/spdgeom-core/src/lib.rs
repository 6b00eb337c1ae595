//! Core types and numerical building blocks for SPD matrix statistics.
//!
//! This crate provides the pieces shared by the rest of the workspace:
//! the scalar trait, the error taxonomy, the metric registry, the stopping
//! rule of the iterative aggregates and the spectral matrix functions
//! (square root, logarithm, exponential, power) that every metric is built on.
//!
//! # Modules
//!
//! - [`config`]: Stopping rule of the iterative aggregates
//! - [`error`]: Error types
//! - [`matrix`]: Spectral functions of symmetric matrices
//! - [`metric`]: Metric registry with string round trip
//! - [`types`]: Scalar trait, matrix aliases and constants
//! - [`validation`]: Shape predicates

pub mod config;
pub mod error;
pub mod matrix;
pub mod metric;
pub mod types;
pub mod validation;

pub use config::IterationConfig;
pub use error::{Result, SpdError};
pub use metric::Metric;
pub use types::Scalar;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use spdgeom_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::IterationConfig;
    pub use crate::error::{Result, SpdError};
    pub use crate::matrix::{
        are_equal, matrix_exp, matrix_inverse, matrix_log, matrix_pow, matrix_sqrt,
        matrix_sqrt_inv,
    };
    pub use crate::metric::Metric;
    pub use crate::types::{ClassBlock, DMatrix, DRowVector, DVector, Dataset, Scalar};
}
