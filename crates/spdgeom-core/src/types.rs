//! Type definitions and aliases for SPD matrix statistics.
//!
//! This module provides the scalar trait shared by every crate of the
//! workspace together with the matrix and vector aliases used in the
//! public signatures.

use nalgebra::{Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used by the statistics engine (f32 or f64).
///
/// This trait combines all the numeric traits required by the matrix
/// functions and the iterative aggregates.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default convergence threshold of the iterative aggregates.
    const DEFAULT_TOLERANCE: Self;

    /// Default tolerance when comparing two states or matrices.
    const DEFAULT_PRECISION: Self;

    /// Eigenvalues at or below this threshold make a matrix singular for
    /// inverse square roots.
    const MIN_EIGENVALUE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Convert from usize (for trial counts and sizes).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn from_usize(v: usize) -> Self {
        <Self as FromPrimitive>::from_usize(v).expect("Failed to convert from usize")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
    const DEFAULT_PRECISION: Self = 1e-6;
    const MIN_EIGENVALUE: Self = 1e-7;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_TOLERANCE: Self = 1e-4;
    const DEFAULT_PRECISION: Self = 1e-6;
    const MIN_EIGENVALUE: Self = 1e-12;
}

/// Type alias for a dynamically-sized matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a dynamically-sized column vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Type alias for a dynamically-sized row vector.
pub type DRowVector<T> = nalgebra::RowDVector<T>;

/// One class block: the trials recorded for a single class.
pub type ClassBlock<T> = Vec<DMatrix<T>>;

/// A dataset ordered by class: one block per class.
pub type Dataset<T> = Vec<ClassBlock<T>>;

/// Numerical constants.
pub mod constants {
    /// Default iteration cap of the iterative aggregates.
    pub const DEFAULT_MAX_ITERATIONS: usize = 50;

    /// Square root of two, used by the tangent-space coefficients.
    pub const SQRT_2: f64 = std::f64::consts::SQRT_2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scalar_conversions() {
        assert_relative_eq!(<f64 as Scalar>::from_f64(0.25), 0.25);
        assert_relative_eq!(<f32 as Scalar>::from_f64(0.25), 0.25_f32);
        assert_eq!(<f64 as Scalar>::from_usize(7), 7.0);
        assert_relative_eq!(<f32 as Scalar>::to_f64(0.5_f32), 0.5);
    }

    #[test]
    fn test_defaults() {
        assert_relative_eq!(<f64 as Scalar>::DEFAULT_TOLERANCE, 1e-4);
        assert_relative_eq!(<f64 as Scalar>::DEFAULT_PRECISION, 1e-6);
        assert_eq!(constants::DEFAULT_MAX_ITERATIONS, 50);
    }
}
