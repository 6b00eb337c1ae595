//! Pairwise distances between SPD matrices.
//!
//! # Formulas
//!
//! ```text
//! Riemann       sqrt(Σ ln²(λᵢ))              λᵢ generalized eigenvalues of (A, B)
//! Euclidean     ‖B − A‖_F
//! LogEuclidean  ‖log A − log B‖_F
//! LogDet        sqrt(ln det((A+B)/2) − ½ ln(det A · det B))
//! Kullback      kl(A, B) + kl(B, A)
//! Wasserstein   sqrt(tr(A + B − 2 (B^½ A B^½)^½))
//! Identity      1
//! ```

use crate::geodesic::ensure_riemann_operands;
use num_traits::Float;
use spdgeom_core::{
    error::{Result, SpdError},
    matrix::{generalized_eigenvalues, matrix_inverse, matrix_log, matrix_sqrt},
    metric::Metric,
    types::{DMatrix, Scalar},
    validation::{ensure_square, have_same_size, shape_of},
};

/// Distance between `a` and `b` under `metric`.
///
/// Operands of different shapes, or empty operands, give a distance of 0
/// and a warning: callers that need a hard failure must check shapes
/// themselves. Metrics other than Euclidean and Identity require square
/// SPD operands. Harmonic and ALE define no distance.
pub fn distance<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>, metric: Metric) -> Result<T> {
    if !have_same_size(a, b) || a.is_empty() {
        log::warn!(
            "distance between {} and {} matrices is reported as 0",
            shape_of(a),
            shape_of(b)
        );
        return Ok(T::zero());
    }
    if !metric.accepts_rectangular() {
        ensure_square(a)?;
    }

    match metric {
        Metric::Riemann => distance_riemann(a, b),
        Metric::Euclidean => Ok((b - a).norm()),
        Metric::LogEuclidean => Ok((matrix_log(a)? - matrix_log(b)?).norm()),
        Metric::LogDet => distance_log_det(a, b),
        Metric::Kullback => Ok(kullback_divergence(a, b)? + kullback_divergence(b, a)?),
        Metric::Wasserstein => distance_wasserstein(a, b),
        Metric::Identity => Ok(T::one()),
        Metric::Harmonic | Metric::Ale => Err(SpdError::unsupported(metric, "Distance")),
    }
}

/// Affine-invariant distance `sqrt(Σ ln²(λᵢ))`.
pub fn distance_riemann<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<T> {
    ensure_riemann_operands(a, b)?;
    let eigenvalues = generalized_eigenvalues(a, b)?;
    let mut sum = T::zero();
    for &ev in eigenvalues.iter() {
        if ev <= T::zero() {
            return Err(SpdError::numerical_error(
                "non-positive generalized eigenvalue",
            ));
        }
        let l = <T as Float>::ln(ev);
        sum += l * l;
    }
    Ok(<T as Float>::sqrt(sum))
}

/// Asymmetric Kullback-Leibler divergence between two Gaussians with
/// covariances `a` and `b`.
///
/// `0.5 (tr(B⁻¹A) − n + ln(det B / det A))`
pub fn kullback_divergence<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<T> {
    ensure_riemann_operands(a, b)?;
    let n = <T as Scalar>::from_usize(a.nrows());
    let trace = (matrix_inverse(b)? * a).trace();
    let half = <T as Scalar>::from_f64(0.5);
    Ok(half * (trace - n + log_det(b)? - log_det(a)?))
}

fn distance_log_det<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<T> {
    let half = <T as Scalar>::from_f64(0.5);
    let mid = (a + b) * half;
    let value = log_det(&mid)? - half * (log_det(a)? + log_det(b)?);
    Ok(<T as Float>::sqrt(<T as Float>::max(value, T::zero())))
}

fn distance_wasserstein<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<T> {
    let sb = matrix_sqrt(b)?;
    let cross = matrix_sqrt(&(&sb * a * &sb))?;
    let two = <T as Scalar>::from_f64(2.0);
    let value = a.trace() + b.trace() - two * cross.trace();
    Ok(<T as Float>::sqrt(<T as Float>::max(value, T::zero())))
}

/// Natural logarithm of the determinant of an SPD matrix, through its
/// Cholesky factor to stay finite for large or small determinants.
pub fn log_det<T: Scalar>(m: &DMatrix<T>) -> Result<T> {
    let chol = nalgebra::Cholesky::new(m.clone())
        .ok_or_else(|| SpdError::numerical_error("log-determinant of a non-SPD matrix"))?;
    let two = <T as Scalar>::from_f64(2.0);
    Ok(chol
        .l_dirty()
        .diagonal()
        .iter()
        .fold(T::zero(), |acc, &d| acc + two * <T as Float>::ln(d)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    #[test]
    fn test_scalar_matrices() {
        let a = diag(&[1.0, 1.0]);
        let b = diag(&[4.0, 4.0]);
        let ln4 = 4.0_f64.ln();

        assert_relative_eq!(
            distance(&a, &b, Metric::Riemann).unwrap(),
            (2.0 * ln4 * ln4).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(distance(&a, &b, Metric::Euclidean).unwrap(), 18.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            distance(&a, &b, Metric::LogEuclidean).unwrap(),
            (2.0 * ln4 * ln4).sqrt(),
            epsilon = 1e-12
        );
        // tr(1 + 4 − 2·2) per diagonal entry
        assert_relative_eq!(distance(&a, &b, Metric::Wasserstein).unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_log_det_distance() {
        let a = diag(&[1.0, 1.0]);
        let b = diag(&[4.0, 4.0]);
        let expected = (2.0 * 2.5_f64.ln() - 0.5 * 16.0_f64.ln()).sqrt();
        assert_relative_eq!(distance(&a, &b, Metric::LogDet).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_kullback() {
        let a = diag(&[1.0, 1.0]);
        let b = diag(&[2.0, 2.0]);
        // kl(a, b) = 0.5 (1 − 2 + ln 4)
        let kl_ab = 0.5 * (1.0 - 2.0 + 4.0_f64.ln());
        assert_relative_eq!(kullback_divergence(&a, &b).unwrap(), kl_ab, epsilon = 1e-12);
        // kl(b, a) = 0.5 (4 − 2 − ln 4)
        let kl_ba = 0.5 * (4.0 - 2.0 - 4.0_f64.ln());
        assert_relative_eq!(distance(&a, &b, Metric::Kullback).unwrap(), kl_ab + kl_ba, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_metric_is_constant() {
        let a = diag(&[1.0, 2.0]);
        assert_eq!(distance(&a, &a, Metric::Identity).unwrap(), 1.0);
    }

    #[test]
    fn test_mismatched_shapes_give_zero() {
        let a = diag(&[1.0, 2.0]);
        let b = diag(&[1.0, 2.0, 3.0]);
        for metric in Metric::ALL {
            assert_eq!(distance(&a, &b, metric).unwrap(), 0.0);
        }
        let empty = DMatrix::<f64>::zeros(0, 0);
        assert_eq!(distance(&empty, &empty, Metric::Riemann).unwrap(), 0.0);
    }

    #[test]
    fn test_unsupported_metrics() {
        let a = diag(&[1.0, 2.0]);
        assert!(matches!(
            distance(&a, &a, Metric::Harmonic),
            Err(SpdError::Unsupported { .. })
        ));
        assert!(distance(&a, &a, Metric::Ale).is_err());
    }

    #[test]
    fn test_rectangular_only_for_euclidean() {
        let a = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let b = DMatrix::from_row_slice(1, 2, &[1.0, 4.0]);
        assert_relative_eq!(distance(&a, &b, Metric::Euclidean).unwrap(), 2.0);
        assert!(matches!(
            distance(&a, &b, Metric::Riemann),
            Err(SpdError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_log_det() {
        assert_relative_eq!(log_det(&diag(&[2.0, 3.0])).unwrap(), 6.0_f64.ln(), epsilon = 1e-12);
        assert!(log_det(&diag(&[1.0, -1.0])).is_err());
    }
}
