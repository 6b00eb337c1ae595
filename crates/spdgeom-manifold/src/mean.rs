//! Mean of a collection of SPD matrices under a metric.
//!
//! # Algorithms
//!
//! - **Euclidean**: arithmetic average (rectangular input allowed)
//! - **LogEuclidean**: `exp(mean(log Cᵢ))`
//! - **Harmonic**: `(mean(Cᵢ⁻¹))⁻¹`
//! - **Identity**: identity of matching size (rectangular input allowed)
//! - **Kullback**: Riemannian midpoint of the Euclidean and Harmonic means
//! - **LogDet**: fixed point of `M ← (mean((½(Cᵢ + M))⁻¹))⁻¹`
//! - **Wasserstein**: fixed point on the square root `S ← (mean((S Cᵢ S)^½))^½`
//! - **Riemann**: natural gradient descent with the ν/τ step schedule
//! - **ALE**: diagonal updates in a non-orthogonal basis, seeded with the
//!   identity in place of an approximate joint diagonalizer
//!
//! The iterative algorithms stop on the [`IterationConfig`] bounds. Reaching
//! the iteration cap is not an error: the current estimate is returned.

use crate::distance::distance_riemann;
use crate::geodesic::geodesic_riemann;
use num_traits::Float;
use spdgeom_core::{
    config::IterationConfig,
    error::Result,
    matrix::{matrix_exp, matrix_inverse, matrix_log, matrix_sqrt, matrix_sqrt_inv},
    metric::Metric,
    types::{DMatrix, Scalar},
    validation::ensure_collection,
};

/// Mean of `matrices` under `metric` with the default stopping rule
/// (ε = 1e-4, 50 iterations).
pub fn mean<T: Scalar>(matrices: &[DMatrix<T>], metric: Metric) -> Result<DMatrix<T>> {
    mean_with(matrices, metric, &IterationConfig::default())
}

/// Mean of `matrices` under `metric` with an explicit stopping rule.
///
/// Fails on an empty collection, on matrices of different sizes, and on
/// non-square matrices unless the metric is Euclidean or Identity. A single
/// matrix is returned unchanged for every metric.
pub fn mean_with<T: Scalar>(
    matrices: &[DMatrix<T>],
    metric: Metric,
    config: &IterationConfig<T>,
) -> Result<DMatrix<T>> {
    config.validate()?;
    ensure_collection(matrices, !metric.accepts_rectangular())?;
    if let [single] = matrices {
        return Ok(single.clone());
    }

    match metric {
        Metric::Euclidean => Ok(mean_euclidean(matrices)),
        Metric::LogEuclidean => mean_log_euclidean(matrices),
        Metric::Harmonic => mean_harmonic(matrices),
        Metric::Identity => Ok(DMatrix::identity(matrices[0].nrows(), matrices[0].ncols())),
        Metric::Kullback => {
            geodesic_riemann(&mean_euclidean(matrices), &mean_harmonic(matrices)?, half::<T>())
        }
        Metric::LogDet => mean_log_det(matrices, config),
        Metric::Wasserstein => mean_wasserstein(matrices, config),
        Metric::Riemann => mean_riemann(matrices, config),
        Metric::Ale => mean_ale(matrices, config),
    }
}

fn half<T: Scalar>() -> T {
    <T as Scalar>::from_f64(0.5)
}

/// Average of `f(Cᵢ)` over the collection.
fn average_of<T, F>(matrices: &[DMatrix<T>], f: F) -> Result<DMatrix<T>>
where
    T: Scalar,
    F: Fn(&DMatrix<T>) -> Result<DMatrix<T>>,
{
    let (rows, cols) = matrices[0].shape();
    let mut sum = DMatrix::zeros(rows, cols);
    for m in matrices {
        sum += f(m)?;
    }
    Ok(sum / <T as Scalar>::from_usize(matrices.len()))
}

fn mean_euclidean<T: Scalar>(matrices: &[DMatrix<T>]) -> DMatrix<T> {
    let (rows, cols) = matrices[0].shape();
    let sum = matrices
        .iter()
        .fold(DMatrix::zeros(rows, cols), |acc, m| acc + m);
    sum / <T as Scalar>::from_usize(matrices.len())
}

fn mean_log_euclidean<T: Scalar>(matrices: &[DMatrix<T>]) -> Result<DMatrix<T>> {
    matrix_exp(&average_of(matrices, matrix_log)?)
}

fn mean_harmonic<T: Scalar>(matrices: &[DMatrix<T>]) -> Result<DMatrix<T>> {
    matrix_inverse(&average_of(matrices, matrix_inverse)?)
}

fn mean_log_det<T: Scalar>(matrices: &[DMatrix<T>], config: &IterationConfig<T>) -> Result<DMatrix<T>> {
    let mut m = mean_euclidean(matrices);
    let mut crit = T::infinity();
    let mut iterations = 0;
    while iterations < config.max_iterations && crit > config.epsilon {
        iterations += 1;
        let next = matrix_inverse(&average_of(matrices, |c| {
            matrix_inverse(&((c + &m) * half::<T>()))
        })?)?;
        crit = (&next - &m).norm();
        m = next;
    }
    report("LogDet", iterations, crit, config);
    Ok(m)
}

fn mean_wasserstein<T: Scalar>(
    matrices: &[DMatrix<T>],
    config: &IterationConfig<T>,
) -> Result<DMatrix<T>> {
    let mut s = matrix_sqrt(&mean_euclidean(matrices))?;
    let mut crit = T::infinity();
    let mut iterations = 0;
    while iterations < config.max_iterations && crit > config.epsilon {
        iterations += 1;
        let j = average_of(matrices, |c| matrix_sqrt(&(&s * c * &s)))?;
        let sj = matrix_sqrt(&j)?;
        crit = (&sj - &s).norm();
        s = sj;
    }
    report("Wasserstein", iterations, crit, config);
    Ok(&s * &s)
}

fn mean_riemann<T: Scalar>(matrices: &[DMatrix<T>], config: &IterationConfig<T>) -> Result<DMatrix<T>> {
    let mut m = mean_euclidean(matrices);
    let mut nu = T::one();
    let mut tau = <T as Float>::max_value();
    let mut crit = T::infinity();
    let mut iterations = 0;
    let shrink = <T as Scalar>::from_f64(0.95);

    while iterations < config.max_iterations && crit > config.epsilon && nu > config.epsilon {
        iterations += 1;
        let sc = matrix_sqrt(&m)?;
        let isc = matrix_sqrt_inv(&m)?;
        let j = average_of(matrices, |c| matrix_log(&(&isc * c * &isc)))?;
        crit = j.norm();
        m = &sc * matrix_exp(&(&j * nu))? * &sc;

        let h = nu * crit;
        if h < tau {
            nu *= shrink;
            tau = h;
        } else {
            nu *= half::<T>();
        }
    }
    report("Riemann", iterations, crit, config);
    Ok(m)
}

fn mean_ale<T: Scalar>(matrices: &[DMatrix<T>], config: &IterationConfig<T>) -> Result<DMatrix<T>> {
    log::warn!("the ALE mean is experimental: its joint diagonalizer seed is the identity");
    let n = matrices[0].nrows();
    let identity = DMatrix::<T>::identity(n, n);
    let mut basis = identity.clone();
    let mut crit = T::infinity();
    let mut iterations = 0;

    while iterations < config.max_iterations && crit > config.epsilon {
        iterations += 1;
        let j = average_of(matrices, |c| matrix_log(&(basis.transpose() * c * &basis)))?;
        let update = DMatrix::from_diagonal(&matrix_exp(&j)?.diagonal());
        let scaling = update.map_diagonal(|u| T::one() / <T as Float>::sqrt(u));
        basis = &basis * DMatrix::from_diagonal(&scaling);
        crit = distance_riemann(&identity, &update)?;
    }
    report("ALE", iterations, crit, config);

    let j = average_of(matrices, |c| matrix_log(&(basis.transpose() * c * &basis)))?;
    let a = matrix_inverse(&basis)?;
    Ok(a.transpose() * matrix_exp(&j)? * a)
}

fn report<T: Scalar>(name: &str, iterations: usize, crit: T, config: &IterationConfig<T>) {
    if iterations >= config.max_iterations && crit > config.epsilon {
        log::warn!(
            "{name} mean stopped at the iteration cap ({iterations}) with criterion {crit}"
        );
    } else {
        log::debug!("{name} mean converged in {iterations} iterations (criterion {crit})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use spdgeom_core::error::SpdError;

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    fn sample() -> Vec<DMatrix<f64>> {
        vec![
            DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]),
            DMatrix::from_row_slice(2, 2, &[1.5, -0.3, -0.3, 2.5]),
            DMatrix::from_row_slice(2, 2, &[3.0, 0.1, 0.1, 0.8]),
        ]
    }

    #[test]
    fn test_scalar_matrices() {
        let covs = vec![diag(&[1.0, 1.0]), diag(&[4.0, 4.0])];
        assert_relative_eq!(mean(&covs, Metric::Euclidean).unwrap(), diag(&[2.5, 2.5]), epsilon = 1e-12);
        assert_relative_eq!(mean(&covs, Metric::LogEuclidean).unwrap(), diag(&[2.0, 2.0]), epsilon = 1e-12);
        assert_relative_eq!(mean(&covs, Metric::Harmonic).unwrap(), diag(&[1.6, 1.6]), epsilon = 1e-12);
        assert_relative_eq!(mean(&covs, Metric::Riemann).unwrap(), diag(&[2.0, 2.0]), epsilon = 1e-4);
        assert_relative_eq!(mean(&covs, Metric::Wasserstein).unwrap(), diag(&[2.25, 2.25]), epsilon = 1e-3);
        assert_relative_eq!(mean(&covs, Metric::Identity).unwrap(), diag(&[1.0, 1.0]));
        // sqrt(2.5 · 1.6)
        assert_relative_eq!(mean(&covs, Metric::Kullback).unwrap(), diag(&[2.0, 2.0]), epsilon = 1e-12);
    }

    #[test]
    fn test_log_det_fixed_point() {
        let covs = vec![diag(&[1.0, 1.0]), diag(&[4.0, 4.0])];
        let m = mean(&covs, Metric::LogDet).unwrap();
        // m = 1 / (1/(1+m) + 1/(4+m)) holds for m = 2
        assert_relative_eq!(m, diag(&[2.0, 2.0]), epsilon = 1e-3);
    }

    #[test]
    fn test_riemann_mean_is_a_stationary_point() {
        let covs = sample();
        let config = IterationConfig::new().with_epsilon(1e-10).with_max_iterations(500);
        let m = mean_with(&covs, Metric::Riemann, &config).unwrap();
        let isc = matrix_sqrt_inv(&m).unwrap();
        let mut grad = DMatrix::zeros(2, 2);
        for c in &covs {
            grad += matrix_log(&(&isc * c * &isc)).unwrap();
        }
        assert!(grad.norm() < 1e-6);
    }

    #[test]
    fn test_ale_on_diagonal_matrices() {
        let covs = vec![diag(&[1.0, 2.0]), diag(&[4.0, 8.0])];
        let m = mean(&covs, Metric::Ale).unwrap();
        assert_relative_eq!(m, diag(&[2.0, 4.0]), epsilon = 1e-6);
    }

    #[test]
    fn test_single_element() {
        let covs = vec![sample().remove(0)];
        for metric in Metric::ALL {
            assert_eq!(mean(&covs, metric).unwrap(), covs[0]);
        }
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            mean::<f64>(&[], Metric::Riemann),
            Err(SpdError::EmptyInput { .. })
        ));
        let mixed = vec![diag(&[1.0, 1.0]), diag(&[1.0, 1.0, 1.0])];
        assert!(matches!(
            mean(&mixed, Metric::Euclidean),
            Err(SpdError::DimensionMismatch { .. })
        ));
        let rect = vec![DMatrix::from_row_slice(1, 2, &[1.0, 2.0]), DMatrix::from_row_slice(1, 2, &[3.0, 4.0])];
        assert_relative_eq!(
            mean(&rect, Metric::Euclidean).unwrap(),
            DMatrix::from_row_slice(1, 2, &[2.0, 3.0])
        );
        assert_eq!(mean(&rect, Metric::Identity).unwrap(), DMatrix::identity(1, 2));
        assert!(matches!(
            mean(&rect, Metric::Riemann),
            Err(SpdError::NotSquare { .. })
        ));
        let bad = IterationConfig::new().with_max_iterations(0);
        assert!(mean_with(&sample(), Metric::Riemann, &bad).is_err());
    }

    #[test]
    fn test_iteration_cap_returns_estimate() {
        let config = IterationConfig::new().with_epsilon(1e-300).with_max_iterations(1);
        let m = mean_with(&sample(), Metric::Riemann, &config).unwrap();
        assert_eq!(m.shape(), (2, 2));
    }
}
