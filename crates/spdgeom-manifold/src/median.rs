//! Geometric medians of a collection of matrices.
//!
//! Two estimators sit behind [`median`]:
//!
//! - the Weiszfeld iteration on raw matrix entries, the default form used
//!   by every metric except Riemann and Identity;
//! - a Riemannian variant that alternates tangent-space projections at the
//!   current estimate with feature-wise scalar medians.

use crate::mean::mean;
use crate::tangent::{tangent_space, un_tangent_space};
use num_traits::Float;
use spdgeom_core::{
    config::IterationConfig,
    error::Result,
    matrix::are_equal,
    metric::Metric,
    types::{DMatrix, DVector, Scalar},
    validation::ensure_collection,
};

/// Median of `matrices` under `metric` with the default stopping rule.
pub fn median<T: Scalar>(matrices: &[DMatrix<T>], metric: Metric) -> Result<DMatrix<T>> {
    median_with(matrices, metric, &IterationConfig::default())
}

/// Median of `matrices` under `metric`.
///
/// Riemann selects the tangent-space estimator and Identity returns the
/// identity. Every other metric falls back to the Weiszfeld estimator on
/// raw entries. A single matrix is returned unchanged.
pub fn median_with<T: Scalar>(
    matrices: &[DMatrix<T>],
    metric: Metric,
    config: &IterationConfig<T>,
) -> Result<DMatrix<T>> {
    config.validate()?;
    ensure_collection(matrices, metric == Metric::Riemann)?;
    if let [single] = matrices {
        return Ok(single.clone());
    }

    match metric {
        Metric::Riemann => riemann_median(matrices, config),
        Metric::Identity => Ok(DMatrix::identity(matrices[0].nrows(), matrices[0].ncols())),
        _ => weiszfeld_median(matrices, config),
    }
}

/// Weiszfeld geometric median of matrix entries.
///
/// Starts from the entry-wise scalar median and iterates
/// `M ← Σ wᵢ Cᵢ / Σ wᵢ` with `wᵢ = 1 / ‖Cᵢ − M‖`, skipping any matrix equal
/// to the current estimate. Stops when `‖M_new − M‖ / ‖M_new‖ < ε`.
pub fn weiszfeld_median<T: Scalar>(
    matrices: &[DMatrix<T>],
    config: &IterationConfig<T>,
) -> Result<DMatrix<T>> {
    ensure_collection(matrices, false)?;
    let (rows, cols) = matrices[0].shape();
    let mut median = DMatrix::from_fn(rows, cols, |i, j| {
        scalar_median(matrices.iter().map(|m| m[(i, j)]).collect())
    });
    let coincide = <T as Scalar>::from_f64(1e-12);

    let mut iterations = 0;
    let mut gain = config.epsilon;
    while iterations < config.max_iterations && gain >= config.epsilon {
        iterations += 1;
        let prev = median.clone();
        let mut next = DMatrix::zeros(rows, cols);
        let mut weights = T::zero();
        for m in matrices {
            if are_equal(m, &prev, coincide) {
                continue;
            }
            let w = T::one() / (m - &prev).norm();
            weights += w;
            next += m * w;
        }
        if weights <= T::zero() {
            break;
        }
        median = next / weights;

        let norm = median.norm();
        gain = if norm > T::zero() {
            (&median - &prev).norm() / norm
        } else {
            T::zero()
        };
    }
    log::debug!("Weiszfeld median stopped after {iterations} iterations (gain {gain})");
    Ok(median)
}

/// Riemannian median through tangent-space feature medians.
///
/// Starts from the Euclidean mean. Each iteration maps every matrix to the
/// tangent space at the current estimate, stops when the relative change of
/// the summed tangent norms is below ε, and otherwise maps the feature-wise
/// median back to the manifold.
pub fn riemann_median<T: Scalar>(
    matrices: &[DMatrix<T>],
    config: &IterationConfig<T>,
) -> Result<DMatrix<T>> {
    ensure_collection(matrices, true)?;
    let mut median = mean(matrices, Metric::Euclidean)?;
    let mut gain = config.epsilon;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let features = matrices
            .iter()
            .map(|m| tangent_space(m, Some(&median)))
            .collect::<Result<Vec<_>>>()?;
        let sum = features.iter().fold(T::zero(), |acc, f| acc + f.norm());
        if Float::abs((sum - gain) / gain) < config.epsilon {
            break;
        }

        let feature_median = DVector::from_fn(features[0].len(), |k, _| {
            scalar_median(features.iter().map(|f| f[k]).collect())
        });
        median = un_tangent_space(&feature_median, Some(&median))?;
        gain = sum;
        iterations += 1;
    }
    log::debug!("Riemannian median stopped after {iterations} iterations");
    Ok(median)
}

/// Median of a list of scalars; the mean of the two middle values for an
/// even count. Returns zero for an empty list.
pub fn scalar_median<T: Scalar>(mut values: Vec<T>) -> T {
    let n = values.len();
    if n == 0 {
        return T::zero();
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) * <T as Scalar>::from_f64(0.5)
    } else {
        values[n / 2]
    }
}
