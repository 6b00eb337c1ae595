//! Shrinkage covariance of feature samples.
//!
//! Samples are stored column-wise: a `features × samples` matrix. This is
//! the part of covariance estimation the discriminant filter needs; it is
//! not a general estimator library.

use spdgeom_core::{
    error::{Result, SpdError},
    types::{DMatrix, DVector, Scalar},
    validation::ensure_in_range,
};
use num_traits::Float;

/// Centers each feature (row) and divides it by its standard deviation.
///
/// Returns the per-feature scale. A constant feature keeps a scale of 1.
pub fn standard_scale<T: Scalar>(data: &mut DMatrix<T>) -> DVector<T> {
    let count = <T as Scalar>::from_usize(data.ncols().max(1));
    let mut scale = DVector::from_element(data.nrows(), T::one());
    for (i, mut row) in data.row_iter_mut().enumerate() {
        let mu = row.sum() / count;
        let variance = row.iter().fold(T::zero(), |acc, &x| acc + x * x) / count - mu * mu;
        if variance > T::zero() {
            scale[i] = <T as Float>::sqrt(variance);
        }
        let s = scale[i];
        row.apply(|x| *x = (*x - mu) / s);
    }
    scale
}

/// Population covariance of column samples.
pub fn sample_covariance<T: Scalar>(data: &DMatrix<T>) -> Result<DMatrix<T>> {
    if data.is_empty() {
        return Err(SpdError::empty_input("covariance samples"));
    }
    let centered = center(data);
    Ok(&centered * centered.transpose() / <T as Scalar>::from_usize(data.ncols()))
}

/// Moves the covariance toward `trace/n · I` by `shrinkage ∈ [0, 1]`.
pub fn shrunk_covariance<T: Scalar>(cov: &DMatrix<T>, shrinkage: T) -> Result<DMatrix<T>> {
    ensure_in_range("shrinkage", shrinkage, T::zero(), T::one())?;
    let n = cov.nrows();
    let mu = cov.trace() / <T as Scalar>::from_usize(n.max(1));
    let mut shrunk = cov * (T::one() - shrinkage);
    for i in 0..n {
        shrunk[(i, i)] += shrinkage * mu;
    }
    Ok(shrunk)
}

/// Ledoit-Wolf shrinkage covariance of column samples.
///
/// ```text
/// δ = ‖C − μI‖²_F / n
/// β = Σ(X²X²ᵀ / S − C²) / (n S)
/// shrinkage = min(β, δ) / δ
/// ```
pub fn ledoit_wolf<T: Scalar>(data: &DMatrix<T>) -> Result<DMatrix<T>> {
    let cov = sample_covariance(data)?;
    let (n, s) = (data.nrows(), data.ncols());
    let nf = <T as Scalar>::from_usize(n);
    let sf = <T as Scalar>::from_usize(s);

    let mu = cov.trace() / nf;
    let mut delta_m = cov.clone();
    for i in 0..n {
        delta_m[(i, i)] -= mu;
    }
    let delta = delta_m.norm_squared() / nf;
    if delta <= T::zero() {
        // Already proportional to the identity.
        return Ok(cov);
    }

    let x2 = center(data).map(|x| x * x);
    let cov2 = cov.map(|x| x * x);
    let beta = ((&x2 * x2.transpose()) / sf - cov2).sum() / (nf * sf);
    let shrinkage = <T as Float>::min(<T as Float>::max(beta, T::zero()), delta) / delta;
    shrunk_covariance(&cov, shrinkage)
}

fn center<T: Scalar>(data: &DMatrix<T>) -> DMatrix<T> {
    let count = <T as Scalar>::from_usize(data.ncols().max(1));
    let mut centered = data.clone();
    for mut row in centered.row_iter_mut() {
        let mu = row.sum() / count;
        row.apply(|x| *x -= mu);
    }
    centered
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn samples() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            2,
            5,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 2.0, 1.0, 4.0, 3.0, 6.0],
        )
    }

    #[test]
    fn test_standard_scale() {
        let mut data = samples();
        let scale = standard_scale(&mut data);
        assert_relative_eq!(scale[0], 2.0_f64.sqrt(), epsilon = 1e-12);
        for row in data.row_iter() {
            assert_relative_eq!(row.sum(), 0.0, epsilon = 1e-12);
            assert_relative_eq!(row.norm_squared() / 5.0, 1.0, epsilon = 1e-12);
        }

        let mut constant = DMatrix::from_element(1, 3, 7.0);
        let scale = standard_scale(&mut constant);
        assert_eq!(scale[0], 1.0);
        assert_eq!(constant, DMatrix::zeros(1, 3));
    }

    #[test]
    fn test_sample_covariance() {
        let cov = sample_covariance(&samples()).unwrap();
        assert_relative_eq!(cov[(0, 0)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], cov[(1, 0)], epsilon = 1e-12);
        assert!(sample_covariance(&DMatrix::<f64>::zeros(0, 0)).is_err());
    }

    #[test]
    fn test_shrunk_covariance() {
        let cov = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 1.0]);
        assert_eq!(shrunk_covariance(&cov, 0.0).unwrap(), cov);
        assert_relative_eq!(
            shrunk_covariance(&cov, 1.0).unwrap(),
            DMatrix::identity(2, 2) * 2.0,
            epsilon = 1e-12
        );
        assert!(shrunk_covariance(&cov, 1.5).is_err());
    }

    #[test]
    fn test_ledoit_wolf_preserves_trace() {
        let data = samples();
        let cov = sample_covariance(&data).unwrap();
        let lw = ledoit_wolf(&data).unwrap();
        assert_relative_eq!(lw.trace(), cov.trace(), epsilon = 1e-12);
        // Shrinkage pulls the off-diagonal toward zero.
        assert!(lw[(0, 1)].abs() <= cov[(0, 1)].abs() + 1e-12);
    }
}
