//! Geodesic interpolation between two SPD matrices.
//!
//! `geodesic(A, B, α, metric)` walks the fraction α of the shortest path
//! from A to B. Online adaptation uses it to pull a centroid toward a new
//! sample by `1/n`.

use num_traits::Float;
use spdgeom_core::{
    error::{Result, SpdError},
    matrix::{matrix_exp, matrix_log, matrix_pow, matrix_sqrt, matrix_sqrt_inv},
    metric::Metric,
    types::{DMatrix, Scalar},
    validation::{ensure_in_range, ensure_same_size, ensure_square},
};

/// Point at fraction `alpha` of the geodesic from `a` to `b`.
///
/// Both matrices must be square and of the same size, and `alpha` must lie
/// in `[0, 1]`. Defined for Riemann, Euclidean, LogEuclidean and Identity;
/// the Identity metric returns the identity matrix whatever `b` and `alpha`.
pub fn geodesic<T: Scalar>(
    a: &DMatrix<T>,
    b: &DMatrix<T>,
    alpha: T,
    metric: Metric,
) -> Result<DMatrix<T>> {
    ensure_riemann_operands(a, b)?;
    ensure_in_range("alpha", alpha, T::zero(), T::one())?;

    match metric {
        Metric::Riemann => geodesic_riemann_unchecked(a, b, alpha),
        Metric::Euclidean => Ok(a * (T::one() - alpha) + b * alpha),
        Metric::LogEuclidean => {
            let blended = matrix_log(a)? * (T::one() - alpha) + matrix_log(b)? * alpha;
            matrix_exp(&blended)
        }
        Metric::Identity => Ok(DMatrix::identity(a.nrows(), a.ncols())),
        Metric::LogDet
        | Metric::Kullback
        | Metric::Ale
        | Metric::Harmonic
        | Metric::Wasserstein => Err(SpdError::unsupported(metric, "Geodesic")),
    }
}

/// Affine-invariant geodesic `A^½ (A^-½ B A^-½)^α A^½`.
pub fn geodesic_riemann<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>, alpha: T) -> Result<DMatrix<T>> {
    geodesic(a, b, alpha, Metric::Riemann)
}

fn geodesic_riemann_unchecked<T: Scalar>(
    a: &DMatrix<T>,
    b: &DMatrix<T>,
    alpha: T,
) -> Result<DMatrix<T>> {
    if alpha == T::zero() {
        return Ok(a.clone());
    }
    let sa = matrix_sqrt(a)?;
    let isa = matrix_sqrt_inv(a)?;
    let inner = matrix_pow(&(&isa * b * &isa), alpha)?;
    Ok(&sa * inner * &sa)
}

/// Fails unless both operands are square and of the same size.
pub(crate) fn ensure_riemann_operands<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<()> {
    ensure_same_size(a, b)?;
    ensure_square(a)
}

/// Fraction `1/n` used by running estimates after their `n`-th update.
pub fn running_step<T: Scalar>(n: usize) -> T {
    T::one() / <T as Float>::max(<T as Scalar>::from_usize(n), T::one())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn sample_pair() -> (DMatrix<f64>, DMatrix<f64>) {
        (
            DMatrix::from_row_slice(2, 2, &[2.0, 0.3, 0.3, 1.0]),
            DMatrix::from_row_slice(2, 2, &[1.0, -0.2, -0.2, 3.0]),
        )
    }

    #[test]
    fn test_scaled_identity_midpoint() {
        let i = DMatrix::<f64>::identity(2, 2);
        let four = &i * 4.0;
        let mid = geodesic(&i, &four, 0.5, Metric::Riemann).unwrap();
        assert_relative_eq!(mid, &i * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_end_points() {
        let (a, b) = sample_pair();
        for metric in [Metric::Riemann, Metric::Euclidean, Metric::LogEuclidean] {
            assert_relative_eq!(geodesic(&a, &b, 0.0, metric).unwrap(), a, epsilon = 1e-10);
            assert_relative_eq!(geodesic(&a, &b, 1.0, metric).unwrap(), b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_euclidean_is_linear() {
        let (a, b) = sample_pair();
        let g = geodesic(&a, &b, 0.25, Metric::Euclidean).unwrap();
        assert_relative_eq!(g, &a * 0.75 + &b * 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_identity_metric() {
        let (a, b) = sample_pair();
        let g = geodesic(&a, &b, 0.3, Metric::Identity).unwrap();
        assert_eq!(g, DMatrix::identity(2, 2));
    }

    #[test]
    fn test_failures() {
        let (a, b) = sample_pair();
        assert!(matches!(
            geodesic(&a, &b, 1.5, Metric::Riemann),
            Err(SpdError::OutOfRange { .. })
        ));
        assert!(geodesic(&a, &b, -0.1, Metric::Euclidean).is_err());
        assert!(matches!(
            geodesic(&a, &DMatrix::identity(3, 3), 0.5, Metric::Riemann),
            Err(SpdError::DimensionMismatch { .. })
        ));
        let r = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            geodesic(&r, &r, 0.5, Metric::Euclidean),
            Err(SpdError::NotSquare { .. })
        ));
        assert!(matches!(
            geodesic(&a, &b, 0.5, Metric::Wasserstein),
            Err(SpdError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_running_step() {
        assert_relative_eq!(running_step::<f64>(1), 1.0);
        assert_relative_eq!(running_step::<f64>(4), 0.25);
        assert_relative_eq!(running_step::<f64>(0), 1.0);
    }
}
