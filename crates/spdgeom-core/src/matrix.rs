//! Spectral matrix functions on symmetric matrices.
//!
//! All functions work on the eigendecomposition `M = V diag(λ) Vᵀ` computed
//! by [`nalgebra::SymmetricEigen`] and return `V diag(f(λ)) Vᵀ`. Only the
//! lower triangle of the input is read, so callers must pass symmetric
//! matrices. Functions that are only defined on SPD matrices fail with
//! [`SpdError::NumericalError`] when an eigenvalue is out of their domain.

use crate::error::{Result, SpdError};
use crate::types::{DMatrix, DVector, Scalar};
use num_traits::Float;

/// Applies `f` to the eigenvalues of a symmetric matrix.
///
/// `f` may reject an eigenvalue by returning `None`; the rejection is
/// reported with `what` as the failing operation.
pub fn map_eigenvalues<T, F>(m: &DMatrix<T>, what: &str, f: F) -> Result<DMatrix<T>>
where
    T: Scalar,
    F: Fn(T) -> Option<T>,
{
    if m.nrows() != m.ncols() {
        return Err(SpdError::not_square(m.nrows(), m.ncols()));
    }
    let eigen = m.clone().symmetric_eigen();
    let mut values = DVector::zeros(eigen.eigenvalues.len());
    for (i, &eval) in eigen.eigenvalues.iter().enumerate() {
        values[i] = f(eval).ok_or_else(|| {
            log::debug!("{what} rejected eigenvalue {eval} of a {}x{} matrix", m.nrows(), m.ncols());
            SpdError::numerical_error(format!("{what}: eigenvalue {eval} outside the domain"))
        })?;
    }
    let diag = DMatrix::from_diagonal(&values);
    Ok(&eigen.eigenvectors * diag * eigen.eigenvectors.transpose())
}

/// Computes the matrix square root M^{1/2}.
pub fn matrix_sqrt<T: Scalar>(m: &DMatrix<T>) -> Result<DMatrix<T>> {
    map_eigenvalues(m, "square root", |x| {
        (x > T::zero()).then(|| <T as Float>::sqrt(x))
    })
}

/// Computes the inverse square root M^{-1/2}.
pub fn matrix_sqrt_inv<T: Scalar>(m: &DMatrix<T>) -> Result<DMatrix<T>> {
    map_eigenvalues(m, "inverse square root", |x| {
        (x > T::MIN_EIGENVALUE).then(|| T::one() / <T as Float>::sqrt(x))
    })
}

/// Computes the matrix logarithm log(M).
pub fn matrix_log<T: Scalar>(m: &DMatrix<T>) -> Result<DMatrix<T>> {
    map_eigenvalues(m, "logarithm", |x| {
        (x > T::zero()).then(|| <T as Float>::ln(x))
    })
}

/// Computes the matrix exponential exp(M) of a symmetric matrix.
pub fn matrix_exp<T: Scalar>(m: &DMatrix<T>) -> Result<DMatrix<T>> {
    map_eigenvalues(m, "exponential", |x| Some(<T as Float>::exp(x)))
}

/// Computes the real power M^α of an SPD matrix.
pub fn matrix_pow<T: Scalar>(m: &DMatrix<T>, alpha: T) -> Result<DMatrix<T>> {
    map_eigenvalues(m, "power", |x| {
        (x > T::zero()).then(|| <T as Float>::powf(x, alpha))
    })
}

/// Inverts a square matrix.
pub fn matrix_inverse<T: Scalar>(m: &DMatrix<T>) -> Result<DMatrix<T>> {
    if m.nrows() != m.ncols() {
        return Err(SpdError::not_square(m.nrows(), m.ncols()));
    }
    m.clone()
        .try_inverse()
        .ok_or_else(|| SpdError::numerical_error("matrix is singular"))
}

/// Generalized eigenvalues of the pencil (A, B), i.e. the eigenvalues of B⁻¹A.
///
/// B is factored as L Lᵀ, so the eigenvalues are those of the symmetric
/// matrix L⁻¹ A L⁻ᵀ. B must be SPD.
pub fn generalized_eigenvalues<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<DVector<T>> {
    if a.shape() != b.shape() {
        return Err(SpdError::dimension_mismatch(
            format!("{}x{}", b.nrows(), b.ncols()),
            format!("{}x{}", a.nrows(), a.ncols()),
        ));
    }
    let chol = nalgebra::Cholesky::new(b.clone())
        .ok_or_else(|| SpdError::numerical_error("matrix is not positive definite"))?;
    let l = chol.l();
    let x = l
        .solve_lower_triangular(a)
        .ok_or_else(|| SpdError::numerical_error("singular Cholesky factor"))?;
    let c = l
        .solve_lower_triangular(&x.transpose())
        .ok_or_else(|| SpdError::numerical_error("singular Cholesky factor"))?;
    Ok(symmetrize(&c).symmetric_eigenvalues())
}

/// Returns (M + Mᵀ) / 2.
pub fn symmetrize<T: Scalar>(m: &DMatrix<T>) -> DMatrix<T> {
    (m + m.transpose()) * <T as Scalar>::from_f64(0.5)
}

/// Relative comparison of two matrices.
///
/// Two matrices are equal when they have the same size and
/// `‖a − b‖ ≤ precision · min(‖a‖, ‖b‖)`. Two zero (or empty) matrices of
/// the same size are equal.
pub fn are_equal<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>, precision: T) -> bool {
    if a.shape() != b.shape() {
        return false;
    }
    let diff = (a - b).norm();
    diff <= precision * <T as Float>::min(a.norm(), b.norm())
}
