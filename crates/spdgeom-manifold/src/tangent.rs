//! Tangent-space chart of the SPD manifold and upper-triangle packing.
//!
//! An n×n symmetric matrix has n(n+1)/2 free entries. Squeezing packs them
//! into a vector, either row by row (`RowMajor`) or diagonal by diagonal
//! (`DiagonalMajor`, main diagonal first). The tangent-space chart at a
//! reference point R maps an SPD matrix M to the squeezed
//! `log(R^-½ M R^-½)`, with the off-diagonal entries scaled by √2 so that
//! the Euclidean norm of the vector equals the Frobenius norm of the
//! logarithm.

use spdgeom_core::{
    error::{Result, SpdError},
    matrix::{matrix_exp, matrix_log, matrix_sqrt, matrix_sqrt_inv},
    types::{constants::SQRT_2, DMatrix, DVector, Scalar},
    validation::{ensure_same_size, ensure_square},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packing order of an upper triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TriangleOrder {
    /// `m(0,0), m(0,1), …, m(0,n−1), m(1,1), …`
    #[default]
    RowMajor,
    /// `m(0,0), m(1,1), …, m(n−1,n−1), m(0,1), m(1,2), …`
    DiagonalMajor,
}

/// Visits the upper-triangle positions `(row, col)` in packing order.
fn triangle_positions(n: usize, order: TriangleOrder) -> Vec<(usize, usize)> {
    let mut positions = Vec::with_capacity(n * (n + 1) / 2);
    match order {
        TriangleOrder::RowMajor => {
            for i in 0..n {
                for j in i..n {
                    positions.push((i, j));
                }
            }
        }
        TriangleOrder::DiagonalMajor => {
            for offset in 0..n {
                for j in offset..n {
                    positions.push((j - offset, j));
                }
            }
        }
    }
    positions
}

/// Side of the square matrix whose upper triangle has `len` entries.
pub fn triangle_side(len: usize) -> Result<usize> {
    // n(n+1)/2 = len
    let n = ((((8 * len + 1) as f64).sqrt() - 1.0) / 2.0).round() as usize;
    if n * (n + 1) / 2 == len {
        Ok(n)
    } else {
        Err(SpdError::dimension_mismatch(
            "a triangular number of features",
            len,
        ))
    }
}

/// Packs the upper triangle of a square matrix into a vector.
pub fn squeeze_upper_triangle<T: Scalar>(m: &DMatrix<T>, order: TriangleOrder) -> Result<DVector<T>> {
    ensure_square(m)?;
    let positions = triangle_positions(m.nrows(), order);
    Ok(DVector::from_iterator(
        positions.len(),
        positions.iter().map(|&(i, j)| m[(i, j)]),
    ))
}

/// Rebuilds the symmetric matrix whose packed upper triangle is `v`.
pub fn unsqueeze_upper_triangle<T: Scalar>(v: &DVector<T>, order: TriangleOrder) -> Result<DMatrix<T>> {
    let n = triangle_side(v.len())?;
    let mut m = DMatrix::zeros(n, n);
    for (k, (i, j)) in triangle_positions(n, order).into_iter().enumerate() {
        m[(i, j)] = v[k];
        m[(j, i)] = v[k];
    }
    Ok(m)
}

/// Weights applied to the squeezed logarithm: 1 on the diagonal, √2 off it.
fn tangent_coefficients<T: Scalar>(n: usize) -> DVector<T> {
    let sqrt2 = <T as Scalar>::from_f64(SQRT_2);
    let positions = triangle_positions(n, TriangleOrder::RowMajor);
    DVector::from_iterator(
        positions.len(),
        positions
            .iter()
            .map(|&(i, j)| if i == j { T::one() } else { sqrt2 }),
    )
}

/// Maps an SPD matrix to the tangent space at `reference` (identity when
/// `None`).
pub fn tangent_space<T: Scalar>(m: &DMatrix<T>, reference: Option<&DMatrix<T>>) -> Result<DVector<T>> {
    ensure_square(m)?;
    let log = match reference {
        Some(r) => {
            ensure_same_size(r, m)?;
            let isr = matrix_sqrt_inv(r)?;
            matrix_log(&(&isr * m * &isr))?
        }
        None => matrix_log(m)?,
    };
    let packed = squeeze_upper_triangle(&log, TriangleOrder::RowMajor)?;
    Ok(packed.component_mul(&tangent_coefficients(m.nrows())))
}

/// Inverse of [`tangent_space`]: rebuilds the SPD matrix from its tangent
/// vector at `reference` (identity when `None`).
pub fn un_tangent_space<T: Scalar>(v: &DVector<T>, reference: Option<&DMatrix<T>>) -> Result<DMatrix<T>> {
    let n = triangle_side(v.len())?;
    let unscaled = v.component_div(&tangent_coefficients(n));
    let exp = matrix_exp(&unsqueeze_upper_triangle(&unscaled, TriangleOrder::RowMajor)?)?;
    match reference {
        Some(r) => {
            if r.shape() != (n, n) {
                return Err(SpdError::dimension_mismatch(
                    format!("{n}x{n}"),
                    format!("{}x{}", r.nrows(), r.ncols()),
                ));
            }
            let sr = matrix_sqrt(r)?;
            Ok(&sr * exp * &sr)
        }
        None => Ok(exp),
    }
}

/// Flattens a matrix into a feature vector: its tangent vector at
/// `reference` when `tangent` is set, its row-major upper triangle otherwise.
pub fn featurize<T: Scalar>(
    m: &DMatrix<T>,
    tangent: bool,
    reference: Option<&DMatrix<T>>,
) -> Result<DVector<T>> {
    if tangent {
        tangent_space(m, reference)
    } else {
        squeeze_upper_triangle(m, TriangleOrder::RowMajor)
    }
}

/// Inverse of [`featurize`].
pub fn unfeaturize<T: Scalar>(
    v: &DVector<T>,
    tangent: bool,
    reference: Option<&DMatrix<T>>,
) -> Result<DMatrix<T>> {
    if tangent {
        un_tangent_space(v, reference)
    } else {
        unsqueeze_upper_triangle(v, TriangleOrder::RowMajor)
    }
}

/// Whitens `m` by the reference: `R^-½ M R^-½ᵀ`.
pub fn affine_transform<T: Scalar>(reference: &DMatrix<T>, m: &DMatrix<T>) -> Result<DMatrix<T>> {
    ensure_square(m)?;
    ensure_same_size(reference, m)?;
    let isr = matrix_sqrt_inv(reference)?;
    Ok(&isr * m * isr.transpose())
}
