//! Shape predicates and their error-returning counterparts.

use crate::error::{Result, SpdError};
use crate::types::{DMatrix, Scalar};

/// True when the matrix has as many rows as columns.
pub fn is_square<T: Scalar>(m: &DMatrix<T>) -> bool {
    m.nrows() == m.ncols()
}

/// True when both matrices have the same shape.
pub fn have_same_size<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> bool {
    a.shape() == b.shape()
}

/// True when every matrix is square.
pub fn all_square<T: Scalar>(matrices: &[DMatrix<T>]) -> bool {
    matrices.iter().all(is_square)
}

/// True when every matrix has the shape of the first one.
pub fn all_same_size<T: Scalar>(matrices: &[DMatrix<T>]) -> bool {
    match matrices.first() {
        Some(first) => matrices.iter().all(|m| have_same_size(first, m)),
        None => true,
    }
}

/// True when `min <= value <= max`.
pub fn in_range<T: PartialOrd>(value: T, min: T, max: T) -> bool {
    min <= value && value <= max
}

/// Fails unless the matrix is square.
pub fn ensure_square<T: Scalar>(m: &DMatrix<T>) -> Result<()> {
    if is_square(m) {
        Ok(())
    } else {
        Err(SpdError::not_square(m.nrows(), m.ncols()))
    }
}

/// Fails unless both matrices have the same shape.
pub fn ensure_same_size<T: Scalar>(a: &DMatrix<T>, b: &DMatrix<T>) -> Result<()> {
    if have_same_size(a, b) {
        Ok(())
    } else {
        Err(SpdError::dimension_mismatch(shape_of(a), shape_of(b)))
    }
}

/// Fails unless the collection is non-empty and homogeneous in shape.
///
/// When `require_square` is set every matrix must also be square.
pub fn ensure_collection<T: Scalar>(matrices: &[DMatrix<T>], require_square: bool) -> Result<()> {
    let first = matrices
        .first()
        .ok_or_else(|| SpdError::empty_input("matrix collection"))?;
    if let Some(bad) = matrices.iter().find(|m| !have_same_size(first, m)) {
        return Err(SpdError::dimension_mismatch(shape_of(first), shape_of(bad)));
    }
    if require_square {
        ensure_square(first)?;
    }
    Ok(())
}

/// Fails unless `min <= value <= max`.
pub fn ensure_in_range<T>(parameter: &str, value: T, min: T, max: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if in_range(&value, &min, &max) {
        Ok(())
    } else {
        Err(SpdError::out_of_range(parameter, value, format!("[{min}, {max}]")))
    }
}

/// Formats the shape as `rows x cols`.
pub fn shape_of<T: Scalar>(m: &DMatrix<T>) -> String {
    format!("{}x{}", m.nrows(), m.ncols())
}
