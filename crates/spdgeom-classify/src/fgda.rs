//! Geodesic discriminant filter (FgDA).
//!
//! The filter is fitted on tangent-space features at the Riemannian mean of
//! all training trials. An LSQR discriminant weight `W` is turned into the
//! projection `Wᵀ (W Wᵀ)⁻¹ W`, which keeps only the discriminant directions
//! of a tangent vector. Filtering a matrix maps it to the tangent space,
//! projects it, and maps it back to the manifold.

use crate::covariance::{ledoit_wolf, standard_scale};
use spdgeom_core::{
    config::IterationConfig,
    error::{Result, SpdError},
    matrix::are_equal,
    metric::Metric,
    types::{DMatrix, DVector, Dataset, Scalar},
};
use spdgeom_manifold::{mean_with, tangent_space, un_tangent_space};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// LSQR discriminant weight of per-class feature vectors.
///
/// Solves `C Wᵀ = Mᵀ` where `M` stacks the class mean features and `C` is
/// the class-size weighted pool of the per-class Ledoit-Wolf covariances of
/// the standardized features. With two classes the weight collapses to the
/// single row `W[1] − W[0]`.
pub fn lsqr<T: Scalar>(datasets: &[Vec<DVector<T>>]) -> Result<DMatrix<T>> {
    let first = datasets
        .first()
        .and_then(|class| class.first())
        .ok_or_else(|| SpdError::empty_input("LSQR needs at least one feature vector"))?;
    let features = first.len();
    let class_count = datasets.len();
    let total: usize = datasets.iter().map(Vec::len).sum();

    let mut means = DMatrix::zeros(class_count, features);
    let mut pooled = DMatrix::zeros(features, features);
    for (k, class) in datasets.iter().enumerate() {
        if class.is_empty() {
            return Err(SpdError::empty_input(format!("class {k} has no feature vector")));
        }
        if let Some(bad) = class.iter().find(|v| v.len() != features) {
            return Err(SpdError::dimension_mismatch(features, bad.len()));
        }

        let mut data = DMatrix::from_columns(class);
        let class_mean = data.column_mean();
        means.set_row(k, &class_mean.transpose());

        let scale = standard_scale(&mut data);
        let mut class_cov = ledoit_wolf(&data)?;
        for i in 0..features {
            for j in 0..features {
                class_cov[(i, j)] *= scale[i] * scale[j];
            }
        }
        let share = <T as Scalar>::from_usize(class.len()) / <T as Scalar>::from_usize(total);
        pooled += class_cov * share;
    }

    let weight = pooled
        .col_piv_qr()
        .solve(&means.transpose())
        .ok_or_else(|| SpdError::numerical_error("pooled covariance is singular"))?
        .transpose();

    if class_count == 2 {
        Ok(DMatrix::from_rows(&[weight.row(1) - weight.row(0)]))
    } else {
        Ok(weight)
    }
}

/// Projection `Wᵀ (W Wᵀ)⁻¹ W` built from the LSQR weight of `datasets`.
pub fn fgda_compute<T: Scalar>(datasets: &[Vec<DVector<T>>]) -> Result<DMatrix<T>> {
    let w = lsqr(datasets)?;
    let gram = &w * w.transpose();
    let identity = DMatrix::identity(gram.nrows(), gram.ncols());
    let gram_inv = gram
        .lu()
        .solve(&identity)
        .ok_or_else(|| SpdError::numerical_error("discriminant weight has dependent rows"))?;
    Ok(w.transpose() * gram_inv * w)
}

/// Filters one tangent-space feature vector: `projectionᵀ · feature`.
pub fn fgda_apply<T: Scalar>(feature: &DVector<T>, projection: &DMatrix<T>) -> Result<DVector<T>> {
    if feature.len() != projection.nrows() {
        return Err(SpdError::dimension_mismatch(projection.nrows(), feature.len()));
    }
    Ok(projection.tr_mul(feature))
}

/// Fitted geodesic filter: tangent-space reference plus FgDA projection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeodesicFilter<T: Scalar> {
    reference: DMatrix<T>,
    weight: DMatrix<T>,
}

impl<T: Scalar> GeodesicFilter<T> {
    /// Fits the filter on a class-ordered dataset of SPD matrices.
    ///
    /// The reference is the Riemannian mean of every trial of every class.
    pub fn fit(datasets: &Dataset<T>, config: &IterationConfig<T>) -> Result<Self> {
        let pooled: Vec<DMatrix<T>> = datasets.iter().flatten().cloned().collect();
        let reference = mean_with(&pooled, Metric::Riemann, config)?;
        let features = datasets
            .iter()
            .map(|class| {
                class
                    .iter()
                    .map(|m| tangent_space(m, Some(&reference)))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        let weight = fgda_compute(&features)?;
        log::debug!(
            "geodesic filter fitted on {} trials ({} features)",
            pooled.len(),
            weight.nrows()
        );
        Ok(Self { reference, weight })
    }

    /// Rebuilds a filter from a stored reference and projection.
    pub fn from_parts(reference: DMatrix<T>, weight: DMatrix<T>) -> Result<Self> {
        let n = reference.nrows();
        let features = n * (n + 1) / 2;
        if reference.ncols() != n {
            return Err(SpdError::not_square(n, reference.ncols()));
        }
        if weight.shape() != (features, features) {
            return Err(SpdError::dimension_mismatch(
                format!("{features}x{features}"),
                format!("{}x{}", weight.nrows(), weight.ncols()),
            ));
        }
        Ok(Self { reference, weight })
    }

    /// Tangent-space reference point.
    pub fn reference(&self) -> &DMatrix<T> {
        &self.reference
    }

    /// FgDA projection applied to tangent vectors.
    pub fn weight(&self) -> &DMatrix<T> {
        &self.weight
    }

    /// Filters one SPD matrix.
    pub fn apply(&self, m: &DMatrix<T>) -> Result<DMatrix<T>> {
        let feature = tangent_space(m, Some(&self.reference))?;
        let filtered = fgda_apply(&feature, &self.weight)?;
        un_tangent_space(&filtered, Some(&self.reference))
    }

    /// Filters every trial of a dataset.
    pub fn apply_dataset(&self, datasets: &Dataset<T>) -> Result<Dataset<T>> {
        datasets
            .iter()
            .map(|class| class.iter().map(|m| self.apply(m)).collect())
            .collect()
    }

    /// Compares reference and projection within `precision`.
    pub fn is_equal(&self, other: &Self, precision: T) -> bool {
        are_equal(&self.reference, &other.reference, precision)
            && are_equal(&self.weight, &other.weight, precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn features() -> Vec<Vec<DVector<f64>>> {
        vec![
            vec![
                DVector::from_vec(vec![0.0, 0.1, 1.0]),
                DVector::from_vec(vec![0.2, -0.1, 1.1]),
                DVector::from_vec(vec![-0.1, 0.0, 0.9]),
                DVector::from_vec(vec![0.1, 0.05, 1.05]),
            ],
            vec![
                DVector::from_vec(vec![1.0, 0.0, 1.0]),
                DVector::from_vec(vec![1.2, 0.1, 0.95]),
                DVector::from_vec(vec![0.9, -0.05, 1.1]),
                DVector::from_vec(vec![1.1, 0.02, 0.9]),
            ],
        ]
    }

    #[test]
    fn test_two_class_weight_is_one_row() {
        let w = lsqr(&features()).unwrap();
        assert_eq!(w.shape(), (1, 3));
        // The classes differ along the first feature.
        assert!(w[(0, 0)].abs() > w[(0, 2)].abs());
    }

    #[test]
    fn test_projection_is_idempotent() {
        let p = fgda_compute(&features()).unwrap();
        assert_relative_eq!(&p * &p, p.clone(), epsilon = 1e-10);
        assert_relative_eq!(p.clone(), p.transpose(), epsilon = 1e-10);
        assert_relative_eq!(p.trace(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_three_classes() {
        let mut data = features();
        data.push(vec![
            DVector::from_vec(vec![0.0, 1.0, 0.0]),
            DVector::from_vec(vec![0.1, 1.2, 0.1]),
            DVector::from_vec(vec![-0.1, 0.9, -0.05]),
            DVector::from_vec(vec![0.05, 1.1, 0.02]),
        ]);
        let w = lsqr(&data).unwrap();
        assert_eq!(w.shape(), (3, 3));
        let p = fgda_compute(&data).unwrap();
        assert_relative_eq!(&p * &p, p.clone(), epsilon = 1e-8);
    }

    #[test]
    fn test_apply() {
        let p = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]);
        let v = DVector::from_vec(vec![3.0, 4.0]);
        assert_eq!(fgda_apply(&v, &p).unwrap(), DVector::from_vec(vec![3.0, 0.0]));
        assert!(fgda_apply(&DVector::from_vec(vec![1.0]), &p).is_err());
    }

    #[test]
    fn test_failures() {
        assert!(lsqr::<f64>(&[]).is_err());
        let mut data = features();
        data[1].clear();
        assert!(lsqr(&data).is_err());
        let mut data = features();
        data[1][0] = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(lsqr(&data), Err(SpdError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_from_parts_validates_shapes() {
        let r = DMatrix::<f64>::identity(2, 2);
        assert!(GeodesicFilter::from_parts(r.clone(), DMatrix::identity(3, 3)).is_ok());
        assert!(GeodesicFilter::from_parts(r, DMatrix::identity(2, 2)).is_err());
    }
}
