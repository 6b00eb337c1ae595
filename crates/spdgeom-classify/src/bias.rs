//! Running recentering of incoming samples.
//!
//! The tracker holds a bias matrix B, estimated as the mean of the training
//! trials and then pulled toward each new sample along the geodesic by
//! `1/n`. Samples are recentered as `B^-½ S B^-½ᵀ`, which maps B itself to
//! the identity.

use spdgeom_core::{
    config::IterationConfig,
    error::{Result, SpdError},
    matrix::{are_equal, matrix_sqrt_inv},
    metric::Metric,
    types::{DMatrix, Dataset, Scalar},
    validation::{ensure_same_size, ensure_square},
};
use spdgeom_manifold::{geodesic::running_step, geodesic, mean_with};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bias matrix, its cached inverse square root, and the update counter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BiasTracker<T: Scalar> {
    bias: DMatrix<T>,
    bias_is: DMatrix<T>,
    updates: usize,
}

impl<T: Scalar> Default for BiasTracker<T> {
    fn default() -> Self {
        Self {
            bias: DMatrix::zeros(0, 0),
            bias_is: DMatrix::zeros(0, 0),
            updates: 0,
        }
    }
}

impl<T: Scalar> BiasTracker<T> {
    /// Creates an empty tracker; the first update sets the bias.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker from a stored bias and update counter.
    pub fn from_parts(bias: DMatrix<T>, updates: usize) -> Result<Self> {
        let bias_is = if bias.is_empty() {
            bias.clone()
        } else {
            ensure_square(&bias)?;
            matrix_sqrt_inv(&bias)?
        };
        Ok(Self {
            bias,
            bias_is,
            updates,
        })
    }

    /// Current bias matrix.
    pub fn bias(&self) -> &DMatrix<T> {
        &self.bias
    }

    /// Number of updates since the bias was last computed.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// True once a bias has been computed or set.
    pub fn is_initialized(&self) -> bool {
        !self.bias.is_empty()
    }

    /// Replaces the bias and refreshes its inverse square root. The update
    /// counter is kept.
    pub fn set_bias(&mut self, bias: DMatrix<T>) -> Result<()> {
        ensure_square(&bias)?;
        let bias_is = matrix_sqrt_inv(&bias)?;
        self.bias = bias;
        self.bias_is = bias_is;
        Ok(())
    }

    /// Sets the bias to the mean of every trial of every class and resets
    /// the counter.
    pub fn compute_bias(
        &mut self,
        datasets: &Dataset<T>,
        metric: Metric,
        config: &IterationConfig<T>,
    ) -> Result<()> {
        let pooled: Vec<DMatrix<T>> = datasets.iter().flatten().cloned().collect();
        self.compute_bias_flat(&pooled, metric, config)
    }

    /// Sets the bias to the mean of already pooled trials and resets the
    /// counter.
    pub fn compute_bias_flat(
        &mut self,
        trials: &[DMatrix<T>],
        metric: Metric,
        config: &IterationConfig<T>,
    ) -> Result<()> {
        let bias = mean_with(trials, metric, config)?;
        ensure_square(&bias)?;
        let bias_is = matrix_sqrt_inv(&bias)?;
        *self = Self {
            bias,
            bias_is,
            updates: 0,
        };
        Ok(())
    }

    /// Recenters one sample with the current bias.
    pub fn apply_bias(&self, sample: &DMatrix<T>) -> Result<DMatrix<T>> {
        if !self.is_initialized() {
            return Err(SpdError::empty_input("bias has not been computed"));
        }
        ensure_same_size(&self.bias_is, sample)?;
        Ok(&self.bias_is * sample * self.bias_is.transpose())
    }

    /// Recenters every trial of a dataset.
    pub fn apply_bias_datasets(&self, datasets: &Dataset<T>) -> Result<Dataset<T>> {
        datasets
            .iter()
            .map(|class| class.iter().map(|m| self.apply_bias(m)).collect())
            .collect()
    }

    /// Pulls the bias toward `sample`.
    ///
    /// The first update replaces the bias with the sample; the n-th moves
    /// it along the geodesic by `1/n`.
    pub fn update_bias(&mut self, sample: &DMatrix<T>, metric: Metric) -> Result<()> {
        *self = self.updated(sample, metric)?;
        Ok(())
    }

    /// Tracker state after [`update_bias`](Self::update_bias), leaving
    /// `self` untouched.
    pub fn updated(&self, sample: &DMatrix<T>, metric: Metric) -> Result<Self> {
        ensure_square(sample)?;
        let updates = self.updates + 1;
        let bias = if updates == 1 || !self.is_initialized() {
            sample.clone()
        } else {
            geodesic(&self.bias, sample, running_step(updates), metric)?
        };
        let bias_is = matrix_sqrt_inv(&bias)?;
        Ok(Self {
            bias,
            bias_is,
            updates,
        })
    }

    /// Compares bias matrices within `precision` and counters exactly.
    pub fn is_equal(&self, other: &Self, precision: T) -> bool {
        self.updates == other.updates && are_equal(&self.bias, &other.bias, precision)
    }
}
