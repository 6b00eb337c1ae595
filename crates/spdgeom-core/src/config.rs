//! Configuration of the iterative aggregates.
//!
//! Every iterative algorithm (Mean for LogDet, Wasserstein, Riemann and ALE,
//! both Median variants) stops on the first of two conditions: its
//! convergence criterion falls under `epsilon`, or `max_iterations`
//! iterations have run. Hitting the cap is not a failure; the current
//! estimate is returned.

use crate::error::{Result, SpdError};
use crate::types::{constants, Scalar};
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stopping rule shared by the iterative aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IterationConfig<T> {
    /// Convergence threshold on the algorithm's criterion.
    pub epsilon: T,
    /// Maximum number of iterations.
    pub max_iterations: usize,
}

impl<T: Scalar> Default for IterationConfig<T> {
    fn default() -> Self {
        Self {
            epsilon: T::DEFAULT_TOLERANCE,
            max_iterations: constants::DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl<T: Scalar> IterationConfig<T> {
    /// Creates a configuration with the default values (1e-4, 50).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the convergence threshold.
    pub fn with_epsilon(mut self, epsilon: T) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks that both bounds are finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon > T::zero()) || !Float::is_finite(self.epsilon) {
            return Err(SpdError::invalid_parameter(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(SpdError::invalid_parameter(
                "max_iterations must be at least 1",
            ));
        }
        Ok(())
    }
}
