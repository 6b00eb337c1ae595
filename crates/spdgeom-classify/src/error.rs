//! Error types of the classifier family.

use spdgeom_core::SpdError;
use thiserror::Error;

/// Errors that can occur while training, classifying or restoring a
/// classifier. A failed call never changes the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    /// Propagated failure of a matrix operation.
    #[error("Matrix operation failed: {0}")]
    Spd(#[from] SpdError),

    /// A class id outside `[0, class_count)`.
    #[error("Class id {class_id} is outside [0, {class_count})")]
    InvalidClass {
        /// Offending class id
        class_id: usize,
        /// Number of classes of the classifier
        class_count: usize,
    },

    /// Supervised adaptation was requested without the true class.
    #[error("Supervised adaptation requires the true class id")]
    MissingLabel,

    /// The classifier has no trained model for at least one class.
    #[error("Classifier is not trained")]
    NotTrained,

    /// Training data is empty or has an empty class.
    #[error("Invalid training dataset: {reason}")]
    EmptyDataset {
        /// Description of the problem
        reason: String,
    },

    /// A restored state is inconsistent with its classifier kind.
    #[error("Invalid classifier state: {reason}")]
    InvalidState {
        /// Description of the inconsistency
        reason: String,
    },
}

impl ClassifierError {
    /// Create an InvalidClass error.
    pub fn invalid_class(class_id: usize, class_count: usize) -> Self {
        Self::InvalidClass {
            class_id,
            class_count,
        }
    }

    /// Create an EmptyDataset error.
    pub fn empty_dataset<S: Into<String>>(reason: S) -> Self {
        Self::EmptyDataset {
            reason: reason.into(),
        }
    }

    /// Create an InvalidState error.
    pub fn invalid_state<S: Into<String>>(reason: S) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }
}

/// Result type alias for classifier operations.
pub type ClassifierResult<T> = std::result::Result<T, ClassifierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_matrix_errors() {
        let err: ClassifierError = SpdError::not_square(2, 3).into();
        assert!(matches!(err, ClassifierError::Spd(SpdError::NotSquare { .. })));
        assert_eq!(
            err.to_string(),
            "Matrix operation failed: Matrix is not square: 2x3"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ClassifierError::invalid_class(3, 2).to_string(),
            "Class id 3 is outside [0, 2)"
        );
    }
}
