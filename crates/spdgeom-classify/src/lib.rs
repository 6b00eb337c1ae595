//! Adaptive nearest-centroid classifiers for SPD matrices.
//!
//! The family is built around [`MatrixClassifier`]: one centroid per class,
//! prediction by minimum distance. Its [`ClassifierKind`] selects two
//! optional stages applied to every sample before the distance step:
//!
//! - recentering by the running [`BiasTracker`] estimate (`*Rebias` kinds),
//! - projection through a [`GeodesicFilter`] (FgMDM kinds), either kept
//!   fixed while centroids adapt in real time, or refitted with every
//!   adapted trial.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use spdgeom_classify::prelude::*;
//!
//! let low = DMatrix::<f64>::identity(2, 2);
//! let high = &low * 4.0;
//! let mut mdm = MatrixClassifier::new(ClassifierKind::Mdm, 2, Metric::Riemann);
//! mdm.train(&vec![vec![low.clone()], vec![high.clone()]])?;
//!
//! let result = mdm.classify(&(&low * 1.5), Adaptation::Supervised, Some(0))?;
//! assert_eq!(result.class_id, 0);
//! assert_eq!(mdm.trial_counts(), vec![2, 1]);
//! # Ok::<(), spdgeom_classify::ClassifierError>(())
//! ```

pub mod bias;
pub mod classifier;
pub mod covariance;
pub mod error;
pub mod fgda;
pub mod kind;
pub mod state;

pub use bias::BiasTracker;
pub use classifier::{
    ensure_classifier_metric, ClassModel, Classification, ClassifierConfig, MatrixClassifier,
};
pub use error::{ClassifierError, ClassifierResult};
pub use fgda::GeodesicFilter;
pub use kind::{Adaptation, ClassifierKind, FilterPolicy};
pub use state::ClassifierState;

/// Commonly used items.
pub mod prelude {
    pub use crate::bias::BiasTracker;
    pub use crate::classifier::{Classification, ClassifierConfig, MatrixClassifier};
    pub use crate::error::{ClassifierError, ClassifierResult};
    pub use crate::fgda::GeodesicFilter;
    pub use crate::kind::{Adaptation, ClassifierKind};
    pub use spdgeom_core::prelude::*;
}
