//! Riemannian statistics and adaptive classifiers for symmetric positive
//! definite matrices.
//!
//! This crate re-exports the workspace:
//!
//! - [`core`]: scalar trait, metrics, matrix functions, errors
//! - [`manifold`]: distances, geodesics, means, medians, tangent space
//! - [`classify`]: MDM and FgMDM classifiers with bias tracking
//!
//! # Example
//!
//! ```
//! use spdgeom::prelude::*;
//!
//! let a = DMatrix::<f64>::identity(2, 2);
//! let b = &a * 9.0;
//! let m = mean(&[a.clone(), b.clone()], Metric::Riemann)?;
//! assert!((m[(0, 0)] - 3.0).abs() < 1e-6);
//!
//! let mut mdm = MatrixClassifier::new(ClassifierKind::Mdm, 2, Metric::Riemann);
//! mdm.train(&vec![vec![a], vec![b]])?;
//! let result = mdm.classify(&m.scale(2.0), Adaptation::None, None)?;
//! assert_eq!(result.class_id, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use nalgebra;
pub use spdgeom_classify as classify;
pub use spdgeom_core as core;
pub use spdgeom_manifold as manifold;

pub use spdgeom_classify::{
    Adaptation, ClassifierError, ClassifierKind, ClassifierState, MatrixClassifier,
};
pub use spdgeom_core::{IterationConfig, Metric, Scalar, SpdError};

/// Everything needed for typical use.
pub mod prelude {
    pub use spdgeom_classify::prelude::*;
    pub use spdgeom_classify::{ClassModel, ClassifierState, FilterPolicy};
    pub use spdgeom_manifold::{
        distance, geodesic, mean, mean_with, median, median_with, tangent_space,
        un_tangent_space, TriangleOrder,
    };
}
