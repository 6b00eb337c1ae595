//! Statistics on the manifold of symmetric positive definite matrices.
//!
//! This crate implements the metric-dependent operations used by the
//! classifiers: pairwise [`distance`](distance::distance) and
//! [`geodesic`](geodesic::geodesic) interpolation, the aggregate
//! [`mean`](mean::mean) and [`median`](median::median), and the
//! tangent-space chart used to apply linear methods to SPD data.
//!
//! # Example
//!
//! ```
//! use nalgebra::DMatrix;
//! use spdgeom_core::Metric;
//! use spdgeom_manifold::{distance, geodesic, mean};
//!
//! let a = DMatrix::<f64>::identity(2, 2);
//! let b = &a * 4.0;
//! let mid = geodesic(&a, &b, 0.5, Metric::Riemann)?;
//! assert!((mid[(0, 0)] - 2.0).abs() < 1e-12);
//!
//! let m = mean(&[a.clone(), b.clone()], Metric::LogEuclidean)?;
//! assert!(distance(&m, &mid, Metric::Riemann)? < 1e-12);
//! # Ok::<(), spdgeom_core::SpdError>(())
//! ```

pub mod distance;
pub mod geodesic;
pub mod mean;
pub mod median;
pub mod tangent;

pub use distance::{distance, kullback_divergence};
pub use geodesic::geodesic;
pub use mean::{mean, mean_with};
pub use median::{median, median_with};
pub use tangent::{
    affine_transform, featurize, squeeze_upper_triangle, tangent_space, un_tangent_space,
    unfeaturize, unsqueeze_upper_triangle, TriangleOrder,
};
