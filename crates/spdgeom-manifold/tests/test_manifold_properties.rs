//! Property tests for distances, geodesics, means and the tangent chart.

use nalgebra::DMatrix;
use proptest::prelude::*;
use spdgeom_core::matrix::are_equal;
use spdgeom_core::Metric;
use spdgeom_manifold::{
    distance, geodesic, mean, squeeze_upper_triangle, tangent_space, un_tangent_space,
    unsqueeze_upper_triangle, TriangleOrder,
};

const N: usize = 3;

/// Well-conditioned SPD matrix `A Aᵀ + I`.
fn spd() -> impl Strategy<Value = DMatrix<f64>> {
    prop::collection::vec(-1.0..1.0f64, N * N).prop_map(|entries| {
        let a = DMatrix::from_row_slice(N, N, &entries);
        &a * a.transpose() + DMatrix::identity(N, N)
    })
}

fn symmetric() -> impl Strategy<Value = DMatrix<f64>> {
    prop::collection::vec(-10.0..10.0f64, N * N).prop_map(|entries| {
        let a = DMatrix::from_row_slice(N, N, &entries);
        &a + a.transpose()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn symmetric_metrics_are_symmetric(a in spd(), b in spd()) {
        for metric in [Metric::Riemann, Metric::Euclidean, Metric::LogEuclidean, Metric::Wasserstein, Metric::Kullback] {
            let ab = distance(&a, &b, metric).unwrap();
            let ba = distance(&b, &a, metric).unwrap();
            prop_assert!((ab - ba).abs() <= 1e-8 * (1.0 + ab.abs()), "{metric}: {ab} vs {ba}");
        }
    }

    #[test]
    fn distances_are_non_negative(a in spd(), b in spd()) {
        for metric in [Metric::Riemann, Metric::Euclidean, Metric::LogEuclidean, Metric::LogDet, Metric::Kullback, Metric::Wasserstein] {
            prop_assert!(distance(&a, &b, metric).unwrap() >= 0.0);
        }
    }

    #[test]
    fn geodesic_end_points(a in spd(), b in spd()) {
        for metric in [Metric::Riemann, Metric::Euclidean, Metric::LogEuclidean] {
            prop_assert!(are_equal(&geodesic(&a, &b, 0.0, metric).unwrap(), &a, 1e-8));
            prop_assert!(are_equal(&geodesic(&a, &b, 1.0, metric).unwrap(), &b, 1e-8));
        }
    }

    #[test]
    fn riemann_geodesic_splits_distance(a in spd(), b in spd(), alpha in 0.0..1.0f64) {
        let g = geodesic(&a, &b, alpha, Metric::Riemann).unwrap();
        let total = distance(&a, &b, Metric::Riemann).unwrap();
        let first = distance(&a, &g, Metric::Riemann).unwrap();
        prop_assert!((first - alpha * total).abs() < 1e-6);
    }

    #[test]
    fn tangent_round_trip(m in spd(), r in spd()) {
        let v = tangent_space(&m, Some(&r)).unwrap();
        prop_assert!(are_equal(&un_tangent_space(&v, Some(&r)).unwrap(), &m, 1e-8));
    }

    #[test]
    fn squeeze_round_trip(m in symmetric()) {
        for order in [TriangleOrder::RowMajor, TriangleOrder::DiagonalMajor] {
            let v = squeeze_upper_triangle(&m, order).unwrap();
            prop_assert_eq!(v.len(), N * (N + 1) / 2);
            prop_assert_eq!(unsqueeze_upper_triangle(&v, order).unwrap(), m.clone());
        }
    }

    #[test]
    fn mean_ignores_ordering(a in spd(), b in spd(), c in spd()) {
        let forward = vec![a.clone(), b.clone(), c.clone()];
        let backward = vec![c, a, b];
        for metric in Metric::ALL {
            let m1 = mean(&forward, metric).unwrap();
            let m2 = mean(&backward, metric).unwrap();
            prop_assert!(are_equal(&m1, &m2, 1e-6), "{metric}");
        }
    }

    #[test]
    fn mean_of_one_is_itself(m in spd()) {
        for metric in Metric::ALL {
            prop_assert_eq!(mean(&[m.clone()], metric).unwrap(), m.clone());
        }
    }
}
