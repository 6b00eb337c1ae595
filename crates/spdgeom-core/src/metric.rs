//! Registry of the metrics understood by the statistics engine.

use crate::error::SpdError;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Metric selecting the distance, geodesic and aggregate algorithms.
///
/// Not every metric defines every operation; see the individual operations
/// for the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Metric {
    /// Affine-invariant Riemannian metric.
    #[default]
    Riemann,
    /// Frobenius (flat) metric.
    Euclidean,
    /// Euclidean metric on matrix logarithms.
    LogEuclidean,
    /// Log-determinant (Jensen-Bregman) divergence.
    LogDet,
    /// Symmetrized Kullback-Leibler divergence.
    Kullback,
    /// AJD-based log-Euclidean mean. Experimental: the joint diagonalizer
    /// seed is the identity.
    Ale,
    /// Harmonic mean (inverse of the mean of inverses).
    Harmonic,
    /// Bures-Wasserstein metric.
    Wasserstein,
    /// Constant metric used to disable comparisons.
    Identity,
}

impl Metric {
    /// Every metric, in registry order.
    pub const ALL: [Self; 9] = [
        Self::Riemann,
        Self::Euclidean,
        Self::LogEuclidean,
        Self::LogDet,
        Self::Kullback,
        Self::Ale,
        Self::Harmonic,
        Self::Wasserstein,
        Self::Identity,
    ];

    /// Display name of the metric.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Riemann => "Riemann",
            Self::Euclidean => "Euclidian",
            Self::LogEuclidean => "Log Euclidian",
            Self::LogDet => "Log Determinant",
            Self::Kullback => "Kullback",
            Self::Ale => "AJD-based log-Euclidean",
            Self::Harmonic => "Harmonic",
            Self::Wasserstein => "Wasserstein",
            Self::Identity => "Identity",
        }
    }

    /// Short identifier of the variant, also accepted by the parser.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Riemann => "riemann",
            Self::Euclidean => "euclidean",
            Self::LogEuclidean => "logeuclidean",
            Self::LogDet => "logdet",
            Self::Kullback => "kullback",
            Self::Ale => "ale",
            Self::Harmonic => "harmonic",
            Self::Wasserstein => "wasserstein",
            Self::Identity => "identity",
        }
    }

    /// Metrics whose mean accepts non-square input.
    pub const fn accepts_rectangular(self) -> bool {
        matches!(self, Self::Euclidean | Self::Identity)
    }

    /// Best-effort metrics whose results should not be relied on.
    pub const fn is_experimental(self) -> bool {
        matches!(self, Self::Ale)
    }

    /// Metrics that define a pairwise distance.
    pub const fn has_distance(self) -> bool {
        !matches!(self, Self::Harmonic | Self::Ale)
    }

    /// Metrics that define a geodesic between two matrices.
    pub const fn has_geodesic(self) -> bool {
        matches!(
            self,
            Self::Riemann | Self::Euclidean | Self::LogEuclidean | Self::Identity
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = SpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == trimmed || m.identifier().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SpdError::unknown_name("metric", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_name_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(metric.to_string().parse::<Metric>().unwrap(), metric);
            assert_eq!(metric.identifier().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Metric::Euclidean.to_string(), "Euclidian");
        assert_eq!(Metric::LogDet.to_string(), "Log Determinant");
        assert_eq!(Metric::Ale.to_string(), "AJD-based log-Euclidean");
    }

    #[test]
    fn test_parse_is_case_insensitive_on_identifiers() {
        assert_eq!("LogEuclidean".parse::<Metric>().unwrap(), Metric::LogEuclidean);
        assert_eq!(" WASSERSTEIN ".parse::<Metric>().unwrap(), Metric::Wasserstein);
    }

    #[test]
    fn test_unknown_name() {
        let err = "Manhattan".parse::<Metric>().unwrap_err();
        assert_eq!(err, SpdError::unknown_name("metric", "Manhattan"));
    }

    #[test]
    fn test_flags() {
        assert!(Metric::Euclidean.accepts_rectangular());
        assert!(Metric::Identity.accepts_rectangular());
        assert!(!Metric::Riemann.accepts_rectangular());
        assert!(Metric::Ale.is_experimental());
        assert_eq!(Metric::default(), Metric::Riemann);
    }

    #[test]
    fn test_operation_support() {
        let with_geodesic: Vec<_> = Metric::ALL.into_iter().filter(|m| m.has_geodesic()).collect();
        assert_eq!(
            with_geodesic,
            vec![Metric::Riemann, Metric::Euclidean, Metric::LogEuclidean, Metric::Identity]
        );
        assert!(!Metric::Harmonic.has_distance());
        assert!(!Metric::Ale.has_distance());
        assert!(Metric::Wasserstein.has_distance());
        for metric in Metric::ALL {
            assert!(!metric.has_geodesic() || metric.has_distance(), "{metric}");
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(serde_json::from_str::<Metric>(&json).unwrap(), metric);
        }
    }
}
