//! Tags of the classifier family and of the adaptation modes.
//!
//! A classifier kind is a point of the product of two capabilities:
//! the geodesic filter policy (none, real-time, retrain) and the bias
//! recentering switch.

use spdgeom_core::SpdError;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the geodesic filter takes part in training and adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterPolicy {
    /// No filter: plain nearest centroid.
    None,
    /// Filter and reference are frozen after training; adaptation only
    /// moves centroids.
    RealTime,
    /// Every adapted sample is stored and the whole pipeline (reference,
    /// filter, centroids) is refitted on the enlarged store.
    Retrain,
}

/// Member of the nearest-centroid classifier family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClassifierKind {
    /// Minimum distance to mean.
    #[default]
    Mdm,
    /// Minimum distance to mean on recentered samples.
    MdmRebias,
    /// Geodesic-filtered MDM with a frozen filter.
    FgMdmRt,
    /// Geodesic-filtered MDM with a frozen filter on recentered samples.
    FgMdmRtRebias,
    /// Geodesic-filtered MDM refitted on every adapted sample.
    FgMdm,
    /// Geodesic-filtered MDM refitted on every adapted sample, on
    /// recentered samples.
    FgMdmRebias,
}

impl ClassifierKind {
    /// Every kind, in registry order.
    pub const ALL: [Self; 6] = [
        Self::Mdm,
        Self::MdmRebias,
        Self::FgMdmRt,
        Self::FgMdmRtRebias,
        Self::FgMdm,
        Self::FgMdmRebias,
    ];

    /// Kind with the given capabilities.
    pub const fn from_capabilities(filter: FilterPolicy, rebias: bool) -> Self {
        match (filter, rebias) {
            (FilterPolicy::None, false) => Self::Mdm,
            (FilterPolicy::None, true) => Self::MdmRebias,
            (FilterPolicy::RealTime, false) => Self::FgMdmRt,
            (FilterPolicy::RealTime, true) => Self::FgMdmRtRebias,
            (FilterPolicy::Retrain, false) => Self::FgMdm,
            (FilterPolicy::Retrain, true) => Self::FgMdmRebias,
        }
    }

    /// Filter policy of the kind.
    pub const fn filter_policy(self) -> FilterPolicy {
        match self {
            Self::Mdm | Self::MdmRebias => FilterPolicy::None,
            Self::FgMdmRt | Self::FgMdmRtRebias => FilterPolicy::RealTime,
            Self::FgMdm | Self::FgMdmRebias => FilterPolicy::Retrain,
        }
    }

    /// True when samples are recentered by a bias tracker.
    pub const fn rebias(self) -> bool {
        matches!(self, Self::MdmRebias | Self::FgMdmRtRebias | Self::FgMdmRebias)
    }

    /// True when a geodesic filter is fitted.
    pub const fn is_filtered(self) -> bool {
        !matches!(self.filter_policy(), FilterPolicy::None)
    }

    /// Display name of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mdm => "Minimum Distance to Mean (MDM)",
            Self::MdmRebias => "Minimum Distance to Mean REBIAS (MDM Rebias)",
            Self::FgMdmRt => "Minimum Distance to Mean with geodesic filtering in Real Time (FgMDM RT)",
            Self::FgMdmRtRebias => {
                "Minimum Distance to Mean with geodesic filtering in Real Time REBIAS (FgMDM RT Rebias)"
            }
            Self::FgMdm => "Minimum Distance to Mean with geodesic filtering (FgMDM)",
            Self::FgMdmRebias => {
                "Minimum Distance to Mean with geodesic filtering REBIAS (FgMDM Rebias)"
            }
        }
    }

    /// Short identifier, also accepted by the parser.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Mdm => "mdm",
            Self::MdmRebias => "mdm-rebias",
            Self::FgMdmRt => "fgmdm-rt",
            Self::FgMdmRtRebias => "fgmdm-rt-rebias",
            Self::FgMdm => "fgmdm",
            Self::FgMdmRebias => "fgmdm-rebias",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClassifierKind {
    type Err = SpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == trimmed || k.identifier().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| SpdError::unknown_name("classifier", s))
    }
}

/// Online adaptation mode of a classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Adaptation {
    /// Classify only.
    #[default]
    None,
    /// Adapt the class given by the caller.
    Supervised,
    /// Adapt the predicted class.
    Unsupervised,
}

impl Adaptation {
    /// Every mode.
    pub const ALL: [Self; 3] = [Self::None, Self::Supervised, Self::Unsupervised];

    /// Display name of the mode.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "No",
            Self::Supervised => "Supervised",
            Self::Unsupervised => "Unsupervised",
        }
    }
}

impl fmt::Display for Adaptation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Adaptation {
    type Err = SpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(trimmed))
            .or_else(|| trimmed.eq_ignore_ascii_case("none").then_some(Self::None))
            .ok_or_else(|| SpdError::unknown_name("adaptation", s))
    }
}
