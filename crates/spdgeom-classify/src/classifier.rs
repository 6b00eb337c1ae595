//! Nearest-centroid classifier family on SPD matrices.
//!
//! A [`MatrixClassifier`] keeps one [`ClassModel`] (centroid and trial
//! count) per class and assigns a sample to the class whose centroid is the
//! closest under the configured metric. Depending on its
//! [`ClassifierKind`], samples are first recentered by a [`BiasTracker`]
//! and/or passed through a [`GeodesicFilter`].
//!
//! # State machine
//!
//! ```text
//! Untrained ──train──▶ Trained ──classify (+ adaptation)──▶ Trained
//!     ▲                   │
//!     └─set_class_count───┘
//! ```
//!
//! Every operation computes its result into temporaries and commits it only
//! on success: a failed call leaves the classifier unchanged.

use crate::bias::BiasTracker;
use crate::error::{ClassifierError, ClassifierResult};
use crate::fgda::GeodesicFilter;
use crate::kind::{Adaptation, ClassifierKind, FilterPolicy};
use spdgeom_core::{
    config::IterationConfig,
    error::{Result, SpdError},
    matrix::are_equal,
    metric::Metric,
    types::{DMatrix, Dataset, Scalar},
    validation::{ensure_same_size, ensure_square},
};
use spdgeom_manifold::{distance, geodesic, geodesic::running_step, mean_with};
use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Centroid and trial count of one class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassModel<T: Scalar> {
    /// Class centroid, empty until trained.
    pub centroid: DMatrix<T>,
    /// Number of trials the centroid summarizes.
    pub trials: usize,
}

impl<T: Scalar> ClassModel<T> {
    /// Untrained model.
    pub fn empty() -> Self {
        Self {
            centroid: DMatrix::zeros(0, 0),
            trials: 0,
        }
    }

    /// True once the centroid has been computed.
    pub fn is_trained(&self) -> bool {
        !self.centroid.is_empty()
    }

    fn is_equal(&self, other: &Self, precision: T) -> bool {
        self.trials == other.trials && are_equal(&self.centroid, &other.centroid, precision)
    }
}

/// Construction parameters of a classifier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifierConfig<T> {
    /// Member of the family.
    pub kind: ClassifierKind,
    /// Metric of centroids, distances and adaptation steps.
    pub metric: Metric,
    /// Number of classes before training.
    pub class_count: usize,
    /// Stopping rule of the iterative means.
    pub iteration: IterationConfig<T>,
}

impl<T: Scalar> Default for ClassifierConfig<T> {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::default(),
            metric: Metric::default(),
            class_count: 2,
            iteration: IterationConfig::default(),
        }
    }
}

impl<T: Scalar> ClassifierConfig<T> {
    /// Default configuration for `kind` (Riemann metric, two classes).
    pub fn new(kind: ClassifierKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Sets the metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the number of classes.
    pub fn with_class_count(mut self, class_count: usize) -> Self {
        self.class_count = class_count;
        self
    }

    /// Sets the stopping rule of the iterative means.
    pub fn with_iteration(mut self, iteration: IterationConfig<T>) -> Self {
        self.iteration = iteration;
        self
    }

    /// Checks the stopping rule and that the metric defines both a
    /// distance (prediction) and a geodesic (centroid adaptation and bias
    /// tracking).
    pub fn validate(&self) -> Result<()> {
        self.iteration.validate()?;
        ensure_classifier_metric(self.metric)
    }
}

/// Fails unless `metric` has the distance and geodesic a classifier needs.
pub fn ensure_classifier_metric(metric: Metric) -> Result<()> {
    if !metric.has_distance() {
        return Err(SpdError::unsupported(metric, "Distance"));
    }
    if !metric.has_geodesic() {
        return Err(SpdError::unsupported(metric, "Geodesic"));
    }
    Ok(())
}

/// Outcome of a classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<T> {
    /// Predicted class: the nearest centroid, first one on ties.
    pub class_id: usize,
    /// Distance of the sample to each class centroid.
    pub distances: Vec<T>,
    /// Confidence score per class: `min_distance / distance_k`, normalized
    /// to sum to one. This is a heuristic ranking, not a calibrated
    /// probability.
    pub probabilities: Vec<T>,
}

/// Trained parts of a classifier, computed before being committed.
struct Fitted<T: Scalar> {
    classes: Vec<ClassModel<T>>,
    filter: Option<GeodesicFilter<T>>,
    bias: Option<BiasTracker<T>>,
    retained: Dataset<T>,
}

/// Adaptation step, computed before being committed.
enum Adapted<T: Scalar> {
    Centroid(usize, ClassModel<T>),
    Refit {
        classes: Vec<ClassModel<T>>,
        filter: Option<GeodesicFilter<T>>,
        retained: Dataset<T>,
    },
}

/// Adaptive nearest-centroid classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixClassifier<T: Scalar> {
    pub(crate) config: ClassifierConfig<T>,
    pub(crate) classes: Vec<ClassModel<T>>,
    pub(crate) filter: Option<GeodesicFilter<T>>,
    pub(crate) bias: Option<BiasTracker<T>>,
    pub(crate) retained: Dataset<T>,
}

impl<T: Scalar> MatrixClassifier<T> {
    /// Untrained classifier of `kind` with `class_count` classes.
    pub fn new(kind: ClassifierKind, class_count: usize, metric: Metric) -> Self {
        Self::with_config(
            ClassifierConfig::new(kind)
                .with_class_count(class_count)
                .with_metric(metric),
        )
    }

    /// Untrained classifier built from a configuration.
    pub fn with_config(config: ClassifierConfig<T>) -> Self {
        let classes = vec![ClassModel::empty(); config.class_count];
        Self {
            config,
            classes,
            filter: None,
            bias: None,
            retained: Vec::new(),
        }
    }

    /// Replaces the stopping rule used by future trainings and refits.
    pub fn with_iteration(mut self, iteration: IterationConfig<T>) -> Self {
        self.config.iteration = iteration;
        self
    }

    /// Member of the family.
    pub fn kind(&self) -> ClassifierKind {
        self.config.kind
    }

    /// Active metric.
    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Configuration the classifier was built with.
    pub fn config(&self) -> &ClassifierConfig<T> {
        &self.config
    }

    /// Resizes the class collection. Every class model is reset and the
    /// classifier must be trained again.
    pub fn set_class_count(&mut self, class_count: usize) {
        self.config.class_count = class_count;
        self.classes = vec![ClassModel::empty(); class_count];
        self.filter = None;
        self.bias = None;
        self.retained = Vec::new();
    }

    /// Per-class models.
    pub fn class_models(&self) -> &[ClassModel<T>] {
        &self.classes
    }

    /// Per-class centroids.
    pub fn centroids(&self) -> Vec<&DMatrix<T>> {
        self.classes.iter().map(|c| &c.centroid).collect()
    }

    /// Per-class trial counts.
    pub fn trial_counts(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.trials).collect()
    }

    /// Tangent-space reference of the geodesic filter.
    pub fn reference(&self) -> Option<&DMatrix<T>> {
        self.filter.as_ref().map(GeodesicFilter::reference)
    }

    /// Projection of the geodesic filter.
    pub fn filter_weight(&self) -> Option<&DMatrix<T>> {
        self.filter.as_ref().map(GeodesicFilter::weight)
    }

    /// Fitted geodesic filter.
    pub fn filter(&self) -> Option<&GeodesicFilter<T>> {
        self.filter.as_ref()
    }

    /// Bias tracker of the recentering kinds.
    pub fn bias(&self) -> Option<&BiasTracker<T>> {
        self.bias.as_ref()
    }

    /// Samples retained by the retrain policy, in the recentered frame.
    pub fn retained_datasets(&self) -> &Dataset<T> {
        &self.retained
    }

    /// True when every class has a centroid.
    pub fn is_trained(&self) -> bool {
        !self.classes.is_empty() && self.classes.iter().all(ClassModel::is_trained)
    }

    /// Trains on a class-ordered dataset; the class count becomes the
    /// number of class blocks.
    ///
    /// Every class needs at least one trial and every trial must be square
    /// and of the same size. The metric must define a distance and a
    /// geodesic; otherwise training fails and the classifier is unchanged.
    pub fn train(&mut self, datasets: &Dataset<T>) -> ClassifierResult<()> {
        let fitted = self.fit(datasets)?;
        log::info!(
            "{} trained on {} classes ({:?} trials)",
            self.config.kind,
            fitted.classes.len(),
            fitted.classes.iter().map(|c| c.trials).collect::<Vec<_>>()
        );
        self.config.class_count = fitted.classes.len();
        self.classes = fitted.classes;
        self.filter = fitted.filter;
        self.bias = fitted.bias;
        self.retained = fitted.retained;
        Ok(())
    }

    /// Classifies `sample` and optionally adapts the classifier to it.
    ///
    /// Under [`Adaptation::Supervised`] the class `real_class_id` is
    /// adapted; under [`Adaptation::Unsupervised`] the predicted class is.
    /// Recentering kinds recenter the sample with the bias estimate from
    /// before the call, then update the bias with the raw sample, whatever
    /// the adaptation mode.
    pub fn classify(
        &mut self,
        sample: &DMatrix<T>,
        adaptation: Adaptation,
        real_class_id: Option<usize>,
    ) -> ClassifierResult<Classification<T>> {
        if !self.is_trained() {
            return Err(ClassifierError::NotTrained);
        }
        ensure_square(sample)?;
        ensure_same_size(&self.classes[0].centroid, sample)?;
        let label = match adaptation {
            Adaptation::Supervised => {
                Some(self.check_class(real_class_id.ok_or(ClassifierError::MissingLabel)?)?)
            }
            Adaptation::None | Adaptation::Unsupervised => None,
        };

        let (recentered, next_bias) = match &self.bias {
            Some(tracker) => (
                Cow::Owned(tracker.apply_bias(sample)?),
                Some(tracker.updated(sample, self.config.metric)?),
            ),
            None => (Cow::Borrowed(sample), None),
        };
        let filtered = match &self.filter {
            Some(filter) => Cow::Owned(filter.apply(&recentered)?),
            None => Cow::Borrowed(&*recentered),
        };

        let distances = self
            .classes
            .iter()
            .map(|c| distance(&filtered, &c.centroid, self.config.metric))
            .collect::<Result<Vec<_>>>()?;
        let class_id = nearest(&distances);
        let probabilities = confidence(&distances);

        let target = match adaptation {
            Adaptation::None => None,
            Adaptation::Supervised => label,
            Adaptation::Unsupervised => Some(class_id),
        };
        let adapted = match target {
            Some(k) => Some(self.adapt(k, &recentered, &filtered)?),
            None => None,
        };

        if let Some(tracker) = next_bias {
            self.bias = Some(tracker);
        }
        match adapted {
            Some(Adapted::Centroid(k, model)) => {
                log::debug!("class {k} adapted ({} trials)", model.trials);
                self.classes[k] = model;
            }
            Some(Adapted::Refit {
                classes,
                filter,
                retained,
            }) => {
                log::debug!("classifier refitted on {} retained trials", retained.iter().map(Vec::len).sum::<usize>());
                self.classes = classes;
                self.filter = filter;
                self.retained = retained;
            }
            None => {}
        }

        Ok(Classification {
            class_id,
            distances,
            probabilities,
        })
    }

    /// Compares two classifiers: kind, metric and trial counts exactly,
    /// matrices within `precision`.
    pub fn is_equal(&self, other: &Self, precision: T) -> bool {
        self.config.kind == other.config.kind
            && self.config.metric == other.config.metric
            && self.classes.len() == other.classes.len()
            && self
                .classes
                .iter()
                .zip(&other.classes)
                .all(|(a, b)| a.is_equal(b, precision))
            && option_equal(&self.filter, &other.filter, |a, b| a.is_equal(b, precision))
            && option_equal(&self.bias, &other.bias, |a, b| a.is_equal(b, precision))
            && datasets_equal(&self.retained, &other.retained, precision)
    }

    /// [`is_equal`](Self::is_equal) at [`Scalar::DEFAULT_PRECISION`].
    pub fn is_close(&self, other: &Self) -> bool {
        self.is_equal(other, T::DEFAULT_PRECISION)
    }

    fn check_class(&self, class_id: usize) -> ClassifierResult<usize> {
        if class_id < self.classes.len() {
            Ok(class_id)
        } else {
            Err(ClassifierError::invalid_class(class_id, self.classes.len()))
        }
    }

    fn fit(&self, datasets: &Dataset<T>) -> ClassifierResult<Fitted<T>> {
        self.config.validate()?;
        validate_dataset(datasets)?;
        let iteration = &self.config.iteration;

        let (data, bias) = if self.config.kind.rebias() {
            let mut tracker = BiasTracker::new();
            tracker.compute_bias(datasets, self.config.metric, iteration)?;
            (Cow::Owned(tracker.apply_bias_datasets(datasets)?), Some(tracker))
        } else {
            (Cow::Borrowed(datasets), None)
        };

        let (filter, classes) = self.fit_model(&data)?;
        let retained = match self.config.kind.filter_policy() {
            FilterPolicy::Retrain => data.into_owned(),
            FilterPolicy::None | FilterPolicy::RealTime => Vec::new(),
        };
        Ok(Fitted {
            classes,
            filter,
            bias,
            retained,
        })
    }

    /// Filter and centroids of an already recentered dataset.
    fn fit_model(
        &self,
        data: &Dataset<T>,
    ) -> Result<(Option<GeodesicFilter<T>>, Vec<ClassModel<T>>)> {
        let iteration = &self.config.iteration;
        let filter = if self.config.kind.is_filtered() {
            Some(GeodesicFilter::fit(data, iteration)?)
        } else {
            None
        };
        let classes = match &filter {
            Some(f) => class_models(&f.apply_dataset(data)?, self.config.metric, iteration)?,
            None => class_models(data, self.config.metric, iteration)?,
        };
        Ok((filter, classes))
    }

    fn adapt(
        &self,
        class_id: usize,
        recentered: &DMatrix<T>,
        filtered: &DMatrix<T>,
    ) -> ClassifierResult<Adapted<T>> {
        match self.config.kind.filter_policy() {
            FilterPolicy::Retrain => {
                let mut retained = self.retained.clone();
                retained[class_id].push(recentered.clone());
                let (filter, classes) = self.fit_model(&retained)?;
                Ok(Adapted::Refit {
                    classes,
                    filter,
                    retained,
                })
            }
            FilterPolicy::None | FilterPolicy::RealTime => {
                let current = &self.classes[class_id];
                let trials = current.trials + 1;
                let centroid = geodesic(
                    &current.centroid,
                    filtered,
                    running_step(trials),
                    self.config.metric,
                )?;
                Ok(Adapted::Centroid(class_id, ClassModel { centroid, trials }))
            }
        }
    }
}

impl<T: Scalar> fmt::Display for MatrixClassifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classifier: {}", self.config.kind)?;
        writeln!(f, "Metric: {}", self.config.metric)?;
        writeln!(f, "Number of classes: {}", self.classes.len())?;
        for (k, model) in self.classes.iter().enumerate() {
            writeln!(f, "Class {k} ({} trials):", model.trials)?;
            if model.is_trained() {
                write!(f, "{}", model.centroid)?;
            }
        }
        if let Some(filter) = &self.filter {
            write!(f, "Reference:{}", filter.reference())?;
            write!(f, "Filter weight:{}", filter.weight())?;
        }
        if let Some(bias) = &self.bias {
            writeln!(f, "Bias ({} updates):", bias.updates())?;
            if bias.is_initialized() {
                write!(f, "{}", bias.bias())?;
            }
        }
        Ok(())
    }
}

fn validate_dataset<T: Scalar>(datasets: &Dataset<T>) -> ClassifierResult<()> {
    if datasets.is_empty() {
        return Err(ClassifierError::empty_dataset("no class"));
    }
    if let Some(k) = datasets.iter().position(Vec::is_empty) {
        return Err(ClassifierError::empty_dataset(format!("class {k} has no trial")));
    }
    let first = &datasets[0][0];
    ensure_square(first)?;
    for trial in datasets.iter().flatten() {
        ensure_same_size(first, trial)?;
    }
    Ok(())
}

/// Mean and size of every class block.
fn class_models<T: Scalar>(
    data: &Dataset<T>,
    metric: Metric,
    iteration: &IterationConfig<T>,
) -> Result<Vec<ClassModel<T>>> {
    #[cfg(feature = "parallel")]
    let blocks = data.par_iter();
    #[cfg(not(feature = "parallel"))]
    let blocks = data.iter();

    blocks
        .map(|class| {
            Ok(ClassModel {
                centroid: mean_with(class, metric, iteration)?,
                trials: class.len(),
            })
        })
        .collect()
}

/// Index of the smallest distance; the first one wins ties.
fn nearest<T: Scalar>(distances: &[T]) -> usize {
    distances
        .iter()
        .enumerate()
        .fold(0, |best, (k, &d)| if d < distances[best] { k } else { best })
}

/// `min/dₖ` normalized to sum to one. Zero distances share the whole mass.
fn confidence<T: Scalar>(distances: &[T]) -> Vec<T> {
    let exact = distances.iter().filter(|&&d| d <= T::zero()).count();
    if exact > 0 {
        let share = T::one() / <T as Scalar>::from_usize(exact);
        return distances
            .iter()
            .map(|&d| if d <= T::zero() { share } else { T::zero() })
            .collect();
    }
    let min = distances[nearest(distances)];
    let ratios: Vec<T> = distances.iter().map(|&d| min / d).collect();
    let total = ratios.iter().fold(T::zero(), |acc, &r| acc + r);
    ratios.into_iter().map(|r| r / total).collect()
}

fn option_equal<V, F>(a: &Option<V>, b: &Option<V>, eq: F) -> bool
where
    F: Fn(&V, &V) -> bool,
{
    match (a, b) {
        (Some(a), Some(b)) => eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn datasets_equal<T: Scalar>(a: &Dataset<T>, b: &Dataset<T>, precision: T) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(ca, cb)| {
            ca.len() == cb.len() && ca.iter().zip(cb).all(|(x, y)| are_equal(x, y, precision))
        })
}
