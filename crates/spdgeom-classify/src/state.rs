//! Persistable snapshot of a classifier.

use crate::bias::BiasTracker;
use crate::classifier::{ensure_classifier_metric, ClassModel, ClassifierConfig, MatrixClassifier};
use crate::error::{ClassifierError, ClassifierResult};
use crate::fgda::GeodesicFilter;
use crate::kind::{ClassifierKind, FilterPolicy};
use spdgeom_core::{
    metric::Metric,
    types::{DMatrix, Dataset, Scalar},
    validation::is_square,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything needed to restore a classifier: kind, metric, class models,
/// and the filter, bias and retained samples of the kinds that use them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassifierState<T: Scalar> {
    /// Member of the family.
    pub kind: ClassifierKind,
    /// Metric of centroids, distances and adaptation steps.
    pub metric: Metric,
    /// Number of classes, equal to `classes.len()`.
    pub class_count: usize,
    /// Centroid and trial count per class.
    pub classes: Vec<ClassModel<T>>,
    /// Filter reference, filtered kinds only.
    pub reference: Option<DMatrix<T>>,
    /// Filter projection, filtered kinds only.
    pub filter_weight: Option<DMatrix<T>>,
    /// Bias estimate, recentering kinds only.
    pub bias: Option<DMatrix<T>>,
    /// Bias update counter, recentering kinds only.
    pub bias_updates: Option<usize>,
    /// Recentered training and adapted trials, retrain kinds only.
    pub retained: Option<Dataset<T>>,
}

impl<T: Scalar> MatrixClassifier<T> {
    /// Snapshot of the learned state.
    pub fn state(&self) -> ClassifierState<T> {
        let kind = self.config.kind;
        ClassifierState {
            kind,
            metric: self.config.metric,
            class_count: self.classes.len(),
            classes: self.classes.clone(),
            reference: self.filter.as_ref().map(|f| f.reference().clone()),
            filter_weight: self.filter.as_ref().map(|f| f.weight().clone()),
            bias: self.bias.as_ref().map(|b| b.bias().clone()),
            bias_updates: self.bias.as_ref().map(BiasTracker::updates),
            retained: match kind.filter_policy() {
                FilterPolicy::Retrain => Some(self.retained.clone()),
                FilterPolicy::None | FilterPolicy::RealTime => None,
            },
        }
    }

    /// Restores a classifier from a snapshot, with the default stopping
    /// rule for future trainings.
    ///
    /// The snapshot must be consistent with its kind: filter parts only for
    /// filtered kinds, a bias only for recentering kinds, retained samples
    /// only for retrain kinds, and matching matrix sizes throughout.
    pub fn from_state(state: ClassifierState<T>) -> ClassifierResult<Self> {
        let ClassifierState {
            kind,
            metric,
            class_count,
            classes,
            reference,
            filter_weight,
            bias,
            bias_updates,
            retained,
        } = state;

        if let Err(err) = ensure_classifier_metric(metric) {
            return Err(ClassifierError::invalid_state(err.to_string()));
        }
        if classes.len() != class_count {
            return Err(ClassifierError::invalid_state(format!(
                "{} class models for {class_count} classes",
                classes.len()
            )));
        }
        let size = check_models(&classes)?;
        let trained = size.is_some();

        let filter = restore_filter(kind, trained, reference, filter_weight)?;
        let bias = restore_bias(kind, trained, bias, bias_updates)?;
        let retained = restore_retained(kind, class_count, trained, retained)?;

        if let Some(n) = size {
            let filter_size = filter.as_ref().map(|f| f.reference().nrows());
            let bias_size = bias
                .as_ref()
                .filter(|b| b.is_initialized())
                .map(|b| b.bias().nrows());
            let retained_ok = retained
                .iter()
                .flatten()
                .all(|m| m.nrows() == n && m.ncols() == n);
            if filter_size.is_some_and(|s| s != n) || bias_size.is_some_and(|s| s != n) || !retained_ok {
                return Err(ClassifierError::invalid_state(format!(
                    "state matrices do not match class models of size {n}"
                )));
            }
        }

        Ok(Self {
            config: ClassifierConfig::new(kind)
                .with_metric(metric)
                .with_class_count(class_count),
            classes,
            filter,
            bias,
            retained,
        })
    }
}

/// Size of the class centroids: `None` when none is trained. Partially
/// trained snapshots are rejected.
fn check_models<T: Scalar>(classes: &[ClassModel<T>]) -> ClassifierResult<Option<usize>> {
    let trained = classes.iter().filter(|c| c.is_trained()).count();
    if trained == 0 {
        return Ok(None);
    }
    if trained != classes.len() {
        return Err(ClassifierError::invalid_state("some classes have no centroid"));
    }
    let n = classes[0].centroid.nrows();
    if classes
        .iter()
        .any(|c| !is_square(&c.centroid) || c.centroid.nrows() != n)
    {
        return Err(ClassifierError::invalid_state(
            "class centroids must be square and of the same size",
        ));
    }
    Ok(Some(n))
}

fn restore_filter<T: Scalar>(
    kind: ClassifierKind,
    trained: bool,
    reference: Option<DMatrix<T>>,
    weight: Option<DMatrix<T>>,
) -> ClassifierResult<Option<GeodesicFilter<T>>> {
    match (kind.is_filtered(), reference, weight) {
        (true, Some(reference), Some(weight)) => Ok(Some(GeodesicFilter::from_parts(reference, weight)?)),
        (true, None, None) if !trained => Ok(None),
        (false, None, None) => Ok(None),
        (true, ..) => Err(ClassifierError::invalid_state(format!(
            "{kind} needs both a filter reference and a filter weight"
        ))),
        (false, ..) => Err(ClassifierError::invalid_state(format!(
            "{kind} has no geodesic filter"
        ))),
    }
}

fn restore_bias<T: Scalar>(
    kind: ClassifierKind,
    trained: bool,
    bias: Option<DMatrix<T>>,
    updates: Option<usize>,
) -> ClassifierResult<Option<BiasTracker<T>>> {
    match (kind.rebias(), bias, updates) {
        (true, Some(bias), Some(updates)) => Ok(Some(BiasTracker::from_parts(bias, updates)?)),
        (true, None, None) if !trained => Ok(None),
        (false, None, None) => Ok(None),
        (true, ..) => Err(ClassifierError::invalid_state(format!(
            "{kind} needs both a bias and its update count"
        ))),
        (false, ..) => Err(ClassifierError::invalid_state(format!(
            "{kind} does not track a bias"
        ))),
    }
}

fn restore_retained<T: Scalar>(
    kind: ClassifierKind,
    class_count: usize,
    trained: bool,
    retained: Option<Dataset<T>>,
) -> ClassifierResult<Dataset<T>> {
    match (kind.filter_policy(), retained) {
        (FilterPolicy::Retrain, Some(data)) if !trained && data.iter().all(Vec::is_empty) => Ok(data),
        (FilterPolicy::Retrain, Some(data)) => {
            if data.len() != class_count || data.iter().any(Vec::is_empty) {
                return Err(ClassifierError::invalid_state(format!(
                    "{kind} needs retained trials for each of its {class_count} classes"
                )));
            }
            Ok(data)
        }
        (FilterPolicy::Retrain, None) if !trained => Ok(Vec::new()),
        (FilterPolicy::Retrain, None) => Err(ClassifierError::invalid_state(format!(
            "{kind} needs its retained trials"
        ))),
        (_, None) => Ok(Vec::new()),
        (_, Some(_)) => Err(ClassifierError::invalid_state(format!(
            "{kind} does not retain trials"
        ))),
    }
}
