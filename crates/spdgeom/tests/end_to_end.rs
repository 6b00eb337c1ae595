//! Session-style use of the facade: train, stream with adaptation, persist.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use spdgeom::prelude::*;

fn spd(a: f64, b: f64, c: f64) -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[a, c, c, b])
}

fn session() -> Dataset<f64> {
    vec![
        vec![spd(1.0, 1.2, 0.1), spd(1.1, 0.9, 0.0), spd(0.9, 1.0, -0.1)],
        vec![spd(3.0, 0.5, 0.2), spd(2.7, 0.6, 0.1), spd(3.3, 0.4, 0.3)],
    ]
}

#[test]
fn manifold_and_classifier_agree() {
    let data = session();
    let mut mdm = MatrixClassifier::new(ClassifierKind::Mdm, 2, Metric::Riemann);
    mdm.train(&data).unwrap();
    for (k, class) in data.iter().enumerate() {
        let centroid = mean(class, Metric::Riemann).unwrap();
        assert_relative_eq!(mdm.centroids()[k].clone(), centroid, epsilon = 1e-12);
    }

    let probe = spd(2.5, 0.7, 0.2);
    let result = mdm.classify(&probe, Adaptation::None, None).unwrap();
    let expected: Vec<f64> = data
        .iter()
        .map(|class| distance(&probe, &mean(class, Metric::Riemann).unwrap(), Metric::Riemann).unwrap())
        .collect();
    assert_eq!(result.class_id, 1);
    for (d, e) in result.distances.iter().zip(&expected) {
        assert_relative_eq!(*d, *e, epsilon = 1e-9);
    }
}

#[test]
fn stream_then_restore() {
    let mut classifier = MatrixClassifier::new(ClassifierKind::FgMdmRtRebias, 2, Metric::Riemann);
    classifier.train(&session()).unwrap();

    let probes = [
        (0, spd(1.0, 1.1, 0.05)),
        (1, spd(3.1, 0.5, 0.25)),
        (0, spd(0.95, 1.05, 0.0)),
    ];
    for (label, probe) in &probes {
        classifier
            .classify(probe, Adaptation::Supervised, Some(*label))
            .unwrap();
    }
    assert_eq!(classifier.trial_counts(), vec![5, 4]);
    assert_eq!(classifier.bias().unwrap().updates(), 3);

    let json = serde_json::to_string(&classifier.state()).unwrap();
    let state: ClassifierState<f64> = serde_json::from_str(&json).unwrap();
    let restored = MatrixClassifier::from_state(state).unwrap();
    assert!(restored.is_equal(&classifier, 1e-6));
    println!("{restored}");
}

#[test]
fn names_parse_back() {
    for kind in ClassifierKind::ALL {
        assert_eq!(kind.identifier().parse::<ClassifierKind>().unwrap(), kind);
    }
    for metric in Metric::ALL {
        assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
    }
    assert_eq!("no".parse::<Adaptation>().unwrap(), Adaptation::None);
}
