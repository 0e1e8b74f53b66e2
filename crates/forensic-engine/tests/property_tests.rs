//! Property-based tests for scoring and classification

use forensic_engine::classifier::{ARTIFACT_CORE, QUALITY_CORE};
use forensic_engine::{classify, classify_with_reason, ImageMeasurement, ScorePair, Zone};
use proptest::prelude::*;

fn measurement() -> impl Strategy<Value = ImageMeasurement> {
    let value = || 0.0f64..1.0e7;
    (
        (value(), value(), value(), value(), value()),
        (value(), value(), value(), value(), value()),
    )
        .prop_map(|((a, b, c, d, e), (f, g, h, i, j))| ImageMeasurement {
            sharpness: a,
            entropy: b,
            contrast: c,
            noise: d,
            gradient: e,
            high_frequency: f,
            halftone: g,
            edge_irregularity: h,
            compression_variance: i,
            grid_density: j,
        })
}

proptest! {
    #[test]
    fn prop_scores_are_bounded(m in measurement()) {
        let scores = m.scores();
        prop_assert!((0.0..=100.0).contains(&scores.quality));
        prop_assert!((0.0..=100.0).contains(&scores.artifact));
    }

    #[test]
    fn prop_non_finite_inputs_stay_bounded(m in measurement(), nan_field in 0usize..10) {
        let mut m = m;
        let fields = [
            &mut m.sharpness, &mut m.entropy, &mut m.contrast, &mut m.noise, &mut m.gradient,
            &mut m.high_frequency, &mut m.halftone, &mut m.edge_irregularity,
            &mut m.compression_variance, &mut m.grid_density,
        ];
        *fields.into_iter().nth(nan_field).unwrap() = f64::NAN;
        let scores = m.scores();
        prop_assert!((0.0..=100.0).contains(&scores.quality));
        prop_assert!((0.0..=100.0).contains(&scores.artifact));
    }

    #[test]
    fn prop_document_average_is_bounded(ms in prop::collection::vec(measurement(), 1..8)) {
        let pairs: Vec<ScorePair> = ms.iter().map(|m| m.scores()).collect();
        let avg = ScorePair::average(&pairs).unwrap();
        prop_assert!((0.0..=100.0).contains(&avg.quality));
        prop_assert!((0.0..=100.0).contains(&avg.artifact));
    }

    #[test]
    fn prop_core_iff_both_bands(q in 0.0f64..100.0, a in 0.0f64..100.0) {
        let in_bands = QUALITY_CORE[0] <= q && q <= QUALITY_CORE[1]
            && ARTIFACT_CORE[0] <= a && a <= ARTIFACT_CORE[1];
        prop_assert_eq!(classify(q, a) == Zone::Core, in_bands);
    }

    #[test]
    fn prop_suspect_requires_a_band(q in 0.0f64..100.0, a in 0.0f64..100.0) {
        if classify(q, a) == Zone::Suspect {
            let quality_band = QUALITY_CORE[0] <= q && q <= QUALITY_CORE[1];
            let artifact_band = ARTIFACT_CORE[0] <= a && a <= ARTIFACT_CORE[1];
            prop_assert!(quality_band || artifact_band);
        }
    }

    #[test]
    fn prop_low_artifacts_are_never_flagged(q in 0.0f64..100.0, a in 0.0f64..64.99) {
        prop_assert_eq!(classify(q, a), Zone::None);
    }

    #[test]
    fn prop_classify_matches_reasoned_variant(q in 0.0f64..100.0, a in 0.0f64..100.0) {
        prop_assert_eq!(classify(q, a), classify_with_reason(q, a).zone);
    }
}
