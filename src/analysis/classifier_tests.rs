use super::*;
use crate::analysis::features::{PitchStats, Summary, N_MFCC};

/// Helper to create a record with only the given cue measured
fn with_cue(cue: Cue, value: f32) -> FeatureRecord {
    let mut features = FeatureRecord::default();
    set_cue(&mut features, cue, value);
    features
}

fn set_cue(features: &mut FeatureRecord, cue: Cue, value: f32) {
    match cue {
        Cue::PitchStd => features.pitch.std = value,
        Cue::PitchRange => features.pitch.range = value,
        Cue::CentroidStd => features.spectral_centroid.std = value,
        Cue::CepstralSmoothness => features.mfcc_std = [value; N_MFCC],
        Cue::ZcrStd => features.zero_crossing_rate.std = value,
        Cue::RmsStd => features.rms.std = value,
        Cue::RolloffStd => features.spectral_rolloff.std = value,
        Cue::BandwidthStd => features.spectral_bandwidth.std = value,
        Cue::ContrastStd => features.spectral_contrast.std = value,
        Cue::PolyStd => features.poly_features.std = value,
    }
}

fn record(cues: &[(Cue, f32)]) -> FeatureRecord {
    let mut features = FeatureRecord::default();
    for &(cue, value) in cues {
        set_cue(&mut features, cue, value);
    }
    features
}

/// Every cue in its strongest AI-favouring band
fn strongest_ai_record() -> FeatureRecord {
    record(&[
        (Cue::PitchStd, 1.0),
        (Cue::PitchRange, 10.0),
        (Cue::CentroidStd, 100.0),
        (Cue::CepstralSmoothness, 10.0),
        (Cue::ZcrStd, 0.001),
        (Cue::RmsStd, 0.001),
        (Cue::RolloffStd, 100.0),
        (Cue::BandwidthStd, 100.0),
        (Cue::ContrastStd, 2.0),
        (Cue::PolyStd, 0.05),
    ])
}

fn classifier() -> Classifier {
    Classifier::default()
}

#[test]
fn test_rule_table_branches() {
    // (cue, value, expected delta, expected reason)
    let cases: &[(Cue, f32, f64, Option<&str>)] = &[
        (Cue::PitchStd, 3.0, 0.30, Some("Extremely consistent pitch patterns")),
        (Cue::PitchStd, 5.0, 0.25, Some("Unusually consistent pitch patterns")),
        (Cue::PitchStd, 11.9, 0.25, Some("Unusually consistent pitch patterns")),
        (Cue::PitchStd, 12.0, 0.15, Some("Consistent pitch patterns")),
        (Cue::PitchStd, 25.0, 0.0, None),
        (Cue::PitchStd, 40.0, -0.10, None),
        (Cue::PitchStd, 80.0, -0.20, None),
        (Cue::PitchRange, 20.0, 0.20, Some("Very limited pitch range")),
        (Cue::PitchRange, 45.0, 0.15, Some("Limited pitch variation")),
        (Cue::PitchRange, 100.0, 0.0, None),
        (Cue::PitchRange, 175.0, -0.10, None),
        (Cue::PitchRange, 250.0, -0.15, None),
        (Cue::CentroidStd, 100.0, 0.15, Some("Uniform spectral characteristics")),
        (Cue::CentroidStd, 300.0, 0.10, None),
        (Cue::CentroidStd, 800.0, 0.0, None),
        (Cue::CentroidStd, 1500.0, -0.10, None),
        (
            Cue::CepstralSmoothness,
            10.0,
            0.15,
            Some("Smooth cepstral transitions typical of synthesis"),
        ),
        (Cue::CepstralSmoothness, 30.0, 0.10, None),
        (Cue::CepstralSmoothness, 80.0, 0.0, None),
        (Cue::CepstralSmoothness, 150.0, -0.10, None),
        (Cue::ZcrStd, 0.001, 0.10, Some("Consistent zero-crossing patterns")),
        (Cue::ZcrStd, 0.005, 0.05, None),
        (Cue::ZcrStd, 0.02, 0.0, None),
        (Cue::ZcrStd, 0.05, -0.05, None),
        (Cue::RmsStd, 0.001, 0.10, Some("Uniform energy distribution")),
        (Cue::RmsStd, 0.005, 0.05, None),
        (Cue::RmsStd, 0.05, -0.05, None),
        (Cue::RolloffStd, 100.0, 0.08, Some("Consistent spectral rolloff")),
        (Cue::RolloffStd, 500.0, 0.0, None),
        (Cue::RolloffStd, 1500.0, -0.05, None),
        (Cue::BandwidthStd, 100.0, 0.08, Some("Narrow spectral bandwidth")),
        (Cue::BandwidthStd, 300.0, 0.0, None),
        (Cue::BandwidthStd, 700.0, -0.05, None),
        (Cue::ContrastStd, 2.0, 0.05, None),
        (Cue::ContrastStd, 10.0, 0.0, None),
        (Cue::ContrastStd, 20.0, -0.05, None),
        (Cue::PolyStd, 0.05, 0.05, Some("Smooth spectral envelope")),
        (Cue::PolyStd, 0.2, 0.0, None),
        (Cue::PolyStd, 0.5, -0.05, None),
    ];

    let classifier = classifier();
    for &(cue, value, delta, reason) in cases {
        let scorecard = classifier.score(&with_cue(cue, value));
        assert!(
            (scorecard.raw_score - delta).abs() < 1e-9,
            "{} = {}: expected delta {}, got {}",
            cue.name(),
            value,
            delta,
            scorecard.raw_score
        );
        assert_eq!(
            scorecard.reasons,
            reason.into_iter().collect::<Vec<_>>(),
            "{} = {}",
            cue.name(),
            value
        );
    }
}

#[test]
fn test_negative_reasons_never_reported() {
    let classifier = classifier();
    for (cue, value) in [
        (Cue::PitchStd, 80.0),
        (Cue::PitchRange, 250.0),
        (Cue::CepstralSmoothness, 150.0),
    ] {
        assert!(classifier.score(&with_cue(cue, value)).reasons.is_empty());
    }
}

#[test]
fn test_branches_are_mutually_exclusive() {
    let samples = [
        0.001, 0.003, 0.005, 0.008, 0.05, 0.08, 0.2, 0.35, 0.5, 1.0, 3.0, 4.0, 5.0, 12.0, 18.0,
        20.0, 30.0, 35.0, 50.0, 60.0, 100.0, 150.0, 200.0, 250.0, 500.0, 600.0, 1000.0, 1200.0,
        5000.0,
    ];
    for group in RULES {
        for value in samples {
            let hits = group
                .branches
                .iter()
                .filter(|branch| branch.band.contains(value))
                .count();
            assert!(hits <= 1, "{} = {} hits {} branches", group.cue.name(), value, hits);
        }
    }
}

#[test]
fn test_unmeasured_features_do_not_fire() {
    let decision = classifier().classify(&FeatureRecord::default());

    assert_eq!(decision.ai_score, 0.0);
    assert_eq!(decision.label, Label::Human);
    assert_eq!(decision.confidence, 0.80);
    assert!(decision.reasons.is_empty());
    assert_eq!(decision.explanation, HUMAN_FALLBACK_EXPLANATION);
}

#[test]
fn test_consistent_pitch_scenario() {
    let features = FeatureRecord {
        pitch: PitchStats {
            std: 3.0,
            range: 20.0,
            ..PitchStats::default()
        },
        ..FeatureRecord::default()
    };
    let decision = classifier().classify(&features);

    assert_eq!(decision.ai_score, 0.50);
    assert_eq!(decision.label, Label::AiGenerated);
    assert_eq!(decision.confidence, 0.65);
    assert_eq!(
        decision.explanation,
        "Extremely consistent pitch patterns | Very limited pitch range"
    );
    assert_eq!(decision.reasons.len(), 2);
}

#[test]
fn test_varied_pitch_scenario() {
    let features = FeatureRecord {
        pitch: PitchStats {
            std: 80.0,
            range: 250.0,
            ..PitchStats::default()
        },
        ..FeatureRecord::default()
    };
    let classifier = classifier();
    let scorecard = classifier.score(&features);
    assert!((scorecard.raw_score + 0.35).abs() < 1e-9);

    let decision = classifier.classify(&features);
    assert_eq!(decision.ai_score, 0.0);
    assert_eq!(decision.label, Label::Human);
    assert_eq!(decision.confidence, 0.80);
    assert_eq!(decision.explanation, HUMAN_FALLBACK_EXPLANATION);
}

#[test]
fn test_strongest_ai_scenario() {
    let classifier = classifier();
    let features = strongest_ai_record();

    let scorecard = classifier.score(&features);
    assert!(scorecard.raw_score > 1.0);

    let decision = classifier.classify(&features);
    assert_eq!(decision.ai_score, 1.0);
    assert_eq!(decision.label, Label::AiGenerated);
    assert_eq!(decision.confidence, 0.95);
    assert_eq!(
        decision.explanation,
        "Extremely consistent pitch patterns | Very limited pitch range | Uniform spectral characteristics"
    );
}

#[test]
fn test_max_reasons_is_configurable() {
    let classifier = Classifier::new(ClassifierConfig {
        max_reasons: 5,
        separator: "; ".to_string(),
        ..ClassifierConfig::default()
    });
    let decision = classifier.classify(&strongest_ai_record());

    assert_eq!(decision.reasons.len(), 5);
    assert_eq!(decision.explanation.matches("; ").count(), 4);
}

#[test]
fn test_threshold_boundary() {
    let classifier = classifier();

    // 0.15 + 0.15 + 0.05 = 0.35
    let at_threshold = record(&[
        (Cue::PitchStd, 15.0),
        (Cue::PitchRange, 40.0),
        (Cue::ContrastStd, 2.0),
    ]);
    let decision = classifier.classify(&at_threshold);
    assert_eq!(decision.ai_score, 0.35);
    assert_eq!(decision.label, Label::AiGenerated);
    assert_eq!(decision.confidence, 0.55);

    // 0.15 + 0.15 = 0.30
    let below = record(&[(Cue::PitchStd, 15.0), (Cue::PitchRange, 40.0)]);
    let decision = classifier.classify(&below);
    assert_eq!(decision.label, Label::Human);
    assert_eq!(decision.confidence, 0.77);
    assert!(decision.reasons.is_empty());
}

#[test]
fn test_ai_without_reasons_uses_fallback() {
    // Only reasonless positive branches: 0.10 + 0.10 + 0.05 + 0.05 + 0.05
    let features = record(&[
        (Cue::CentroidStd, 300.0),
        (Cue::CepstralSmoothness, 30.0),
        (Cue::ZcrStd, 0.005),
        (Cue::RmsStd, 0.005),
        (Cue::ContrastStd, 2.0),
    ]);
    let decision = classifier().classify(&features);

    assert_eq!(decision.label, Label::AiGenerated);
    assert!(decision.reasons.is_empty());
    assert_eq!(decision.explanation, AI_FALLBACK_EXPLANATION);
}

#[test]
fn test_confidence_mapping() {
    assert_eq!(ai_confidence(0.35), 0.55);
    assert_eq!(ai_confidence(0.50), 0.65);
    assert_eq!(ai_confidence(0.65), 0.75);
    assert_eq!(ai_confidence(1.0), 0.95);

    // A score of exactly 0 means no rule fired and pins HUMAN confidence at
    // 0.80; any positive score goes through the curve, which peaks near 0.95
    assert_eq!(human_confidence(0.0), 0.80);
    assert_eq!(human_confidence(0.01), 0.94);
    assert_eq!(human_confidence(0.25), 0.80);
    assert_eq!(human_confidence(0.10), 0.89);
    assert_eq!(human_confidence(0.30), 0.77);
}

#[test]
fn test_confidence_stays_in_label_range() {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let classifier = classifier();

    for _ in 0..500 {
        let features = FeatureRecord {
            pitch: PitchStats {
                std: rng.gen_range(0.0..100.0),
                range: rng.gen_range(0.0..400.0),
                ..PitchStats::default()
            },
            spectral_centroid: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..2000.0),
            },
            mfcc_std: [rng.gen_range(0.0..200.0); N_MFCC],
            zero_crossing_rate: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..0.1),
            },
            rms: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..0.1),
            },
            spectral_rolloff: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..2000.0),
            },
            spectral_bandwidth: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..1000.0),
            },
            spectral_contrast: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..30.0),
            },
            poly_features: Summary {
                mean: 0.0,
                std: rng.gen_range(0.0..0.6),
            },
            ..FeatureRecord::default()
        };

        let decision = classifier.classify(&features);
        assert!((0.0..=1.0).contains(&decision.ai_score));
        assert!(decision.reasons.len() <= 3);
        match decision.label {
            Label::AiGenerated => assert!(
                (0.55..=0.95).contains(&decision.confidence),
                "AI confidence {} out of range",
                decision.confidence
            ),
            Label::Human => assert!(
                (0.60..=0.95).contains(&decision.confidence),
                "HUMAN confidence {} out of range",
                decision.confidence
            ),
        }
    }
}

#[test]
fn test_classify_is_idempotent() {
    let classifier = classifier();
    let features = record(&[
        (Cue::PitchStd, 9.0),
        (Cue::PitchRange, 45.0),
        (Cue::RmsStd, 0.02),
        (Cue::PolyStd, 0.05),
    ]);

    let first = classifier.classify(&features);
    for _ in 0..1000 {
        assert_eq!(classifier.classify(&features), first);
    }
}

#[test]
fn test_label_serializes_as_wire_names() {
    assert_eq!(
        serde_json::to_string(&Label::AiGenerated).unwrap(),
        "\"AI_GENERATED\""
    );
    assert_eq!(serde_json::to_string(&Label::Human).unwrap(), "\"HUMAN\"");
    assert_eq!(Label::AiGenerated.to_string(), "AI_GENERATED");
}
