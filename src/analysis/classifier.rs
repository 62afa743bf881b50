// Classifier - heuristic rule-based synthetic speech detection
//
// This module maps a FeatureRecord to a Decision (label, confidence,
// explanation). Scoring is a single fold over an ordered rule table: each
// rule group reads one scalar cue from the record and applies the first of
// its branches whose band contains the value.
//
// Rules:
// - A group only fires when its cue is strictly greater than 0. A zero cue
//   means "not measured" (silence, failed sub-feature), not "measured zero".
// - Positive deltas push towards AI_GENERATED and may carry a reason string.
// - The summed score is clamped to [0, 1]; at or above the threshold the
//   recording is labeled AI_GENERATED.
//
// Confidence is a piecewise linear mapping of the score, distinct for each
// label, rounded to 2 decimal places.

use crate::analysis::features::FeatureRecord;
use crate::config::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Explanation used when an AI_GENERATED decision has no fired reasons
pub const AI_FALLBACK_EXPLANATION: &str = "Synthetic voice patterns detected through audio analysis";

/// Explanation used for every HUMAN decision
pub const HUMAN_FALLBACK_EXPLANATION: &str = "Natural human speech patterns with expected variations";

/// Classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    /// Synthetic (text-to-speech, voice cloning) speech
    AiGenerated,
    /// Natural speech
    Human,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::AiGenerated => "AI_GENERATED",
            Label::Human => "HUMAN",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one FeatureRecord
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub label: Label,
    /// Confidence in `label` (0.55-0.95 for AI_GENERATED, 0.60-0.95 for HUMAN)
    pub confidence: f64,
    /// Clamped rule score (0.0-1.0)
    pub ai_score: f64,
    /// Fired reasons in rule order, at most `max_reasons`; empty for HUMAN
    pub reasons: Vec<String>,
    pub explanation: String,
}

/// Scalar read from a FeatureRecord by one rule group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    PitchStd,
    PitchRange,
    CentroidStd,
    /// Mean of the per-coefficient cepstral standard deviations
    CepstralSmoothness,
    ZcrStd,
    RmsStd,
    RolloffStd,
    BandwidthStd,
    ContrastStd,
    PolyStd,
}

impl Cue {
    pub fn value(self, features: &FeatureRecord) -> f32 {
        match self {
            Cue::PitchStd => features.pitch.std,
            Cue::PitchRange => features.pitch.range,
            Cue::CentroidStd => features.spectral_centroid.std,
            Cue::CepstralSmoothness => features.cepstral_smoothness(),
            Cue::ZcrStd => features.zero_crossing_rate.std,
            Cue::RmsStd => features.rms.std,
            Cue::RolloffStd => features.spectral_rolloff.std,
            Cue::BandwidthStd => features.spectral_bandwidth.std,
            Cue::ContrastStd => features.spectral_contrast.std,
            Cue::PolyStd => features.poly_features.std,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Cue::PitchStd => "pitch_std",
            Cue::PitchRange => "pitch_range",
            Cue::CentroidStd => "spectral_centroid_std",
            Cue::CepstralSmoothness => "cepstral_smoothness",
            Cue::ZcrStd => "zcr_std",
            Cue::RmsStd => "rms_std",
            Cue::RolloffStd => "spectral_rolloff_std",
            Cue::BandwidthStd => "spectral_bandwidth_std",
            Cue::ContrastStd => "spectral_contrast_std",
            Cue::PolyStd => "poly_features_std",
        }
    }
}

/// Value interval selecting a branch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    /// value < bound
    Below(f32),
    /// low <= value < high
    Between(f32, f32),
    /// value > bound
    Above(f32),
}

impl Band {
    pub fn contains(self, value: f32) -> bool {
        match self {
            Band::Below(bound) => value < bound,
            Band::Between(low, high) => value >= low && value < high,
            Band::Above(bound) => value > bound,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub band: Band,
    /// Score change; every delta is a multiple of 0.01
    pub delta: f64,
    /// Reported only when `delta` is positive
    pub reason: Option<&'static str>,
}

/// Mutually exclusive branches over one cue, checked in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleGroup {
    pub cue: Cue,
    pub branches: &'static [Branch],
}

impl RuleGroup {
    /// First branch containing the cue value, None if the cue is not measured
    pub fn evaluate(&self, features: &FeatureRecord) -> Option<&'static Branch> {
        let value = self.cue.value(features);
        if value <= 0.0 || !value.is_finite() {
            return None;
        }
        self.branches.iter().find(|branch| branch.band.contains(value))
    }
}

const fn branch(band: Band, delta: f64, reason: Option<&'static str>) -> Branch {
    Branch {
        band,
        delta,
        reason,
    }
}

/// The scoring table, in explanation order
pub const RULES: &[RuleGroup] = &[
    RuleGroup {
        cue: Cue::PitchStd,
        branches: &[
            branch(Band::Below(5.0), 0.30, Some("Extremely consistent pitch patterns")),
            branch(Band::Between(5.0, 12.0), 0.25, Some("Unusually consistent pitch patterns")),
            branch(Band::Between(12.0, 20.0), 0.15, Some("Consistent pitch patterns")),
            branch(Band::Above(50.0), -0.20, Some("Natural pitch variation")),
            branch(Band::Between(35.0, 50.0), -0.10, None),
        ],
    },
    RuleGroup {
        cue: Cue::PitchRange,
        branches: &[
            branch(Band::Below(30.0), 0.20, Some("Very limited pitch range")),
            branch(Band::Between(30.0, 60.0), 0.15, Some("Limited pitch variation")),
            branch(Band::Above(200.0), -0.15, Some("Wide natural pitch range")),
            branch(Band::Between(150.0, 200.0), -0.10, None),
        ],
    },
    RuleGroup {
        cue: Cue::CentroidStd,
        branches: &[
            branch(Band::Below(250.0), 0.15, Some("Uniform spectral characteristics")),
            branch(Band::Between(250.0, 500.0), 0.10, None),
            branch(Band::Above(1200.0), -0.10, None),
        ],
    },
    RuleGroup {
        cue: Cue::CepstralSmoothness,
        branches: &[
            branch(Band::Below(25.0), 0.15, Some("Smooth cepstral transitions typical of synthesis")),
            branch(Band::Between(25.0, 50.0), 0.10, None),
            branch(Band::Above(120.0), -0.10, Some("Natural cepstral variations")),
        ],
    },
    RuleGroup {
        cue: Cue::ZcrStd,
        branches: &[
            branch(Band::Below(0.003), 0.10, Some("Consistent zero-crossing patterns")),
            branch(Band::Between(0.003, 0.008), 0.05, None),
            branch(Band::Above(0.04), -0.05, None),
        ],
    },
    RuleGroup {
        cue: Cue::RmsStd,
        branches: &[
            branch(Band::Below(0.003), 0.10, Some("Uniform energy distribution")),
            branch(Band::Between(0.003, 0.008), 0.05, None),
            branch(Band::Above(0.04), -0.05, None),
        ],
    },
    RuleGroup {
        cue: Cue::RolloffStd,
        branches: &[
            branch(Band::Below(250.0), 0.08, Some("Consistent spectral rolloff")),
            branch(Band::Above(1000.0), -0.05, None),
        ],
    },
    RuleGroup {
        cue: Cue::BandwidthStd,
        branches: &[
            branch(Band::Below(150.0), 0.08, Some("Narrow spectral bandwidth")),
            branch(Band::Above(600.0), -0.05, None),
        ],
    },
    RuleGroup {
        cue: Cue::ContrastStd,
        branches: &[
            branch(Band::Below(4.0), 0.05, None),
            branch(Band::Above(18.0), -0.05, None),
        ],
    },
    RuleGroup {
        cue: Cue::PolyStd,
        branches: &[
            branch(Band::Below(0.08), 0.05, Some("Smooth spectral envelope")),
            branch(Band::Above(0.35), -0.05, None),
        ],
    },
];

/// Result of folding the rule table over one record
#[derive(Debug, Clone, PartialEq)]
pub struct Scorecard {
    /// Sum of fired deltas before clamping
    pub raw_score: f64,
    /// `raw_score` clamped to [0, 1]
    pub ai_score: f64,
    /// Reasons of fired positive branches, in rule order
    pub reasons: Vec<&'static str>,
}

/// Classifier applies the heuristic rule table to a FeatureRecord
///
/// Stateless apart from its configuration, so one instance can classify
/// records from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Fold every rule group over the record
    pub fn score(&self, features: &FeatureRecord) -> Scorecard {
        let mut raw_score = 0.0f64;
        let mut reasons = Vec::new();

        for group in RULES {
            if let Some(branch) = group.evaluate(features) {
                raw_score += branch.delta;
                if branch.delta > 0.0 {
                    if let Some(reason) = branch.reason {
                        reasons.push(reason);
                    }
                }
            }
        }

        // Deltas are hundredths; snap away accumulated binary error
        let raw_score = round2(raw_score);

        Scorecard {
            raw_score,
            ai_score: raw_score.clamp(0.0, 1.0),
            reasons,
        }
    }

    /// Classify a FeatureRecord
    ///
    /// # Returns
    /// Decision with label, confidence (2 dp) and explanation
    pub fn classify(&self, features: &FeatureRecord) -> Decision {
        let scorecard = self.score(features);
        let ai_score = scorecard.ai_score;

        let label = if ai_score >= self.config.ai_threshold {
            Label::AiGenerated
        } else {
            Label::Human
        };

        let (confidence, reasons, explanation) = match label {
            Label::AiGenerated => {
                let reasons: Vec<String> = scorecard
                    .reasons
                    .iter()
                    .take(self.config.max_reasons)
                    .map(|r| r.to_string())
                    .collect();
                let explanation = if reasons.is_empty() {
                    AI_FALLBACK_EXPLANATION.to_string()
                } else {
                    reasons.join(&self.config.separator)
                };
                (ai_confidence(ai_score), reasons, explanation)
            }
            Label::Human => (
                human_confidence(ai_score),
                Vec::new(),
                HUMAN_FALLBACK_EXPLANATION.to_string(),
            ),
        };

        log::debug!(
            "[Classifier] raw_score={:.2} ai_score={:.2} -> {} ({:.2})",
            scorecard.raw_score,
            ai_score,
            label,
            confidence
        );

        Decision {
            label,
            confidence,
            ai_score,
            reasons,
            explanation,
        }
    }
}

/// Confidence of an AI_GENERATED label, in [0.55, 0.95]
pub fn ai_confidence(ai_score: f64) -> f64 {
    let confidence = if ai_score >= 0.65 {
        0.75 + (ai_score - 0.65) * 0.57
    } else if ai_score >= 0.50 {
        0.65 + (ai_score - 0.50) * 0.67
    } else {
        0.55 + (ai_score - 0.35) * 0.67
    };
    round2(confidence.clamp(0.55, 0.95))
}

/// Confidence of a HUMAN label, in [0.60, 0.95]
///
/// A score of exactly 0 means no rule pushed either way and maps to 0.80.
pub fn human_confidence(ai_score: f64) -> f64 {
    if ai_score <= 0.0 {
        return 0.80;
    }

    let human_score = 1.0 - ai_score;
    let confidence = if human_score >= 0.75 {
        0.80 + (human_score - 0.75) * 0.60
    } else if human_score >= 0.60 {
        0.70 + (human_score - 0.60) * 0.67
    } else {
        0.60 + (human_score - 0.50) * 0.67
    };
    round2(confidence.clamp(0.60, 0.95))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
