// Types module - Data structures for audio features
//
// This module defines the feature record produced by the extractor and
// consumed by the classifier.

use serde::{Deserialize, Serialize};

/// Number of cepstral coefficients per frame
pub const N_MFCC: usize = 13;

/// Number of pitch classes in a chroma vector
pub const N_CHROMA: usize = 12;

/// Mean and (population) standard deviation of a per-frame track
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f32,
    pub std: f32,
}

/// Fundamental frequency statistics over voiced frames only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchStats {
    /// Mean f0 in Hz
    pub mean: f32,
    /// Standard deviation of f0 in Hz
    pub std: f32,
    /// max(f0) - min(f0) in Hz
    pub range: f32,
    /// Voiced frames / total frames (0.0 to 1.0)
    pub voiced_ratio: f32,
}

/// Features extracted from a whole recording
///
/// Every field is always present. A feature that could not be measured
/// (silence, degenerate input, failed sub-extractor) is 0 rather than absent;
/// the classifier treats a value of 0 as "no information".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub pitch: PitchStats,

    /// Spectral centroid in Hz (brightness)
    pub spectral_centroid: Summary,
    /// Spectral bandwidth in Hz (spread around the centroid)
    pub spectral_bandwidth: Summary,
    /// Spectral rolloff in Hz
    pub spectral_rolloff: Summary,
    /// Spectral contrast in dB, over all octave bands
    pub spectral_contrast: Summary,
    /// First-order spectral envelope fit, over both coefficients
    pub poly_features: Summary,

    /// Per-coefficient cepstral mean
    pub mfcc_mean: [f32; N_MFCC],
    /// Per-coefficient cepstral standard deviation
    pub mfcc_std: [f32; N_MFCC],

    /// Mean normalized energy per pitch class (C, C#, ..., B)
    pub chroma_mean: [f32; N_CHROMA],
    /// 6-D harmonic network projection, over all dimensions
    pub tonnetz: Summary,

    /// Zero-crossing rate (0.0 to 1.0)
    pub zero_crossing_rate: Summary,
    /// Root-mean-square frame energy
    pub rms: Summary,
    /// Tempo estimate in beats per minute
    pub tempo: f32,
}

impl FeatureRecord {
    /// Mean of the per-coefficient cepstral deviations
    ///
    /// Low values mean the timbre barely moves from frame to frame.
    pub fn cepstral_smoothness(&self) -> f32 {
        self.mfcc_std.iter().sum::<f32>() / N_MFCC as f32
    }

    /// Flat name -> scalar view of the record
    ///
    /// Vector features expand to one entry per element (`mfcc_mean_0`, ...).
    pub fn named_values(&self) -> Vec<(String, f32)> {
        let mut values: Vec<(String, f32)> = Vec::with_capacity(64);
        let mut push = |name: &str, value: f32| values.push((name.to_string(), value));

        push("pitch_mean", self.pitch.mean);
        push("pitch_std", self.pitch.std);
        push("pitch_range", self.pitch.range);
        push("voiced_ratio", self.pitch.voiced_ratio);

        for (name, summary) in [
            ("spectral_centroid", self.spectral_centroid),
            ("spectral_bandwidth", self.spectral_bandwidth),
            ("spectral_rolloff", self.spectral_rolloff),
            ("spectral_contrast", self.spectral_contrast),
            ("poly_features", self.poly_features),
            ("tonnetz", self.tonnetz),
            ("zcr", self.zero_crossing_rate),
            ("rms", self.rms),
        ] {
            push(&format!("{}_mean", name), summary.mean);
            push(&format!("{}_std", name), summary.std);
        }

        for (i, v) in self.mfcc_mean.iter().enumerate() {
            push(&format!("mfcc_mean_{}", i), *v);
        }
        for (i, v) in self.mfcc_std.iter().enumerate() {
            push(&format!("mfcc_std_{}", i), *v);
        }
        for (i, v) in self.chroma_mean.iter().enumerate() {
            push(&format!("chroma_mean_{}", i), *v);
        }

        push("tempo", self.tempo);
        values
    }
}
