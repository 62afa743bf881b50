// Temporal module - Time-domain feature extraction
//
// This module computes features directly from time-domain frames: the
// zero-crossing rate and the root-mean-square energy.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Temporal feature computation functions
pub struct TemporalFeatures;

impl TemporalFeatures {
    pub fn new() -> Self {
        Self
    }

    /// Compute zero-crossing rate (ZCR)
    ///
    /// Formula: ZCR = (1 / (N − 1)) × Σ [sign(x[n]) ≠ sign(x[n−1])]
    ///
    /// High ZCR indicates high-frequency or noise-like content (fricatives),
    /// low ZCR indicates low-frequency or tonal content (vowels).
    ///
    /// # Returns
    /// Zero-crossing rate (0.0 to 1.0)
    pub fn compute_zcr(&self, audio: &[f32]) -> f32 {
        if audio.len() < 2 {
            return 0.0;
        }

        let crossings = audio
            .windows(2)
            .filter(|pair| (pair[1] >= 0.0) != (pair[0] >= 0.0))
            .count();

        crossings as f32 / (audio.len() - 1) as f32
    }

    /// Compute root-mean-square amplitude of a frame
    pub fn compute_rms(&self, audio: &[f32]) -> f32 {
        if audio.is_empty() {
            return 0.0;
        }

        let energy: f64 = audio.iter().map(|&x| (x as f64) * (x as f64)).sum();
        (energy / audio.len() as f64).sqrt() as f32
    }
}

impl Default for TemporalFeatures {
    fn default() -> Self {
        Self::new()
    }
}
