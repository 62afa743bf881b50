// Chroma module - pitch-class energy and harmonic network projection
//
// Each FFT bin's power is folded onto the nearest of the 12 equal-tempered
// pitch classes (octave independent) and every frame is normalized by its
// loudest class. The tonnetz maps L1-normalized chroma onto three circles
// (perfect fifths, minor thirds, major thirds) giving 6 coordinates.
//
// References:
// - Bartsch, M. & Wakefield, G. (2001). To catch a chorus
// - Harte, C. et al. (2006). Detecting harmonic change in musical audio

use super::types::{Summary, N_CHROMA};
use super::{stats, FeatureError};

/// Bins below C1 carry no usable pitch-class information
const CHROMA_FMIN: f32 = 32.70;

pub struct ChromaFeatures {
    /// Pitch class of each FFT bin, None below CHROMA_FMIN
    bin_classes: Vec<Option<usize>>,
}

impl ChromaFeatures {
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let bin_hz = sample_rate as f32 / fft_size as f32;
        let bin_classes = (0..fft_size / 2 + 1)
            .map(|k| {
                let freq = k as f32 * bin_hz;
                (freq >= CHROMA_FMIN).then(|| {
                    let midi = 69.0 + 12.0 * (freq / 440.0).log2();
                    (midi.round() as i64).rem_euclid(N_CHROMA as i64) as usize
                })
            })
            .collect();

        Self { bin_classes }
    }

    /// Max-normalized chroma of one power spectrum (all zeros for silence)
    pub fn compute_chroma(&self, power: &[f32]) -> [f32; N_CHROMA] {
        let mut chroma = [0.0f32; N_CHROMA];
        for (class, &p) in self.bin_classes.iter().zip(power.iter()) {
            if let Some(c) = class {
                chroma[*c] += p;
            }
        }

        let max = chroma.iter().copied().fold(0.0f32, f32::max);
        if max > 1e-10 {
            for value in chroma.iter_mut() {
                *value /= max;
            }
        } else {
            chroma = [0.0; N_CHROMA];
        }
        chroma
    }

    /// Chroma for every frame of a power spectrogram
    pub fn chromagram(&self, power_frames: &[Vec<f32>]) -> Result<Vec<[f32; N_CHROMA]>, FeatureError> {
        if power_frames.is_empty() {
            return Err(FeatureError::Empty("chroma"));
        }

        let chromagram: Vec<[f32; N_CHROMA]> = power_frames
            .iter()
            .map(|frame| self.compute_chroma(frame))
            .collect();

        if chromagram.iter().flatten().any(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite("chroma"));
        }
        Ok(chromagram)
    }
}

/// Project one chroma vector onto the 6-D tonal centroid space
pub fn tonnetz_frame(chroma: &[f32; N_CHROMA]) -> [f32; 6] {
    let total: f32 = chroma.iter().map(|v| v.abs()).sum();
    if total <= 1e-10 {
        return [0.0; 6];
    }

    use std::f32::consts::PI;
    // (radius, angle step per semitone) for fifths, minor thirds, major thirds
    const CIRCLES: [(f32, f32); 3] = [(1.0, 7.0 * PI / 6.0), (1.0, 3.0 * PI / 2.0), (0.5, 2.0 * PI / 3.0)];

    let mut centroid = [0.0f32; 6];
    for (pitch_class, &energy) in chroma.iter().enumerate() {
        let weight = energy / total;
        for (circle, &(radius, step)) in CIRCLES.iter().enumerate() {
            let angle = pitch_class as f32 * step;
            centroid[2 * circle] += weight * radius * angle.sin();
            centroid[2 * circle + 1] += weight * radius * angle.cos();
        }
    }
    centroid
}

/// Mean and std of the tonnetz over all frames and dimensions
pub fn tonnetz_summary(chromagram: &[[f32; N_CHROMA]]) -> Result<Summary, FeatureError> {
    if chromagram.is_empty() {
        return Err(FeatureError::Empty("tonnetz"));
    }

    let values: Vec<f32> = chromagram.iter().flat_map(tonnetz_frame).collect();
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FeatureError::NonFinite("tonnetz"));
    }
    Ok(stats::summarize(&values))
}
