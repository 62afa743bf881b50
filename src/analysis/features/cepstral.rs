// Cepstral module - mel filterbank and cepstral coefficients
//
// Power spectra are pooled into triangular mel bands with Slaney area
// normalization, converted to dB with an 80 dB dynamic range floor, then
// decorrelated with an orthonormal DCT-II. The first N_MFCC coefficients
// describe the spectral envelope (timbre) of each frame.
//
// References:
// - Slaney, M. (1998). Auditory Toolbox. Technical Report #1998-010
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric representations

use super::types::N_MFCC;

/// Floor applied before converting powers to dB
const AMIN: f32 = 1e-10;

/// Dynamic range kept below the loudest mel cell
const TOP_DB: f32 = 80.0;

/// Triangular mel filterbank over the non-negative FFT bins
pub struct MelFilterbank {
    /// n_mels rows of n_bins weights
    weights: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Build a filterbank spanning 0 Hz to Nyquist
    ///
    /// Filter edges are placed on the continuous bin frequency axis, so
    /// narrow low-frequency filters still receive weight from their
    /// neighbouring bins.
    pub fn new(n_mels: usize, fft_size: usize, sample_rate: u32) -> Self {
        let n_bins = fft_size / 2 + 1;
        let bin_hz = sample_rate as f32 / fft_size as f32;
        let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

        let hz_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let weights = (0..n_mels)
            .map(|m| {
                let (low, center, high) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
                let slaney_norm = 2.0 / (high - low);

                (0..n_bins)
                    .map(|k| {
                        let freq = k as f32 * bin_hz;
                        let rising = (freq - low) / (center - low);
                        let falling = (high - freq) / (high - center);
                        rising.min(falling).max(0.0) * slaney_norm
                    })
                    .collect()
            })
            .collect();

        Self { weights }
    }

    pub fn n_mels(&self) -> usize {
        self.weights.len()
    }

    /// Pool one power spectrum into mel bands
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|row| row.iter().zip(power.iter()).map(|(w, p)| w * p).sum())
            .collect()
    }

    /// Log-power mel spectrogram in dB, floored at `max − 80 dB`
    pub fn log_mel_spectrogram(&self, power_frames: &[Vec<f32>]) -> Vec<Vec<f32>> {
        let mut log_mel: Vec<Vec<f32>> = power_frames
            .iter()
            .map(|frame| {
                self.apply(frame)
                    .into_iter()
                    .map(|p| 10.0 * p.max(AMIN).log10())
                    .collect()
            })
            .collect();

        let max_db = log_mel
            .iter()
            .flatten()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        let floor = max_db - TOP_DB;

        for value in log_mel.iter_mut().flatten() {
            *value = value.max(floor);
        }

        log_mel
    }
}

/// HTK mel scale
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Orthonormal DCT-II producing the first N_MFCC cepstral coefficients
pub struct CepstralFeatures {
    /// N_MFCC rows of n_mels basis values
    basis: Vec<Vec<f32>>,
}

impl CepstralFeatures {
    pub fn new(n_mels: usize) -> Self {
        let n = n_mels as f32;
        let basis = (0..N_MFCC)
            .map(|k| {
                let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                (0..n_mels)
                    .map(|i| {
                        scale
                            * (std::f32::consts::PI / n * (i as f32 + 0.5) * k as f32).cos()
                    })
                    .collect()
            })
            .collect();

        Self { basis }
    }

    /// Cepstral coefficients of one log-mel frame
    pub fn compute_mfcc(&self, log_mel: &[f32]) -> [f32; N_MFCC] {
        let mut coefficients = [0.0; N_MFCC];
        for (c, row) in coefficients.iter_mut().zip(self.basis.iter()) {
            *c = row.iter().zip(log_mel.iter()).map(|(b, x)| b * x).sum();
        }
        coefficients
    }
}
