// Spectral module - Frequency-domain feature extraction
//
// This module computes per-frame spectral shape descriptors from magnitude
// spectra: centroid, bandwidth, rolloff, octave-band contrast and a
// first-order polynomial fit of the spectral envelope.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Jiang, D. et al. (2002). Music type classification by spectral contrast feature

/// Floor applied before converting powers to dB
const AMIN: f32 = 1e-10;

/// Spectral feature computation functions
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
    rolloff_percent: f32,
    contrast_fmin: f32,
    contrast_bands: usize,
    contrast_quantile: f32,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
            rolloff_percent: 0.85,
            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,
        }
    }

    pub fn with_rolloff_percent(mut self, percent: f32) -> Self {
        self.rolloff_percent = percent;
        self
    }

    pub fn with_contrast(mut self, fmin: f32, bands: usize, quantile: f32) -> Self {
        self.contrast_fmin = fmin;
        self.contrast_bands = bands;
        self.contrast_quantile = quantile;
        self
    }

    fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.fft_size as f32
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// # Returns
    /// Spectral centroid in Hz (0 for a silent frame)
    pub fn compute_centroid(&self, spectrum: &[f32]) -> f32 {
        let freq_bin_width = self.bin_width();

        let weighted_sum: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| i as f32 * freq_bin_width * mag)
            .sum();

        let magnitude_sum: f32 = spectrum.iter().sum();

        if magnitude_sum > 1e-10 {
            weighted_sum / magnitude_sum
        } else {
            0.0
        }
    }

    /// Compute spectral bandwidth (second-order spread around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ p_i × (f_i − centroid)²), p = |X| / Σ|X|
    ///
    /// # Returns
    /// Bandwidth in Hz (0 for a silent frame)
    pub fn compute_bandwidth(&self, spectrum: &[f32], centroid: f32) -> f32 {
        let magnitude_sum: f32 = spectrum.iter().sum();
        if magnitude_sum <= 1e-10 {
            return 0.0;
        }

        let freq_bin_width = self.bin_width();
        let spread: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| {
                let deviation = i as f32 * freq_bin_width - centroid;
                (mag / magnitude_sum) * deviation * deviation
            })
            .sum();

        spread.max(0.0).sqrt()
    }

    /// Compute spectral rolloff
    ///
    /// Finds the frequency below which `rolloff_percent` of the summed
    /// magnitude is contained.
    ///
    /// # Returns
    /// Rolloff frequency in Hz
    pub fn compute_rolloff(&self, spectrum: &[f32]) -> f32 {
        let total: f32 = spectrum.iter().sum();

        if total < 1e-10 {
            return 0.0;
        }

        let threshold = self.rolloff_percent * total;
        let freq_bin_width = self.bin_width();

        let mut cumulative = 0.0;
        for (i, &mag) in spectrum.iter().enumerate() {
            cumulative += mag;
            if cumulative >= threshold {
                return i as f32 * freq_bin_width;
            }
        }

        // Rounding left the threshold just out of reach: Nyquist
        (spectrum.len() - 1) as f32 * freq_bin_width
    }

    /// Compute octave-band spectral contrast
    ///
    /// Band 0 covers [0, fmin); band k covers [fmin·2^(k−1), fmin·2^k); the
    /// last band is open-ended up to Nyquist. In each band the magnitudes are
    /// sorted and the mean of the top and bottom `quantile` fraction gives the
    /// peak and valley. Contrast is the dB difference of their powers.
    ///
    /// # Returns
    /// One contrast value per band (`contrast_bands + 1` values)
    pub fn compute_contrast(&self, spectrum: &[f32]) -> Vec<f32> {
        let freq_bin_width = self.bin_width();
        let mut contrast = Vec::with_capacity(self.contrast_bands + 1);
        let mut sorted: Vec<f32> = Vec::new();

        for band in 0..=self.contrast_bands {
            let low = if band == 0 {
                0.0
            } else {
                self.contrast_fmin * 2f32.powi(band as i32 - 1)
            };
            let high = if band == self.contrast_bands {
                f32::INFINITY
            } else {
                self.contrast_fmin * 2f32.powi(band as i32)
            };

            sorted.clear();
            sorted.extend(spectrum.iter().enumerate().filter_map(|(i, &mag)| {
                let freq = i as f32 * freq_bin_width;
                (freq >= low && freq < high).then_some(mag)
            }));

            if sorted.is_empty() {
                contrast.push(0.0);
                continue;
            }

            sorted.sort_by(|a, b| a.total_cmp(b));
            let take = ((self.contrast_quantile * sorted.len() as f32).round() as usize).max(1);
            let valley = sorted[..take].iter().sum::<f32>() / take as f32;
            let peak = sorted[sorted.len() - take..].iter().sum::<f32>() / take as f32;

            contrast.push(power_db(peak) - power_db(valley));
        }

        contrast
    }

    /// Fit `|X(f)| ≈ slope·f̂ + intercept` by least squares
    ///
    /// `f̂` is the bin frequency normalized to [0, 1] (0 Hz to Nyquist), so
    /// both coefficients share the magnitude scale.
    ///
    /// # Returns
    /// `[slope, intercept]`
    pub fn compute_poly_fit(&self, spectrum: &[f32]) -> [f32; 2] {
        let n = spectrum.len();
        if n < 2 {
            return [0.0, spectrum.first().copied().unwrap_or(0.0)];
        }

        let denom_x = (n - 1) as f64;
        let xs = (0..n).map(|i| i as f64 / denom_x);
        let mean_x = 0.5;
        let mean_y = spectrum.iter().map(|&v| v as f64).sum::<f64>() / n as f64;

        let (mut sxy, mut sxx) = (0.0f64, 0.0f64);
        for (x, &y) in xs.zip(spectrum.iter()) {
            let dx = x - mean_x;
            sxy += dx * (y as f64 - mean_y);
            sxx += dx * dx;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;
        [slope as f32, intercept as f32]
    }
}

fn power_db(magnitude: f32) -> f32 {
    10.0 * (magnitude * magnitude).max(AMIN).log10()
}
