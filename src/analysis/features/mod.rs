// FeatureExtractor - acoustic feature extraction for synthetic speech detection
//
// This module turns a mono PCM buffer into a FeatureRecord describing pitch,
// spectral shape, cepstral envelope, harmonic content, rhythm and energy.
// All frame-based statistics share one centered frame grid, so every track
// describes the same time positions.
//
// Module organization:
// - types: Data structures (FeatureRecord, Summary, PitchStats)
// - fft: Frame grid and STFT magnitude spectrogram
// - spectral: Centroid, bandwidth, rolloff, contrast, envelope fit
// - temporal: Zero-crossing rate, RMS energy
// - cepstral: Mel filterbank, log-mel spectrogram, cepstral coefficients
// - chroma: Pitch-class energy and tonnetz projection
// - pitch: Fundamental frequency strategy chain
// - tempo: Onset envelope and tempo estimate
// - stats: Mean / standard deviation helpers
// - mod.rs: Coordinator (FeatureExtractor)
//
// Sub-feature failures never abort extraction: chroma falls back to zeros,
// tonnetz to zeros, pitch to the next strategy and finally to zeros.

mod cepstral;
mod chroma;
mod fft;
mod pitch;
mod spectral;
mod stats;
mod tempo;
mod temporal;
mod types;

use std::fmt;

pub use fft::{FftProcessor, FrameGrid, Spectrogram};
pub use pitch::{PeakPickingTracker, PitchContour, PitchInput, PitchStrategy, PitchTracker, YinTracker};
pub use types::{FeatureRecord, PitchStats, Summary, N_CHROMA, N_MFCC};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use cepstral::{CepstralFeatures, MelFilterbank};
use chroma::ChromaFeatures;
use spectral::SpectralFeatures;
use tempo::TempoEstimator;
use temporal::TemporalFeatures;

/// Recoverable failure of a single sub-feature
///
/// Never leaves the extractor: each one is logged and replaced by the
/// sub-feature's fallback value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureError {
    /// Nothing to analyze (no frames)
    Empty(&'static str),
    /// Computation produced NaN or infinity
    NonFinite(&'static str),
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureError::Empty(stage) => write!(f, "{}: no frames to analyze", stage),
            FeatureError::NonFinite(stage) => write!(f, "{}: non-finite values", stage),
        }
    }
}

impl std::error::Error for FeatureError {}

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Holds only immutable, pre-computed tables (windows, FFT plans, filter
/// banks), so one extractor can serve concurrent callers.
pub struct FeatureExtractor {
    config: AnalysisConfig,
    fft_processor: FftProcessor,
    spectral_features: SpectralFeatures,
    temporal_features: TemporalFeatures,
    mel_filterbank: MelFilterbank,
    cepstral_features: CepstralFeatures,
    chroma_features: ChromaFeatures,
    pitch_tracker: PitchTracker,
    tempo_estimator: TempoEstimator,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor for the given frame grid configuration
    ///
    /// # Errors
    /// `AnalysisError::InvalidConfig` if the configuration cannot host every
    /// sub-algorithm (see `AnalysisConfig::validate`).
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        let sample_rate = config.sample_rate;
        let frame_size = config.frame_size;

        Ok(Self {
            fft_processor: FftProcessor::new(frame_size),
            spectral_features: SpectralFeatures::new(sample_rate, frame_size)
                .with_rolloff_percent(config.rolloff_percent)
                .with_contrast(
                    config.contrast_fmin,
                    config.contrast_bands,
                    config.contrast_quantile,
                ),
            temporal_features: TemporalFeatures::new(),
            mel_filterbank: MelFilterbank::new(config.n_mels, frame_size, sample_rate),
            cepstral_features: CepstralFeatures::new(config.n_mels),
            chroma_features: ChromaFeatures::new(sample_rate, frame_size),
            pitch_tracker: PitchTracker::new(
                frame_size,
                sample_rate,
                config.pitch_fmin,
                config.pitch_fmax,
                config.yin_threshold,
            ),
            tempo_estimator: TempoEstimator::new(sample_rate, config.hop_size),
            config,
        })
    }

    /// Extract all features from a mono PCM buffer
    ///
    /// # Arguments
    /// * `samples` - Mono PCM samples
    /// * `sample_rate` - Must equal the configured sample rate
    ///
    /// # Errors
    /// * `InsufficientAudio` for an empty buffer
    /// * `NonFiniteSamples` if any sample is NaN or infinite
    /// * `SampleRateMismatch` if `sample_rate` differs from the configuration
    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<FeatureRecord, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::InsufficientAudio { samples: 0 });
        }
        if sample_rate != self.config.sample_rate {
            return Err(AnalysisError::SampleRateMismatch {
                expected: self.config.sample_rate,
                actual: sample_rate,
            });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(AnalysisError::NonFiniteSamples { index });
        }

        let grid = FrameGrid::new(samples, self.config.frame_size, self.config.hop_size);
        let spectrogram = self.fft_processor.spectrogram(&grid, sample_rate);
        let power = spectrogram.power();

        // Frequency-domain shape
        let n_frames = spectrogram.n_frames();
        let mut centroid = Vec::with_capacity(n_frames);
        let mut bandwidth = Vec::with_capacity(n_frames);
        let mut rolloff = Vec::with_capacity(n_frames);
        let mut contrast = Vec::with_capacity(n_frames * (self.config.contrast_bands + 1));
        let mut poly = Vec::with_capacity(n_frames * 2);

        for spectrum in spectrogram.frames() {
            let c = self.spectral_features.compute_centroid(spectrum);
            centroid.push(c);
            bandwidth.push(self.spectral_features.compute_bandwidth(spectrum, c));
            rolloff.push(self.spectral_features.compute_rolloff(spectrum));
            contrast.extend(self.spectral_features.compute_contrast(spectrum));
            poly.extend(self.spectral_features.compute_poly_fit(spectrum));
        }

        // Time-domain
        let zcr: Vec<f32> = grid
            .frames()
            .map(|frame| self.temporal_features.compute_zcr(frame))
            .collect();
        let rms: Vec<f32> = grid
            .frames()
            .map(|frame| self.temporal_features.compute_rms(frame))
            .collect();

        // Cepstral envelope
        let log_mel = self.mel_filterbank.log_mel_spectrogram(&power);
        let mfcc: Vec<[f32; N_MFCC]> = log_mel
            .iter()
            .map(|frame| self.cepstral_features.compute_mfcc(frame))
            .collect();
        let (mfcc_mean, mfcc_std) = stats::column_summaries(&mfcc);

        // Harmonic content
        let (chroma_mean, tonnetz) = self.harmonic_features(&power);

        // Pitch
        let pitch = self.pitch_tracker.track(&PitchInput {
            grid: &grid,
            spectrogram: &spectrogram,
            sample_rate,
        });

        // Rhythm
        let envelope = self.tempo_estimator.onset_envelope(&log_mel);
        let tempo = self.tempo_estimator.estimate(&envelope);

        let record = FeatureRecord {
            pitch,
            spectral_centroid: stats::summarize(&centroid),
            spectral_bandwidth: stats::summarize(&bandwidth),
            spectral_rolloff: stats::summarize(&rolloff),
            spectral_contrast: stats::summarize(&contrast),
            poly_features: stats::summarize(&poly),
            mfcc_mean,
            mfcc_std,
            chroma_mean,
            tonnetz,
            zero_crossing_rate: stats::summarize(&zcr),
            rms: stats::summarize(&rms),
            tempo,
        };

        log::debug!(
            "[Features] {} samples, {} frames: pitch_std={:.2} centroid_std={:.1} cepstral_smoothness={:.2} tempo={:.1}",
            samples.len(),
            n_frames,
            record.pitch.std,
            record.spectral_centroid.std,
            record.cepstral_smoothness(),
            record.tempo
        );

        Ok(record)
    }

    /// Chroma mean and tonnetz summary, zeroed when either step fails
    fn harmonic_features(&self, power: &[Vec<f32>]) -> ([f32; N_CHROMA], Summary) {
        let chromagram = match self.chroma_features.chromagram(power) {
            Ok(chromagram) => chromagram,
            Err(err) => {
                log::warn!("[Features] Chroma extraction failed: {}. Using zeros.", err);
                return ([0.0; N_CHROMA], Summary::default());
            }
        };

        let (chroma_mean, _) = stats::column_summaries(&chromagram);
        let tonnetz = chroma::tonnetz_summary(&chromagram).unwrap_or_else(|err| {
            log::warn!("[Features] Tonnetz extraction failed: {}. Using zeros.", err);
            Summary::default()
        });

        (chroma_mean, tonnetz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    /// Generate pure sine wave for testing
    fn generate_sine_wave(frequency: f32, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let t = i as f32 / SR as f32;
                0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(duration_samples: usize) -> Vec<f32> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..duration_samples)
            .map(|_| rng.gen_range(-0.5..0.5))
            .collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(AnalysisConfig::default()).expect("default config is valid")
    }

    fn assert_all_finite(record: &FeatureRecord) {
        for (name, value) in record.named_values() {
            assert!(value.is_finite(), "{} is not finite: {}", name, value);
        }
    }

    #[test]
    fn test_feature_extractor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FeatureExtractor>();
    }

    #[test]
    fn test_empty_buffer_is_insufficient_audio() {
        let result = extractor().extract(&[], SR);
        assert_eq!(result, Err(AnalysisError::InsufficientAudio { samples: 0 }));
    }

    #[test]
    fn test_sample_rate_mismatch_is_rejected() {
        let result = extractor().extract(&[0.1; 1000], 44100);
        assert!(matches!(
            result,
            Err(AnalysisError::SampleRateMismatch {
                expected: 22050,
                actual: 44100
            })
        ));
    }

    #[test]
    fn test_non_finite_samples_are_rejected() {
        let mut signal = generate_sine_wave(220.0, SR as usize);
        signal[100] = f32::NAN;
        assert_eq!(
            extractor().extract(&signal, SR),
            Err(AnalysisError::NonFiniteSamples { index: 100 })
        );
    }

    #[test]
    fn test_silence_degrades_to_zeros() {
        let record = extractor().extract(&vec![0.0; SR as usize], SR).unwrap();

        assert_eq!(record.pitch, PitchStats::default());
        assert_eq!(record.spectral_centroid, Summary::default());
        assert_eq!(record.zero_crossing_rate, Summary::default());
        assert_eq!(record.rms, Summary::default());
        assert_eq!(record.chroma_mean, [0.0; N_CHROMA]);
        assert_eq!(record.tonnetz, Summary::default());
        assert_eq!(record.mfcc_std, [0.0; N_MFCC]);
        assert_eq!(record.tempo, 0.0);
        assert_all_finite(&record);
    }

    #[test]
    fn test_sine_features() {
        let record = extractor()
            .extract(&generate_sine_wave(440.0, SR as usize), SR)
            .unwrap();

        assert!((record.pitch.mean - 440.0).abs() < 10.0, "pitch {}", record.pitch.mean);
        assert!(record.pitch.voiced_ratio > 0.8);
        assert!(
            record.spectral_centroid.mean < 1500.0,
            "centroid {}",
            record.spectral_centroid.mean
        );
        // A is the dominant pitch class
        let (dominant, _) = record
            .chroma_mean
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .unwrap();
        assert_eq!(dominant, 9);
        assert_all_finite(&record);
    }

    #[test]
    fn test_noise_vs_sine() {
        let extractor = extractor();
        let sine = extractor
            .extract(&generate_sine_wave(300.0, SR as usize), SR)
            .unwrap();
        let noise = extractor
            .extract(&generate_white_noise(SR as usize), SR)
            .unwrap();

        assert!(noise.zero_crossing_rate.mean > 0.3);
        assert!(sine.zero_crossing_rate.mean < 0.1);
        assert!(noise.spectral_centroid.mean > sine.spectral_centroid.mean);
        assert!(noise.spectral_bandwidth.mean > sine.spectral_bandwidth.mean);
    }

    #[test]
    fn test_std_and_range_fields_non_negative() {
        let record = extractor()
            .extract(&generate_white_noise(SR as usize / 2), SR)
            .unwrap();

        for summary in [
            record.spectral_centroid,
            record.spectral_bandwidth,
            record.spectral_rolloff,
            record.spectral_contrast,
            record.poly_features,
            record.tonnetz,
            record.zero_crossing_rate,
            record.rms,
        ] {
            assert!(summary.std >= 0.0);
        }
        assert!(record.pitch.std >= 0.0);
        assert!(record.pitch.range >= 0.0);
        assert!(record.mfcc_std.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn test_single_sample_buffer_is_handled() {
        let record = extractor().extract(&[0.25], SR).unwrap();
        assert_all_finite(&record);
    }

    #[test]
    fn test_harmonic_features_fall_back_to_zeros() {
        // No frames: chroma fails, so both chroma and tonnetz come back zeroed
        let (chroma_mean, tonnetz) = extractor().harmonic_features(&[]);
        assert_eq!(chroma_mean, [0.0; N_CHROMA]);
        assert_eq!(tonnetz, Summary::default());

        assert!(matches!(
            chroma::tonnetz_summary(&[]),
            Err(FeatureError::Empty("tonnetz"))
        ));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let extractor = extractor();
        let signal = generate_sine_wave(180.0, SR as usize);
        assert_eq!(
            extractor.extract(&signal, SR).unwrap(),
            extractor.extract(&signal, SR).unwrap()
        );
    }
}
