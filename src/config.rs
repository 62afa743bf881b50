//! Configuration management for analysis and classification parameters
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling threshold and frame-grid experiments without recompilation.
//! Every section has working defaults, so a missing or broken config file
//! never stops the detector.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AnalysisError;
use crate::request::Language;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub classifier: ClassifierConfig,
    pub input: InputConfig,
}

/// Frame grid and DSP parameters shared by every feature extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate the frame constants are tuned for
    pub sample_rate: u32,
    /// Analysis frame length in samples (also the FFT size)
    pub frame_size: usize,
    /// Hop between consecutive frames in samples
    pub hop_size: usize,
    /// Number of mel bands feeding the cepstral transform
    pub n_mels: usize,
    /// Lowest fundamental frequency considered by pitch tracking (Hz)
    pub pitch_fmin: f32,
    /// Highest fundamental frequency considered by pitch tracking (Hz)
    pub pitch_fmax: f32,
    /// YIN absolute threshold on the cumulative mean normalized difference
    pub yin_threshold: f32,
    /// Fraction of summed spectral magnitude below the rolloff frequency
    pub rolloff_percent: f32,
    /// Lower edge of the first octave band for spectral contrast (Hz)
    pub contrast_fmin: f32,
    /// Number of octave bands for spectral contrast (one extra band below fmin)
    pub contrast_bands: usize,
    /// Fraction of each band used for peak/valley estimation
    pub contrast_quantile: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            frame_size: 2048,
            hop_size: 512,
            n_mels: 128,
            // C2 to C7
            pitch_fmin: 65.0,
            pitch_fmax: 2093.0,
            yin_threshold: 0.1,
            rolloff_percent: 0.85,
            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,
        }
    }
}

impl AnalysisConfig {
    /// Check that the frame grid can host every sub-algorithm
    ///
    /// A frame must span at least two periods of the lowest pitch so YIN can
    /// compare a full period against the next one.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let invalid = |reason: String| Err(AnalysisError::InvalidConfig { reason });

        if self.sample_rate == 0 {
            return invalid("sample_rate must be > 0".to_string());
        }
        if self.hop_size == 0 {
            return invalid("hop_size must be > 0".to_string());
        }
        if self.frame_size < 4 {
            return invalid(format!("frame_size {} too small", self.frame_size));
        }
        if self.n_mels == 0 {
            return invalid("n_mels must be > 0".to_string());
        }
        if !(self.pitch_fmin > 0.0 && self.pitch_fmin < self.pitch_fmax) {
            return invalid(format!(
                "pitch range [{}, {}] is empty",
                self.pitch_fmin, self.pitch_fmax
            ));
        }
        let max_period = (self.sample_rate as f32 / self.pitch_fmin).ceil() as usize;
        if self.frame_size < 2 * max_period {
            return invalid(format!(
                "frame_size {} shorter than two periods of {} Hz ({} samples)",
                self.frame_size,
                self.pitch_fmin,
                2 * max_period
            ));
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent <= 1.0) {
            return invalid(format!("rolloff_percent {} out of (0, 1]", self.rolloff_percent));
        }
        if !(self.contrast_quantile > 0.0 && self.contrast_quantile < 0.5) {
            return invalid(format!(
                "contrast_quantile {} out of (0, 0.5)",
                self.contrast_quantile
            ));
        }
        Ok(())
    }
}

/// Decision thresholds and explanation formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// aiScore at or above which a recording is labelled AI_GENERATED
    pub ai_threshold: f64,
    /// Maximum number of reasons joined into the explanation
    pub max_reasons: usize,
    /// Separator between joined reasons
    pub separator: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ai_threshold: 0.35,
            max_reasons: 3,
            separator: " | ".to_string(),
        }
    }
}

/// Bounds enforced on decoded audio before analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub min_duration_secs: f32,
    pub max_duration_secs: f32,
    pub supported_languages: Vec<Language>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 0.5,
            max_duration_secs: 60.0,
            supported_languages: Language::ALL.to_vec(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file is missing or
    /// not valid JSON (a warning is logged in both cases).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}
