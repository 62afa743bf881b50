// Audio module - decoded PCM input for the analysis pipeline
//
// The analysis pipeline only ever sees mono f32 samples at a known rate.
// This module gets audio into that shape: WAV decoding with channel
// downmix, and band-limited resampling to the analysis rate.

pub mod resample;
pub mod wav;

pub use resample::resample;
pub use wav::{decode_wav, load_wav};

use crate::error::InputError;

/// Mono PCM samples at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (0 for a zero sample rate)
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Convert to `target_rate`, returning self unchanged if it already matches
    pub fn resampled(self, target_rate: u32) -> Result<Self, InputError> {
        if self.sample_rate == target_rate {
            return Ok(self);
        }

        log::debug!(
            "[Audio] Resampling {} samples {} Hz -> {} Hz",
            self.samples.len(),
            self.sample_rate,
            target_rate
        );
        Ok(Self {
            samples: resample(&self.samples, self.sample_rate, target_rate)?,
            sample_rate: target_rate,
        })
    }
}
