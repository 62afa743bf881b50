// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 2001-2004
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// PCM buffer contained no samples
    pub const INSUFFICIENT_AUDIO: i32 = 2001;

    /// PCM buffer contained NaN or infinite samples
    pub const NON_FINITE_SAMPLES: i32 = 2002;

    /// Sample rate differs from the rate the frame constants were built for
    pub const SAMPLE_RATE_MISMATCH: i32 = 2003;

    /// Analysis configuration is internally inconsistent
    pub const INVALID_CONFIG: i32 = 2004;
}

/// Log an analysis error with structured context
///
/// Emits the numeric code, the component and the message so failed calls
/// can be correlated in host service logs.
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=FeatureExtractor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors that abort a feature extraction call
///
/// Sub-feature failures never surface here; they are recovered inside the
/// extractor with documented fallbacks. Only input and contract problems
/// reach the caller.
///
/// Error code ranges: 2001-2004
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// PCM buffer is empty (nothing to analyze)
    InsufficientAudio { samples: usize },

    /// PCM buffer holds a NaN or infinite value at `index`
    NonFiniteSamples { index: usize },

    /// Caller supplied a sample rate that the frame grid was not built for
    SampleRateMismatch { expected: u32, actual: u32 },

    /// Frame/hop/pitch-range constants cannot produce a valid frame grid
    InvalidConfig { reason: String },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::InsufficientAudio { .. } => AnalysisErrorCodes::INSUFFICIENT_AUDIO,
            AnalysisError::NonFiniteSamples { .. } => AnalysisErrorCodes::NON_FINITE_SAMPLES,
            AnalysisError::SampleRateMismatch { .. } => AnalysisErrorCodes::SAMPLE_RATE_MISMATCH,
            AnalysisError::InvalidConfig { .. } => AnalysisErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::InsufficientAudio { samples } => {
                format!("Insufficient audio: got {} samples", samples)
            }
            AnalysisError::NonFiniteSamples { index } => {
                format!("Non-finite sample at index {}", index)
            }
            AnalysisError::SampleRateMismatch { expected, actual } => {
                format!(
                    "Sample rate mismatch: expected {} Hz, got {} Hz",
                    expected, actual
                )
            }
            AnalysisError::InvalidConfig { reason } => {
                format!("Invalid analysis configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AnalysisError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AnalysisError {}
