// Input error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Input error code constants
///
/// Error code range: 3001-3006
pub struct InputErrorCodes {}

impl InputErrorCodes {
    /// Requested language is not in the supported list
    pub const UNSUPPORTED_LANGUAGE: i32 = 3001;

    /// Decoded audio is shorter than the minimum duration
    pub const TOO_SHORT: i32 = 3002;

    /// Decoded audio is longer than the maximum duration
    pub const TOO_LONG: i32 = 3003;

    /// Audio container could not be read
    pub const DECODE_FAILED: i32 = 3004;

    /// Audio container uses a layout this crate cannot convert
    pub const UNSUPPORTED_FORMAT: i32 = 3005;

    /// Sample-rate conversion to the analysis rate failed
    pub const RESAMPLE_FAILED: i32 = 3006;
}

/// Log an input error with structured context
pub fn log_input_error(err: &InputError, context: &str) {
    error!(
        "Input error in {}: code={}, component=InputValidation, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised before audio reaches the analysis pipeline
///
/// These are validation errors in the sense of the service contract: the
/// request is rejected, nothing is analyzed.
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// Language not in the supported list
    UnsupportedLanguage { language: String },

    /// Audio shorter than the configured minimum
    TooShort { duration_secs: f32, min_secs: f32 },

    /// Audio longer than the configured maximum
    TooLong { duration_secs: f32, max_secs: f32 },

    /// Container could not be opened or a sample could not be read
    Decode { reason: String },

    /// Bit depth or channel layout not supported
    UnsupportedFormat { reason: String },

    /// Resampler could not be built or rejected the input
    Resample { reason: String },
}

impl ErrorCode for InputError {
    fn code(&self) -> i32 {
        match self {
            InputError::UnsupportedLanguage { .. } => InputErrorCodes::UNSUPPORTED_LANGUAGE,
            InputError::TooShort { .. } => InputErrorCodes::TOO_SHORT,
            InputError::TooLong { .. } => InputErrorCodes::TOO_LONG,
            InputError::Decode { .. } => InputErrorCodes::DECODE_FAILED,
            InputError::UnsupportedFormat { .. } => InputErrorCodes::UNSUPPORTED_FORMAT,
            InputError::Resample { .. } => InputErrorCodes::RESAMPLE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            InputError::UnsupportedLanguage { language } => {
                format!("Unsupported language: {}", language)
            }
            InputError::TooShort {
                duration_secs,
                min_secs,
            } => format!(
                "Audio too short: {:.2}s (minimum {:.2}s)",
                duration_secs, min_secs
            ),
            InputError::TooLong {
                duration_secs,
                max_secs,
            } => format!(
                "Audio too long: {:.2}s (maximum {:.2}s)",
                duration_secs, max_secs
            ),
            InputError::Decode { reason } => format!("Failed to decode audio: {}", reason),
            InputError::UnsupportedFormat { reason } => {
                format!("Unsupported audio format: {}", reason)
            }
            InputError::Resample { reason } => format!("Failed to resample audio: {}", reason),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for InputError {}

impl From<hound::Error> for InputError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::Unsupported => InputError::UnsupportedFormat {
                reason: "unsupported WAV encoding".to_string(),
            },
            other => InputError::Decode {
                reason: other.to_string(),
            },
        }
    }
}
