// Request validation and response shape for a detection service
//
// A host service receives a language tag and an audio payload, rejects
// requests it cannot serve, and answers with a DetectionResponse. Network
// transport stays outside this crate; these are the pieces it needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::analysis::classifier::{Decision, Label};
use crate::audio::PcmBuffer;
use crate::config::InputConfig;
use crate::error::{ErrorCode, InputError};

/// Languages a detection request may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Tamil,
    English,
    Hindi,
    Malayalam,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Tamil,
        Language::English,
        Language::Hindi,
        Language::Malayalam,
        Language::Telugu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Tamil => "Tamil",
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Malayalam => "Malayalam",
            Language::Telugu => "Telugu",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = InputError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|language| language.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InputError::UnsupportedLanguage {
                language: s.to_string(),
            })
    }
}

/// Parse a language tag and check it against the configured list
pub fn validate_language(language: &str, config: &InputConfig) -> Result<Language, InputError> {
    let parsed: Language = language.parse()?;
    if !config.supported_languages.contains(&parsed) {
        return Err(InputError::UnsupportedLanguage {
            language: language.to_string(),
        });
    }
    Ok(parsed)
}

/// Reject audio outside the configured duration bounds
pub fn validate_duration(pcm: &PcmBuffer, config: &InputConfig) -> Result<(), InputError> {
    let duration_secs = pcm.duration_secs();
    if duration_secs < config.min_duration_secs {
        return Err(InputError::TooShort {
            duration_secs,
            min_secs: config.min_duration_secs,
        });
    }
    if duration_secs > config.max_duration_secs {
        return Err(InputError::TooLong {
            duration_secs,
            max_secs: config.max_duration_secs,
        });
    }
    Ok(())
}

/// Successful detection as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    pub status: String,
    pub language: Language,
    pub classification: Label,
    pub confidence_score: f64,
    pub explanation: String,
}

impl DetectionResponse {
    pub fn from_decision(language: Language, decision: &Decision) -> Self {
        Self {
            status: "success".to_string(),
            language,
            classification: decision.label,
            confidence_score: decision.confidence,
            explanation: decision.explanation.clone(),
        }
    }
}

/// Rejected or failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: i32,
    pub message: String,
}

impl ErrorResponse {
    pub fn from_error<E: ErrorCode>(err: &E) -> Self {
        Self {
            status: "error".to_string(),
            code: err.code(),
            message: err.message(),
        }
    }
}
