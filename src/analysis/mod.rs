// Analysis module - feature extraction and heuristic classification pipeline
//
// Data flows one way and holds no state between calls:
//
//   PCM samples → FeatureExtractor → FeatureRecord → Classifier → Decision
//
// Both stages are immutable after construction, so an `Analyzer` can be
// shared across worker threads (one request per call).

pub mod classifier;
pub mod features;

use classifier::{Classifier, Decision};
use features::{FeatureExtractor, FeatureRecord};

use crate::config::AppConfig;
use crate::error::AnalysisError;

/// Extractor and classifier configured together
pub struct Analyzer {
    feature_extractor: FeatureExtractor,
    classifier: Classifier,
}

impl Analyzer {
    /// Build both stages from an application config
    ///
    /// # Errors
    /// `AnalysisError::InvalidConfig` if the analysis frame constants are
    /// inconsistent.
    pub fn new(config: &AppConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            feature_extractor: FeatureExtractor::new(config.analysis.clone())?,
            classifier: Classifier::new(config.classifier.clone()),
        })
    }

    pub fn extract(&self, samples: &[f32], sample_rate: u32) -> Result<FeatureRecord, AnalysisError> {
        self.feature_extractor.extract(samples, sample_rate)
    }

    pub fn classify(&self, features: &FeatureRecord) -> Decision {
        self.classifier.classify(features)
    }

    /// Extract features and classify them
    pub fn analyze(&self, samples: &[f32], sample_rate: u32) -> Result<Decision, AnalysisError> {
        let features = self.extract(samples, sample_rate)?;
        let decision = self.classify(&features);

        log::info!(
            "[Analysis] {} samples -> {} (confidence {:.2}, ai_score {:.2})",
            samples.len(),
            decision.label,
            decision.confidence,
            decision.ai_score
        );

        Ok(decision)
    }
}

/// Extract features with the default configuration
pub fn extract(samples: &[f32], sample_rate: u32) -> Result<FeatureRecord, AnalysisError> {
    Analyzer::new(&AppConfig::default())?.extract(samples, sample_rate)
}

/// Classify a FeatureRecord with the default rule thresholds
pub fn classify(features: &FeatureRecord) -> Decision {
    Classifier::default().classify(features)
}

/// Extract then classify with the default configuration
pub fn analyze(samples: &[f32], sample_rate: u32) -> Result<Decision, AnalysisError> {
    Analyzer::new(&AppConfig::default())?.analyze(samples, sample_rate)
}
