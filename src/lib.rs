// Voice Detector Core - synthetic speech detection from acoustic features
//
// Pipeline: mono PCM → FeatureExtractor → FeatureRecord → Classifier → Decision.
// Both stages are deterministic and stateless; a host service validates the
// request (language, duration), decodes audio and serializes the Decision.

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod request;

// Re-exports for convenience
pub use analysis::classifier::{Classifier, Decision, Label};
pub use analysis::features::{FeatureExtractor, FeatureRecord};
pub use analysis::{analyze, classify, extract, Analyzer};
pub use audio::PcmBuffer;
pub use config::AppConfig;
pub use error::{AnalysisError, ErrorCode, InputError};
pub use request::{DetectionResponse, Language};

use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`)
///
/// Library code logs through the `log` facade; the subscriber picks those
/// records up as well. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
