// Error types for the voice detector
//
// This module defines custom error types for analysis and input handling,
// providing structured error handling with numeric codes that the CLI and
// any host service can surface unchanged.

mod analysis;
mod input;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use input::{log_input_error, InputError, InputErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error reporting across
/// the library boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
