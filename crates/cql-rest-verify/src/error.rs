//! Error types for the verification library.

use thiserror::Error;

/// Main error type for verification operations.
///
/// Value mismatches are not errors: the comparator reports them as a
/// [`ComparisonOutcome`](crate::verify::ComparisonOutcome). These variants
/// cover caller contract violations and the file plumbing around the core.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// A value or type tag outside the accepted input space.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error (invalid YAML, bad rule, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Captured fixture could not be interpreted
    #[error("Fixture error in {path}: {message}")]
    Fixture { path: String, message: String },

    /// Verification finished and found differing rows
    #[error("Verification found {0} difference(s)")]
    Differences(usize),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerifyError {
    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        VerifyError::InvalidInput(message.into())
    }

    /// Create a Fixture error for the given file.
    pub fn fixture(path: impl Into<String>, message: impl Into<String>) -> Self {
        VerifyError::Fixture {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            VerifyError::Differences(_) => 2,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
