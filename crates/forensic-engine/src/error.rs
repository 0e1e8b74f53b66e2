use shared_pdf::ExtractionError;
use std::time::Duration;
use thiserror::Error;

/// Errors from the external revision-history tool
#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("Revision tool '{0}' not found")]
    ToolUnavailable(String),

    #[error("Revision tool timed out after {0:?}")]
    Timeout(Duration),

    #[error("Revision tool failed: {0}")]
    ToolFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RevisionError {
    /// Conditions that switch the signal to its date-comparison fallback
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            RevisionError::ToolUnavailable(_) | RevisionError::Timeout(_)
        )
    }
}

/// Errors from the re-scan scoring path
#[derive(Error, Debug)]
pub enum RescanError {
    #[error("No qualifying images found in the document")]
    NoQualifyingImages,

    #[error("Image extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}
