use thiserror::Error;

/// Failure while reading structure out of a PDF
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Malformed PDF object: {0}")]
    Malformed(String),

    #[error("Failed to decode image {object}: {reason}")]
    Decode { object: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for ExtractionError {
    fn from(e: lopdf::Error) -> Self {
        ExtractionError::Parse(e.to_string())
    }
}
