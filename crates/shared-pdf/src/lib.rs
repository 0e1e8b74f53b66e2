//! Shared PDF handling utilities
//!
//! This crate provides the read-only PDF access the forensic signals build
//! on: the info dictionary, creation / modification timestamps, embedded
//! raster images and a scan-vs-native guess.

pub mod dates;
pub mod error;
pub mod images;
pub mod metadata;
pub mod nature;

pub use dates::{parse_pdf_date, DocumentDates};
pub use error::ExtractionError;
pub use images::{extract_images, ImageFilter, RasterImage};
pub use metadata::{info_dictionary, MetadataFields};
pub use nature::{detect_nature, NatureEvidence};

use std::path::Path;

/// A parsed document together with its raw bytes
pub struct PdfDocument {
    bytes: Vec<u8>,
    doc: lopdf::Document,
}

impl PdfDocument {
    /// Read and parse a file from disk
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ExtractionError> {
        let doc = lopdf::Document::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn document(&self) -> &lopdf::Document {
        &self.doc
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    pub fn info(&self) -> Result<std::collections::BTreeMap<String, String>, ExtractionError> {
        info_dictionary(&self.doc)
    }

    pub fn metadata(&self) -> Result<MetadataFields, ExtractionError> {
        Ok(MetadataFields::from_info(&self.info()?))
    }

    pub fn images(&self, filter: &ImageFilter) -> Result<Vec<RasterImage>, ExtractionError> {
        extract_images(&self.doc, filter)
    }

    pub fn nature_evidence(&self) -> NatureEvidence {
        nature::structural_evidence(&self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_are_a_parse_error() {
        let result = PdfDocument::from_bytes(b"definitely not a pdf".to_vec());
        assert!(matches!(result, Err(ExtractionError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PdfDocument::open(Path::new("/nonexistent/file.pdf"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }
}
