//! Read access to the document under analysis
//!
//! Signals never touch the PDF directly; they go through [`DocumentProbe`],
//! which lets tests substitute in-memory documents.

use once_cell::unsync::OnceCell;
use shared_pdf::nature::byte_evidence;
use shared_pdf::{DocumentDates, ExtractionError, ImageFilter, MetadataFields, PdfDocument, RasterImage};
use shared_types::DocumentNature;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Collaborator interface the three signals consume
pub trait DocumentProbe {
    fn path(&self) -> &Path;

    /// Normalized authoring metadata
    fn metadata(&self) -> Result<MetadataFields, ExtractionError>;

    /// PDF and filesystem timestamps
    fn dates(&self) -> Result<DocumentDates, ExtractionError>;

    /// Embedded images passing `filter`, decoded to grayscale
    fn images(&self, filter: &ImageFilter) -> Result<Vec<RasterImage>, ExtractionError>;

    /// Scan vs. native guess, used when the nature is not fixed up front
    fn nature(&self) -> DocumentNature;
}

/// Probe over a PDF file, parsed with lopdf on first use
pub struct LopdfProbe {
    path: PathBuf,
    document: OnceCell<PdfDocument>,
}

impl LopdfProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: OnceCell::new(),
        }
    }

    fn document(&self) -> Result<&PdfDocument, ExtractionError> {
        self.document.get_or_try_init(|| {
            debug!("Parsing {}", self.path.display());
            PdfDocument::open(&self.path)
        })
    }

    /// Raw `/Info` entries (original key case)
    pub fn info(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        self.document()?.info()
    }
}

impl DocumentProbe for LopdfProbe {
    fn path(&self) -> &Path {
        &self.path
    }

    fn metadata(&self) -> Result<MetadataFields, ExtractionError> {
        self.document()?.metadata()
    }

    fn dates(&self) -> Result<DocumentDates, ExtractionError> {
        // Unreadable PDF dates leave the filesystem comparison available
        let info = self.info().unwrap_or_else(|e| {
            warn!("Could not read PDF dates, using filesystem times: {}", e);
            BTreeMap::new()
        });
        DocumentDates::read(&self.path, &info)
    }

    fn images(&self, filter: &ImageFilter) -> Result<Vec<RasterImage>, ExtractionError> {
        self.document()?.images(filter)
    }

    fn nature(&self) -> DocumentNature {
        let evidence = match self.document() {
            Ok(doc) => doc.nature_evidence(),
            Err(e) => {
                debug!("Nature from raw bytes ({})", e);
                match std::fs::read(&self.path) {
                    Ok(bytes) => byte_evidence(&bytes),
                    Err(e) => {
                        warn!("Cannot read {} for nature detection: {}", self.path.display(), e);
                        return DocumentNature::Scan;
                    }
                }
            }
        };
        let nature = evidence.nature();
        debug!(
            "Detected nature {} (text chars: {}, images: {})",
            nature, evidence.text_chars, evidence.image_count
        );
        nature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unparseable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4\nthis is not really a pdf").unwrap();
        let probe = LopdfProbe::new(file.path());

        assert!(matches!(probe.metadata(), Err(ExtractionError::Parse(_))));
        assert!(probe.images(&ImageFilter::default()).is_err());
        // Dates still come from the filesystem
        let dates = probe.dates().unwrap();
        assert!(dates.pdf_dates().is_none());
        assert!(dates.fs_modified > 0.0);
    }

    #[test]
    fn test_missing_file() {
        let probe = LopdfProbe::new("/nonexistent/transcript.pdf");
        assert!(matches!(probe.metadata(), Err(ExtractionError::Io(_))));
        assert!(probe.dates().is_err());
        assert_eq!(probe.nature(), DocumentNature::Scan);
    }
}
