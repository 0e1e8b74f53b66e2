//! PDF forgery detection engine
//!
//! This crate combines three forensic signals into one severity-ordered
//! verdict:
//! - Revision history (external `pdfresurrect`, with a timestamp fallback)
//! - Authoring-application blacklist over the document metadata
//! - Print-and-rescan detection from embedded image quality / artifacts
//!
//! [`Pipeline`] runs them in that order and stops at the first conclusive
//! negative finding.

pub mod classifier;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod scoring;
pub mod signals;

pub use classifier::{classify, classify_with_reason, Classification, Zone, ZoneRule};
pub use config::{Config, NatureMode};
pub use error::{RescanError, RevisionError};
pub use metrics::{MetricExtractor, NativeMetrics};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineState};
pub use probe::{DocumentProbe, LopdfProbe};
pub use scoring::{ImageMeasurement, ScorePair};

use std::path::Path;

/// Analyse one PDF file with the default collaborators
pub fn analyze_file(path: &Path, config: &Config, include_evidence: bool) -> PipelineOutcome {
    let probe = LopdfProbe::new(path);
    Pipeline::from_config(config)
        .with_evidence(include_evidence)
        .run(&probe)
}
