//! Print-and-rescan signal

use crate::classifier::{Classification, Zone};
use crate::error::RescanError;
use crate::metrics::MetricExtractor;
use crate::probe::DocumentProbe;
use crate::scoring::{score_images, DocumentScores, ScorePair};
use image::GrayImage;
use serde_json::json;
use shared_pdf::ImageFilter;
use shared_types::{SignalResult, Verdict};
use tracing::{debug, warn};

/// Result of the re-scan signal
#[derive(Debug, Clone)]
pub struct RescanOutcome {
    pub result: SignalResult,
    /// Averaged document scores, when any image could be scored
    pub scores: Option<ScorePair>,
    pub zone: Option<Zone>,
}

/// Third pipeline signal
pub struct RescanSignal {
    extractor: Box<dyn MetricExtractor>,
    filter: ImageFilter,
}

impl RescanSignal {
    pub fn new(extractor: Box<dyn MetricExtractor>, filter: ImageFilter) -> Self {
        Self { extractor, filter }
    }

    /// Score the document's images and classify the averages
    pub fn analyze(
        &self,
        probe: &dyn DocumentProbe,
    ) -> Result<(DocumentScores, Classification), RescanError> {
        let images: Vec<GrayImage> = probe
            .images(&self.filter)?
            .into_iter()
            .map(|raster| raster.gray)
            .collect();
        debug!("Scoring {} images", images.len());

        let scores = score_images(self.extractor.as_ref(), &images)?;
        let classification = Classification::from(scores.average);
        Ok((scores, classification))
    }

    pub fn evaluate(&self, probe: &dyn DocumentProbe) -> RescanOutcome {
        match self.analyze(probe) {
            Ok((scores, classification)) => {
                debug!(
                    "Rescan quality={:.2} artifact={:.2} zone={:?}",
                    scores.average.quality, scores.average.artifact, classification.zone
                );
                let evidence = json!({
                    "zone": classification.zone,
                    "rule": classification.rule,
                    "images": scores.per_image.len(),
                    "per_image": scores.per_image,
                });
                RescanOutcome {
                    result: SignalResult::new(classification.zone.verdict(), classification.message)
                        .with_evidence(evidence),
                    scores: Some(scores.average),
                    zone: Some(classification.zone),
                }
            }
            Err(e) => {
                warn!("Rescan signal inconclusive: {}", e);
                let message = match &e {
                    RescanError::NoQualifyingImages => e.to_string(),
                    RescanError::Extraction(_) => format!("Rescan analysis failed: {}", e),
                };
                RescanOutcome {
                    result: SignalResult::new(Verdict::Unknown, message),
                    scores: None,
                    zone: None,
                }
            }
        }
    }
}
