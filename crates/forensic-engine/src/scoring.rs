//! Quality / artifact scoring of embedded images
//!
//! Each image's raw measurements are turned into two bounded scores. Every
//! term is capped at its share before the terms are summed, so neither score
//! can leave `[0, 100]` whatever the measurements are.

use crate::error::RescanError;
use crate::metrics::MetricExtractor;
use image::GrayImage;
use serde::Serialize;

/// Raw measurements of one image
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ImageMeasurement {
    pub sharpness: f64,
    pub entropy: f64,
    pub contrast: f64,
    pub noise: f64,
    /// Mean gradient magnitude; measured but not part of either score
    pub gradient: f64,
    pub high_frequency: f64,
    pub halftone: f64,
    pub edge_irregularity: f64,
    pub compression_variance: f64,
    pub grid_density: f64,
}

impl ImageMeasurement {
    /// Replace NaN, infinite and negative fields by zero
    pub fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            sharpness: clean(self.sharpness),
            entropy: clean(self.entropy),
            contrast: clean(self.contrast),
            noise: clean(self.noise),
            gradient: clean(self.gradient),
            high_frequency: clean(self.high_frequency),
            halftone: clean(self.halftone),
            edge_irregularity: clean(self.edge_irregularity),
            compression_variance: clean(self.compression_variance),
            grid_density: clean(self.grid_density),
        }
    }

    pub fn quality_score(&self) -> f64 {
        let m = self.sanitized();
        25.0 * (m.sharpness / 1000.0).min(1.0)
            + 20.0 * (m.entropy / 8.0).min(1.0)
            + 20.0 * (m.contrast / 100.0).min(1.0)
            + 20.0 * (1.0 - m.noise / 50.0).max(0.0)
            + 15.0 * (m.high_frequency / 1000.0).min(1.0)
    }

    pub fn artifact_score(&self) -> f64 {
        let m = self.sanitized();
        30.0 * (m.halftone / 10.0).min(1.0)
            + 25.0 * m.edge_irregularity.min(1.0)
            + 25.0 * (m.compression_variance / 5.0).min(1.0)
            + 20.0 * (m.grid_density * 1000.0).min(1.0)
    }

    pub fn scores(&self) -> ScorePair {
        ScorePair {
            quality: self.quality_score(),
            artifact: self.artifact_score(),
        }
    }
}

/// Quality and artifact scores, each in `[0, 100]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScorePair {
    pub quality: f64,
    pub artifact: f64,
}

impl ScorePair {
    /// Arithmetic mean of per-image scores
    pub fn average(pairs: &[ScorePair]) -> Result<ScorePair, RescanError> {
        if pairs.is_empty() {
            return Err(RescanError::NoQualifyingImages);
        }
        let n = pairs.len() as f64;
        Ok(ScorePair {
            quality: pairs.iter().map(|p| p.quality).sum::<f64>() / n,
            artifact: pairs.iter().map(|p| p.artifact).sum::<f64>() / n,
        })
    }
}

/// Per-document scoring result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentScores {
    pub average: ScorePair,
    pub per_image: Vec<ScorePair>,
}

/// Measure and score every image, then average over the document
pub fn score_images(
    extractor: &dyn MetricExtractor,
    images: &[GrayImage],
) -> Result<DocumentScores, RescanError> {
    let per_image: Vec<ScorePair> = images
        .iter()
        .map(|img| extractor.measure(img).scores())
        .collect();
    Ok(DocumentScores {
        average: ScorePair::average(&per_image)?,
        per_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_measurement_scores() {
        let m = ImageMeasurement::default();
        // Only the noise term contributes when everything is zero
        assert_eq!(m.quality_score(), 20.0);
        assert_eq!(m.artifact_score(), 0.0);
    }

    #[test]
    fn test_saturated_measurement_scores() {
        let m = ImageMeasurement {
            sharpness: 5000.0,
            entropy: 8.0,
            contrast: 300.0,
            noise: 0.0,
            gradient: 12.0,
            high_frequency: 2000.0,
            halftone: 50.0,
            edge_irregularity: 3.0,
            compression_variance: 10.0,
            grid_density: 0.5,
        };
        assert_eq!(m.quality_score(), 100.0);
        assert_eq!(m.artifact_score(), 100.0);
    }

    #[test]
    fn test_partial_terms() {
        let m = ImageMeasurement {
            sharpness: 500.0,
            entropy: 4.0,
            contrast: 50.0,
            noise: 25.0,
            high_frequency: 500.0,
            halftone: 5.0,
            edge_irregularity: 0.5,
            compression_variance: 2.5,
            grid_density: 0.0005,
            ..Default::default()
        };
        assert!((m.quality_score() - 50.0).abs() < 1e-9);
        assert!((m.artifact_score() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_inputs_are_sanitized() {
        let m = ImageMeasurement {
            sharpness: f64::NAN,
            entropy: f64::INFINITY,
            noise: -3.0,
            ..Default::default()
        };
        let clean = m.sanitized();
        assert_eq!(clean.sharpness, 0.0);
        assert_eq!(clean.entropy, 0.0);
        assert_eq!(clean.noise, 0.0);
        assert_eq!(m.quality_score(), 20.0);
    }

    #[test]
    fn test_average_of_nothing_is_no_images() {
        assert!(matches!(
            ScorePair::average(&[]),
            Err(RescanError::NoQualifyingImages)
        ));
    }

    #[test]
    fn test_average() {
        let avg = ScorePair::average(&[
            ScorePair { quality: 20.0, artifact: 60.0 },
            ScorePair { quality: 40.0, artifact: 80.0 },
        ])
        .unwrap();
        assert_eq!(avg, ScorePair { quality: 30.0, artifact: 70.0 });
    }
}
