//! Interval classification of document scores
//!
//! A document whose averaged quality / artifact scores fall inside the core
//! bands is a re-scan; scores just outside them are suspect.

use crate::scoring::ScorePair;
use serde::Serialize;
use shared_types::Verdict;

pub const QUALITY_CORE: [f64; 2] = [25.0, 42.5];
pub const ARTIFACT_CORE: [f64; 2] = [65.0, 75.0];
pub const QUALITY_SUSPECT_CEILING: f64 = 56.0;
pub const ARTIFACT_SUSPECT_CEILING: f64 = 78.0;
/// Upper quality bound of the "near the core" rule
pub const QUALITY_NEAR_CEILING: f64 = 44.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Core,
    Suspect,
    None,
}

impl Zone {
    pub fn verdict(self) -> Verdict {
        match self {
            Zone::Core => Verdict::Falsified,
            Zone::Suspect => Verdict::Suspect,
            Zone::None => Verdict::Valid,
        }
    }
}

/// Which rule placed a score pair in its zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRule {
    Core,
    /// Artifacts in the core band, quality slightly above it
    QualitySlightlyHigh,
    /// Quality in the core band, artifacts slightly above it
    ArtifactsSlightlyHigh,
    /// Quality just past the core ceiling
    NearThreshold,
    OutsideZones,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub zone: Zone,
    pub rule: ZoneRule,
    pub message: String,
}

fn in_closed(value: f64, band: [f64; 2]) -> bool {
    band[0] <= value && value <= band[1]
}

pub fn classify(quality: f64, artifact: f64) -> Zone {
    classify_with_reason(quality, artifact).zone
}

/// Classify and explain. Rules are tried in order; the first match wins.
pub fn classify_with_reason(quality: f64, artifact: f64) -> Classification {
    let quality_core = in_closed(quality, QUALITY_CORE);
    let artifact_core = in_closed(artifact, ARTIFACT_CORE);

    let (zone, rule) = if quality_core && artifact_core {
        (Zone::Core, ZoneRule::Core)
    } else if artifact_core && QUALITY_CORE[1] < quality && quality < QUALITY_SUSPECT_CEILING {
        (Zone::Suspect, ZoneRule::QualitySlightlyHigh)
    } else if quality_core && ARTIFACT_CORE[1] < artifact && artifact <= ARTIFACT_SUSPECT_CEILING {
        (Zone::Suspect, ZoneRule::ArtifactsSlightlyHigh)
    } else if QUALITY_CORE[1] < quality && quality <= QUALITY_NEAR_CEILING && artifact_core {
        (Zone::Suspect, ZoneRule::NearThreshold)
    } else {
        (Zone::None, ZoneRule::OutsideZones)
    };

    let message = match rule {
        ZoneRule::Core => format!(
            "quality {:.1} in [{:.1}, {:.1}] and artifacts {:.1} in [{:.1}, {:.1}]: re-scan detected (document falsified)",
            quality, QUALITY_CORE[0], QUALITY_CORE[1], artifact, ARTIFACT_CORE[0], ARTIFACT_CORE[1]
        ),
        ZoneRule::QualitySlightlyHigh => {
            "artifacts within the core band and quality slightly high: suspected re-scan".to_string()
        }
        ZoneRule::ArtifactsSlightlyHigh => {
            "quality within the core band and artifacts slightly high: suspected re-scan".to_string()
        }
        ZoneRule::NearThreshold => "close to the re-scan thresholds: suspected re-scan".to_string(),
        ZoneRule::OutsideZones => format!(
            "quality {:.1} / artifacts {:.1} outside re-scan zones: document compliant",
            quality, artifact
        ),
    };

    Classification { zone, rule, message }
}

impl From<ScorePair> for Classification {
    fn from(scores: ScorePair) -> Self {
        classify_with_reason(scores.quality, scores.artifact)
    }
}
