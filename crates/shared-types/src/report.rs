//! JSON report emitted for one analysed document

use crate::overall::OverallReport;
use crate::types::{DocumentNature, SignalResult, Verdict};
use serde::Serialize;

/// Complete forensic report for one document.
///
/// Sections for signals that never ran (because an earlier signal was
/// conclusive) are omitted from the output.
#[derive(Debug, Clone, Serialize)]
pub struct ForensicReport {
    pub document: DocumentInfo,
    pub revision: SectionReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SectionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Criteria>,
    pub overall: OverallReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub path: String,
    #[serde(rename = "type")]
    pub nature: DocumentNature,
}

/// One signal's verdict as written to the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub verdict: Verdict,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl SectionReport {
    pub fn from_signal(result: &SignalResult, include_evidence: bool) -> Self {
        Self {
            verdict: result.verdict(),
            message: result.message().to_string(),
            evidence: if include_evidence {
                result.evidence().cloned()
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criteria {
    pub rescan: RescanSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescanSection {
    pub verdict: Verdict,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<ScoreSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

/// Averaged rescan scores and the core bands they were judged against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub quality_avg: f64,
    pub artifact_avg: f64,
    pub quality_interval_core: [f64; 2],
    pub artifact_interval_core: [f64; 2],
}

impl ScoreSummary {
    /// Averages are rounded to one decimal place
    pub fn new(
        quality: f64,
        artifact: f64,
        quality_core: [f64; 2],
        artifact_core: [f64; 2],
    ) -> Self {
        Self {
            quality_avg: round_one_decimal(quality),
            artifact_avg: round_one_decimal(artifact),
            quality_interval_core: quality_core,
            artifact_interval_core: artifact_core,
        }
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
