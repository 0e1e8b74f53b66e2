//! Severity-ordered verification pipeline
//!
//! Runs Revision -> Metadata -> Rescan, feeding every result into one
//! [`OverallReport`] and stopping early on conclusive findings:
//!
//! - revision `falsified`
//! - metadata `falsified` or `invalid`
//! - rescan zone `core`

use crate::classifier::{Zone, ARTIFACT_CORE, QUALITY_CORE};
use crate::config::{Config, NatureMode};
use crate::metrics::{MetricExtractor, NativeMetrics};
use crate::probe::DocumentProbe;
use crate::signals::{MetadataSignal, PdfResurrect, RescanSignal, RevisionInspector, RevisionSignal};
use serde::Serialize;
use shared_types::{
    Criteria, DocumentInfo, DocumentNature, ForensicReport, OverallReport, RescanSection, ScoreSummary,
    SectionReport, SignalResult, Verdict,
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Running,
    ShortCircuited,
    Completed,
}

/// Final report plus the state the run ended in
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: ForensicReport,
    pub state: PipelineState,
}

pub struct Pipeline {
    revision: RevisionSignal,
    rescan: RescanSignal,
    nature: NatureMode,
    include_evidence: bool,
}

impl Pipeline {
    pub fn new(revision: RevisionSignal, rescan: RescanSignal) -> Self {
        Self {
            revision,
            rescan,
            nature: NatureMode::default(),
            include_evidence: false,
        }
    }

    /// Pipeline with the external revision tool and native image metrics
    pub fn from_config(config: &Config) -> Self {
        let inspector = PdfResurrect::new(config.revision.tool.clone(), config.revision.timeout());
        Self::with_collaborators(config, Box::new(inspector), Box::new(NativeMetrics))
    }

    /// Pipeline over caller-supplied collaborators, configured from `config`
    pub fn with_collaborators(
        config: &Config,
        inspector: Box<dyn RevisionInspector>,
        extractor: Box<dyn MetricExtractor>,
    ) -> Self {
        let revision = RevisionSignal::new(inspector, config.revision.timestamp_tolerance_secs);
        let rescan = RescanSignal::new(extractor, config.rescan.image_filter());
        Self::new(revision, rescan).with_nature(config.document.nature)
    }

    pub fn with_nature(mut self, nature: NatureMode) -> Self {
        self.nature = nature;
        self
    }

    /// Attach each signal's evidence object to its report section
    pub fn with_evidence(mut self, include: bool) -> Self {
        self.include_evidence = include;
        self
    }

    pub fn run(&self, probe: &dyn DocumentProbe) -> PipelineOutcome {
        let nature = self.nature.fixed().unwrap_or_else(|| probe.nature());
        let mut run = Run::new(probe.path().display().to_string(), nature);
        info!("Analysing {} as {}", probe.path().display(), nature);

        // 1. Revision history
        let revision = self.revision.evaluate(probe);
        run.record("revision", &revision);
        let mut report = run.report(SectionReport::from_signal(&revision, self.include_evidence));
        if revision.verdict() == Verdict::Falsified {
            return run.short_circuit(report, "revision");
        }

        // 2. Authoring metadata
        let metadata = MetadataSignal::new(nature).evaluate(probe);
        run.record("metadata", &metadata);
        report.metadata = Some(SectionReport::from_signal(&metadata, self.include_evidence));
        if matches!(metadata.verdict(), Verdict::Falsified | Verdict::Invalid) {
            return run.short_circuit(report, "metadata");
        }

        // 3. Print-and-rescan scoring
        let rescan = self.rescan.evaluate(probe);
        run.record("rescan", &rescan.result);
        report.criteria = Some(Criteria {
            rescan: RescanSection {
                verdict: rescan.result.verdict(),
                message: rescan.result.message().to_string(),
                scores: rescan
                    .scores
                    .map(|s| ScoreSummary::new(s.quality, s.artifact, QUALITY_CORE, ARTIFACT_CORE)),
                evidence: if self.include_evidence {
                    rescan.result.evidence().cloned()
                } else {
                    None
                },
            },
        });
        if rescan.zone == Some(Zone::Core) {
            return run.short_circuit(report, "rescan");
        }

        run.complete(report)
    }
}

/// Per-document state: the running overall verdict and pipeline state
struct Run {
    document: DocumentInfo,
    overall: OverallReport,
    state: PipelineState,
}

impl Run {
    fn new(path: String, nature: DocumentNature) -> Self {
        Self {
            document: DocumentInfo { path, nature },
            overall: OverallReport::new(),
            state: PipelineState::Running,
        }
    }

    fn record(&mut self, signal: &str, result: &SignalResult) {
        info!("{} signal: {} ({})", signal, result.verdict(), result.message());
        self.overall.submit(result.verdict(), result.message());
    }

    fn report(&self, revision: SectionReport) -> ForensicReport {
        ForensicReport {
            document: self.document.clone(),
            revision,
            metadata: None,
            criteria: None,
            overall: OverallReport::new(),
        }
    }

    fn finish(mut self, mut report: ForensicReport, state: PipelineState) -> PipelineOutcome {
        self.state = state;
        report.overall = self.overall;
        info!("Pipeline {:?}: overall {}", self.state, report.overall.verdict());
        PipelineOutcome {
            report,
            state: self.state,
        }
    }

    fn short_circuit(self, report: ForensicReport, after: &str) -> PipelineOutcome {
        info!("Conclusive {} result, skipping remaining signals", after);
        self.finish(report, PipelineState::ShortCircuited)
    }

    fn complete(self, report: ForensicReport) -> PipelineOutcome {
        self.finish(report, PipelineState::Completed)
    }
}
