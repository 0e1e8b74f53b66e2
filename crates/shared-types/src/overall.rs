//! Severity-ordered merge of signal verdicts
//!
//! [`OverallReport`] is the single place where the "never downgrade" rule
//! lives. Each run starts from [`OverallReport::new`] and feeds every signal
//! result through [`OverallReport::submit`].

use crate::types::Verdict;
use serde::Serialize;

/// Running verdict for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallReport {
    verdict: Verdict,
    reasons: Vec<String>,
}

impl Default for OverallReport {
    fn default() -> Self {
        Self::new()
    }
}

impl OverallReport {
    /// Fresh report: `valid` with no reasons
    pub fn new() -> Self {
        Self {
            verdict: Verdict::Valid,
            reasons: Vec::new(),
        }
    }

    /// Merge one signal verdict into the report.
    ///
    /// The verdict only moves to a strictly more severe value. The reason is
    /// recorded whenever the verdict is anything other than `valid`,
    /// including `unknown`, which never raises the severity on its own.
    /// Empty reasons are dropped.
    pub fn submit(&mut self, verdict: Verdict, reason: impl Into<String>) {
        if verdict.priority() > self.verdict.priority() {
            self.verdict = verdict;
        }
        let reason = reason.into();
        if verdict.is_problematic() && !reason.is_empty() {
            self.reasons.push(reason);
        }
    }

    /// Same as [`submit`](Self::submit) for a free-form verdict label
    pub fn submit_label(&mut self, label: &str, reason: impl Into<String>) {
        self.submit(Verdict::normalize(label), reason);
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }
}
