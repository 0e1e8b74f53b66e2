use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Outcome of a single forensic signal, or of the whole run.
///
/// Ordered by severity through [`Verdict::priority`]: `falsified` (3) >
/// `invalid` (2) > `suspect` (1) > `valid` / `unknown` (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Suspect,
    Invalid,
    Falsified,
    Unknown,
}

impl Verdict {
    /// Normalize a free-form verdict label.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Anything unrecognized maps to [`Verdict::Unknown`].
    pub fn normalize(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "valid" | "ok" => Verdict::Valid,
            "suspect" | "borderline" | "warning" | "warn" => Verdict::Suspect,
            "invalid" | "invalide" => Verdict::Invalid,
            "falsified" | "forged" => Verdict::Falsified,
            _ => Verdict::Unknown,
        }
    }

    /// Severity rank used when merging verdicts.
    pub fn priority(self) -> u8 {
        match self {
            Verdict::Falsified => 3,
            Verdict::Invalid => 2,
            Verdict::Suspect => 1,
            Verdict::Valid | Verdict::Unknown => 0,
        }
    }

    /// Canonical lower-case label
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Valid => "valid",
            Verdict::Suspect => "suspect",
            Verdict::Invalid => "invalid",
            Verdict::Falsified => "falsified",
            Verdict::Unknown => "unknown",
        }
    }

    /// Whether this verdict is worth reporting as a reason.
    pub fn is_problematic(self) -> bool {
        self != Verdict::Valid
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Verdict::normalize(s))
    }
}

/// Result produced by one signal during one run.
///
/// Immutable once built: fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResult {
    verdict: Verdict,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<serde_json::Value>,
}

impl SignalResult {
    pub fn new(verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            verdict,
            message: message.into(),
            evidence: None,
        }
    }

    /// Attach structured evidence
    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evidence(&self) -> Option<&serde_json::Value> {
        self.evidence.as_ref()
    }
}

/// Whether a PDF was scanned from paper or produced natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentNature {
    Scan,
    Native,
}

impl DocumentNature {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentNature::Scan => "scan",
            DocumentNature::Native => "native",
        }
    }
}

impl fmt::Display for DocumentNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown document nature: {0} (expected scan or native)")]
pub struct ParseNatureError(pub String);

impl FromStr for DocumentNature {
    type Err = ParseNatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scan" | "scanned" | "scanné" => Ok(DocumentNature::Scan),
            "native" | "natif" => Ok(DocumentNature::Native),
            other => Err(ParseNatureError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_synonyms() {
        assert_eq!(Verdict::normalize("OK"), Verdict::Valid);
        assert_eq!(Verdict::normalize(" borderline "), Verdict::Suspect);
        assert_eq!(Verdict::normalize("Warning"), Verdict::Suspect);
        assert_eq!(Verdict::normalize("warn"), Verdict::Suspect);
        assert_eq!(Verdict::normalize("INVALIDE"), Verdict::Invalid);
        assert_eq!(Verdict::normalize("forged"), Verdict::Falsified);
        assert_eq!(Verdict::normalize("Falsified"), Verdict::Falsified);
    }

    #[test]
    fn test_normalize_unrecognized_is_unknown() {
        assert_eq!(Verdict::normalize(""), Verdict::Unknown);
        assert_eq!(Verdict::normalize("maybe"), Verdict::Unknown);
        assert_eq!(Verdict::normalize("validated"), Verdict::Unknown);
    }

    #[test]
    fn test_priority_order() {
        assert!(Verdict::Falsified.priority() > Verdict::Invalid.priority());
        assert!(Verdict::Invalid.priority() > Verdict::Suspect.priority());
        assert!(Verdict::Suspect.priority() > Verdict::Valid.priority());
        assert_eq!(Verdict::Valid.priority(), Verdict::Unknown.priority());
    }

    #[test]
    fn test_verdict_serializes_lowercase() {
        let json = serde_json::to_string(&Verdict::Falsified).unwrap();
        assert_eq!(json, "\"falsified\"");
    }

    #[test]
    fn test_signal_result_skips_missing_evidence() {
        let result = SignalResult::new(Verdict::Valid, "clean");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("evidence").is_none());
        assert_eq!(json["verdict"], "valid");
    }

    #[test]
    fn test_nature_parse() {
        assert_eq!("SCAN".parse::<DocumentNature>().unwrap(), DocumentNature::Scan);
        assert_eq!("native".parse::<DocumentNature>().unwrap(), DocumentNature::Native);
        assert!("auto".parse::<DocumentNature>().is_err());
    }
}
