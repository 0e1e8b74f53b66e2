//! Incremental-update (revision) signal
//!
//! The revision-history tool is authoritative when it runs. Only when it is
//! missing or times out does the signal fall back to comparing creation and
//! modification timestamps.

use crate::error::RevisionError;
use crate::probe::DocumentProbe;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;
use shared_pdf::{parse_pdf_date, DocumentDates};
use shared_types::{SignalResult, Verdict};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

lazy_static! {
    static ref TRAILING_INTEGER: Regex = Regex::new(r"(\d+)\s*$").unwrap();
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Source of a document's stored revision count
pub trait RevisionInspector: Send + Sync {
    /// Name used in messages and evidence
    fn name(&self) -> &str;

    /// Number of stored revisions (at least 1)
    fn count_versions(&self, path: &Path) -> Result<u32, RevisionError>;
}

/// `pdfresurrect -q <file>` run as a subprocess
pub struct PdfResurrect {
    program: String,
    timeout: Duration,
}

impl PdfResurrect {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl Default for PdfResurrect {
    fn default() -> Self {
        Self::new("pdfresurrect", Duration::from_secs(10))
    }
}

impl RevisionInspector for PdfResurrect {
    fn name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.program)
    }

    fn count_versions(&self, path: &Path) -> Result<u32, RevisionError> {
        let mut child = Command::new(&self.program)
            .arg("-q")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RevisionError::ToolUnavailable(self.program.clone()),
                _ => RevisionError::Io(e),
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = wait_with_timeout(&mut child, self.timeout)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        debug!("{} output: {:?} / {:?}", self.program, stdout.trim(), stderr.trim());

        if !status.success() {
            return Err(RevisionError::ToolFailed(format!(
                "{} exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }

        Ok(parse_versions(&stdout).or_else(|| parse_versions(&stderr)).unwrap_or(1))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buf);
        }
        buf
    })
}

/// Wait for the child, killing and reaping it once `timeout` elapses
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, RevisionError> {
    // Timeouts too large to represent never expire
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RevisionError::Io(e));
            }
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RevisionError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Trailing integer of the tool output, clamped to at least one version
pub fn parse_versions(output: &str) -> Option<u32> {
    let captures = TRAILING_INTEGER.captures(output.trim())?;
    let versions = captures[1].parse::<u64>().unwrap_or(u64::from(u32::MAX));
    Some(versions.clamp(1, u64::from(u32::MAX)) as u32)
}

fn rewrites_message(rewrites: u32, tool: &str) -> String {
    if rewrites == 1 {
        format!("1 rewrite detected ({})", tool)
    } else {
        format!("{} rewrites detected ({})", rewrites, tool)
    }
}

/// First pipeline signal
pub struct RevisionSignal {
    inspector: Box<dyn RevisionInspector>,
    tolerance_secs: f64,
}

impl RevisionSignal {
    pub fn new(inspector: Box<dyn RevisionInspector>, tolerance_secs: f64) -> Self {
        Self {
            inspector,
            tolerance_secs,
        }
    }

    pub fn evaluate(&self, probe: &dyn DocumentProbe) -> SignalResult {
        let tool = self.inspector.name().to_string();
        match self.inspector.count_versions(probe.path()) {
            Ok(versions) => {
                let rewrites = versions.saturating_sub(1);
                debug!("{}: {} versions, {} rewrites", tool, versions, rewrites);
                let evidence = json!({
                    "method": tool,
                    "versions": versions,
                    "rewrites": rewrites,
                });
                if rewrites > 0 {
                    SignalResult::new(Verdict::Falsified, rewrites_message(rewrites, &tool))
                        .with_evidence(evidence)
                } else {
                    SignalResult::new(Verdict::Valid, format!("No rewrite detected ({})", tool))
                        .with_evidence(evidence)
                }
            }
            Err(e) if e.triggers_fallback() => {
                warn!("{}; falling back to date comparison", e);
                self.compare_dates(probe, &e)
            }
            Err(e) => SignalResult::new(Verdict::Unknown, format!("Revision analysis failed: {}", e)),
        }
    }

    fn compare_dates(&self, probe: &dyn DocumentProbe, cause: &RevisionError) -> SignalResult {
        let dates = match probe.dates() {
            Ok(dates) => dates,
            Err(e) => {
                return SignalResult::new(Verdict::Unknown, format!("Date analysis failed: {}", e))
            }
        };

        let (equal, method) = dates_match(&dates, self.tolerance_secs);
        debug!("Date comparison via {}: equal = {}", method, equal);
        let evidence = json!({
            "method": method,
            "rewrites": if equal { 0 } else { 1 },
            "fallback_reason": cause.to_string(),
        });

        if equal {
            SignalResult::new(
                Verdict::Valid,
                "No rewrite detected (creation and modification dates match)",
            )
            .with_evidence(evidence)
        } else {
            SignalResult::new(
                Verdict::Suspect,
                "Rewrite suspected (creation and modification dates differ)",
            )
            .with_evidence(evidence)
        }
    }
}

/// Compare PDF dates when both exist, filesystem times otherwise
pub fn dates_match(dates: &DocumentDates, tolerance_secs: f64) -> (bool, &'static str) {
    match dates.pdf_dates() {
        Some((creation, modification)) => {
            let equal = match (parse_pdf_date(creation), parse_pdf_date(modification)) {
                (Some(c), Some(m)) => c == m,
                _ => creation.trim() == modification.trim(),
            };
            (equal, "dates_pdf_metadata")
        }
        None => (
            (dates.fs_changed - dates.fs_modified).abs() <= tolerance_secs,
            "dates_filesystem",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(creation: Option<&str>, modification: Option<&str>, fs: (f64, f64)) -> DocumentDates {
        DocumentDates {
            creation: creation.map(String::from),
            modification: modification.map(String::from),
            fs_modified: fs.0,
            fs_changed: fs.1,
        }
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!(parse_versions("transcript.pdf: 3"), Some(3));
        assert_eq!(parse_versions("transcript.pdf: 3\n"), Some(3));
        assert_eq!(parse_versions("0"), Some(1));
        assert_eq!(parse_versions("no number here"), None);
        assert_eq!(parse_versions(""), None);
    }

    #[test]
    fn test_rewrites_message() {
        assert_eq!(rewrites_message(1, "pdfresurrect"), "1 rewrite detected (pdfresurrect)");
        assert_eq!(rewrites_message(2, "pdfresurrect"), "2 rewrites detected (pdfresurrect)");
    }

    #[test]
    fn test_pdf_dates_take_precedence() {
        let d = dates(
            Some("D:20240101120000+01'00'"),
            Some("D:20240101110000Z"),
            (0.0, 500.0),
        );
        assert_eq!(dates_match(&d, 1.0), (true, "dates_pdf_metadata"));

        let d = dates(Some("D:20240101"), Some("D:20240315"), (0.0, 0.0));
        assert_eq!(dates_match(&d, 1.0), (false, "dates_pdf_metadata"));
    }

    #[test]
    fn test_unparseable_dates_compare_as_text() {
        let d = dates(Some("sometime"), Some("sometime"), (0.0, 100.0));
        assert_eq!(dates_match(&d, 1.0).0, true);
    }

    #[test]
    fn test_filesystem_tolerance() {
        let d = dates(Some("D:20240101"), None, (1000.0, 1000.9));
        assert_eq!(dates_match(&d, 1.0), (true, "dates_filesystem"));

        let d = dates(None, None, (1000.0, 1002.0));
        assert_eq!(dates_match(&d, 1.0), (false, "dates_filesystem"));
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let tool = PdfResurrect::new("definitely-not-installed-revision-tool", Duration::from_secs(1));
        let err = tool.count_versions(Path::new("any.pdf")).unwrap_err();
        assert!(matches!(err, RevisionError::ToolUnavailable(_)));
        assert!(err.triggers_fallback());
    }

    #[test]
    fn test_inspector_name_is_basename() {
        let tool = PdfResurrect::new("/usr/local/bin/pdfresurrect", Duration::from_secs(1));
        assert_eq!(tool.name(), "pdfresurrect");
    }
}
