//! Revision signal against stand-in tool scripts
#![cfg(unix)]

use forensic_engine::signals::{PdfResurrect, RevisionInspector};
use forensic_engine::RevisionError;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn tool(path: &Path, timeout_ms: u64) -> PdfResurrect {
    PdfResurrect::new(path.to_string_lossy(), Duration::from_millis(timeout_ms))
}

#[test]
fn test_trailing_integer_is_version_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(dir.path(), "pdfresurrect", r#"echo "$2: 4""#);

    let versions = tool(&path, 5_000).count_versions(Path::new("diploma.pdf")).unwrap();
    assert_eq!(versions, 4);
}

#[test]
fn test_output_without_number_is_one_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(dir.path(), "pdfresurrect", "echo 'no versions found'");

    assert_eq!(tool(&path, 5_000).count_versions(Path::new("a.pdf")).unwrap(), 1);
}

#[test]
fn test_non_zero_exit_is_tool_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(dir.path(), "pdfresurrect", "echo 'cannot open file' >&2\nexit 3");

    let err = tool(&path, 5_000).count_versions(Path::new("a.pdf")).unwrap_err();
    match err {
        RevisionError::ToolFailed(msg) => assert!(msg.contains("cannot open file")),
        other => panic!("expected ToolFailed, got {:?}", other),
    }
}

#[test]
fn test_slow_tool_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(dir.path(), "pdfresurrect", "sleep 5\necho 9");

    let started = Instant::now();
    let err = tool(&path, 200).count_versions(Path::new("a.pdf")).unwrap_err();
    assert!(matches!(err, RevisionError::Timeout(_)));
    assert!(err.triggers_fallback());
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[test]
fn test_unbounded_timeout_waits_for_the_tool() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(dir.path(), "pdfresurrect", "echo 2");

    let versions = tool(&path, u64::MAX).count_versions(Path::new("a.pdf")).unwrap();
    assert_eq!(versions, 2);
}
