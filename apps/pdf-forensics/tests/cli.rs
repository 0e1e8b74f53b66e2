//! End-to-end runs of the `pdf-forensics` binary

use lopdf::{Dictionary, Document, Object, Stream, StringFormat};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pdf-forensics"))
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

/// Single empty page with a producer entry in the info dictionary
fn minimal_pdf(dir: &Path, producer: &str) -> PathBuf {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
    ]));
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    let info_id = doc.add_object(Dictionary::from_iter(vec![(
        "Producer",
        Object::String(producer.as_bytes().to_vec(), StringFormat::Literal),
    )]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));

    let path = dir.join("certificate.pdf");
    doc.save(&path).unwrap();
    path
}

#[test]
fn test_missing_argument_prints_usage_error() {
    let output = binary().output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let json = stdout_json(&output);
    assert_eq!(json["error"], "Usage: pdf-forensics [OPTIONS] <PDF>");
}

#[test]
fn test_unreadable_config_exits_with_usage_code() {
    let output = binary()
        .args(["a.pdf", "--config", "/nonexistent/forensics.toml"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_json(&output)["error"].is_string());
}

#[test]
fn test_dump_metadata_prints_info_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_pdf(dir.path(), "Acrobat Distiller 11.0");

    let output = binary().arg(&path).arg("--dump-metadata").output().unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["Producer"], "Acrobat Distiller 11.0");
}

#[test]
fn test_blacklisted_producer_without_revision_tool() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_pdf(dir.path(), "Adobe Photoshop 24.0");

    let output = binary()
        .arg(&path)
        .args(["--revision-tool", "/nonexistent/pdfresurrect"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["document"]["type"], "scan");
    assert_eq!(report["metadata"]["verdict"], "falsified");
    assert_eq!(report["overall"]["verdict"], "falsified");
    assert!(report.get("criteria").is_none());
}

#[test]
fn test_evidence_flag_adds_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let path = minimal_pdf(dir.path(), "Adobe Photoshop 24.0");

    let output = binary()
        .arg(&path)
        .args(["--revision-tool", "/nonexistent/pdfresurrect", "--evidence"])
        .output()
        .unwrap();

    let report = stdout_json(&output);
    assert_eq!(report["metadata"]["evidence"]["application"], "photoshop");
    assert!(report["revision"]["evidence"].is_object());
}
