//! Document information dictionary access
//!
//! Reads the trailer `/Info` dictionary and exposes it either raw (original
//! key case, decoded values) or as the normalized [`MetadataFields`] used by
//! the metadata signal.

use crate::error::ExtractionError;
use lopdf::{Document, Object};
use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized authoring metadata: trimmed, lower-cased, empty when absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataFields {
    pub producer: String,
    pub creator: String,
    pub application: String,
    pub title: String,
    pub author: String,
    pub moddate: String,
}

impl MetadataFields {
    /// Build from a raw info map. Keys are matched case-insensitively.
    pub fn from_info(info: &BTreeMap<String, String>) -> Self {
        let lowered: BTreeMap<String, &str> = info
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.as_str()))
            .collect();

        let field = |keys: &[&str]| -> String {
            keys.iter()
                .filter_map(|k| lowered.get(*k))
                .find(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_lowercase())
                .unwrap_or_default()
        };

        Self {
            producer: field(&["producer"]),
            creator: field(&["creator"]),
            application: field(&["application", "app"]),
            title: field(&["title"]),
            author: field(&["author"]),
            moddate: field(&["moddate", "modified", "mod_date"]),
        }
    }
}

/// Raw `/Info` entries with decoded text values.
///
/// Returns an empty map when the document has no info dictionary. Non-text
/// values (numbers, names, booleans) are rendered with their PDF spelling.
pub fn info_dictionary(doc: &Document) -> Result<BTreeMap<String, String>, ExtractionError> {
    let mut out = BTreeMap::new();

    let info = match doc.trailer.get(b"Info") {
        Ok(obj) => resolve(doc, obj)?,
        Err(_) => return Ok(out),
    };
    let dict = info
        .as_dict()
        .map_err(|_| ExtractionError::Malformed("/Info is not a dictionary".to_string()))?;

    for (key, value) in dict.iter() {
        let key = String::from_utf8_lossy(key).into_owned();
        if let Some(text) = object_to_text(doc, value) {
            out.insert(key, text);
        }
    }

    Ok(out)
}

fn object_to_text(doc: &Document, value: &Object) -> Option<String> {
    let value = resolve(doc, value).ok()?;
    match value {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Follow a single indirect reference, if any
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, ExtractionError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Decode a PDF text string.
///
/// UTF-16BE and UTF-8 are recognized by their byte-order marks; anything
/// else is treated as PDFDocEncoding, approximated by Latin-1.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}
