//! Authoring-application blacklist signal

use crate::probe::DocumentProbe;
use serde_json::json;
use shared_types::{DocumentNature, SignalResult, Verdict};
use tracing::debug;

/// Applications that must not appear in a scanned document's metadata
pub const SCAN_BLACKLIST: &[&str] = &[
    // Image editors
    "photoshop",
    "adobe photoshop",
    "gimp",
    "affinity photo",
    "illustrator",
    "adobe illustrator",
    "corel",
    "paintshop",
    "inkscape",
    "paint",
    "paint 3d",
    "photopea",
    "pixlr",
    "krita",
    "canva",
    "figma",
    // Other editors
    "sketch",
    "procreate",
    "clip studio paint",
    "sai",
    "artrage",
    "adobe acrobat 25.1 image conversion plug-in",
];

/// Applications that must not appear in a natively produced document
pub const NATIVE_BLACKLIST: &[&str] = &[
    // Image editors
    "photoshop",
    "adobe photoshop",
    "gimp",
    "affinity photo",
    "illustrator",
    "adobe illustrator",
    "corel",
    "paintshop",
    "inkscape",
    "paint",
    "paint 3d",
    "photopea",
    "pixlr",
    "krita",
    "canva",
    "figma",
    // Scanning apps
    "adobe scan",
    "camscanner",
    "microsoft lens",
    "office lens",
    "scanbot",
    "genius scan",
    "turboscan",
    "notebloc",
    "tap scanner",
    "scanner",
    "scanned",
    "scanné",
    // Other editors
    "sketch",
    "procreate",
    "clip studio paint",
    "sai",
    "artrage",
];

pub fn blacklist_for(nature: DocumentNature) -> &'static [&'static str] {
    match nature {
        DocumentNature::Scan => SCAN_BLACKLIST,
        DocumentNature::Native => NATIVE_BLACKLIST,
    }
}

/// First blacklist entry found in `"<creator> <producer>"`, case-insensitively
pub fn find_blacklisted(
    creator: &str,
    producer: &str,
    blacklist: &'static [&'static str],
) -> Option<&'static str> {
    let haystack = format!("{} {}", creator, producer).to_lowercase();
    blacklist
        .iter()
        .copied()
        .find(|app| haystack.contains(&app.to_lowercase()))
}

/// Second pipeline signal
pub struct MetadataSignal {
    nature: DocumentNature,
}

impl MetadataSignal {
    pub fn new(nature: DocumentNature) -> Self {
        Self { nature }
    }

    pub fn evaluate(&self, probe: &dyn DocumentProbe) -> SignalResult {
        let fields = match probe.metadata() {
            Ok(fields) => fields,
            Err(e) => {
                return SignalResult::new(
                    Verdict::Invalid,
                    format!("Metadata extraction failed: {}", e),
                )
            }
        };

        let detected = find_blacklisted(&fields.creator, &fields.producer, blacklist_for(self.nature));
        debug!(
            "Metadata creator={:?} producer={:?} nature={} match={:?}",
            fields.creator, fields.producer, self.nature, detected
        );

        match detected {
            Some(app) => SignalResult::new(
                Verdict::Falsified,
                format!("Document falsified: disallowed application detected ({})", app),
            )
            .with_evidence(json!({
                "confidence": "high",
                "application": app,
                "nature": self.nature,
                "fields": fields,
            })),
            None => SignalResult::new(
                Verdict::Valid,
                "Document valid: no suspicious application detected",
            )
            .with_evidence(json!({
                "confidence": "high",
                "nature": self.nature,
                "fields": fields,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_in_list_order() {
        assert_eq!(
            find_blacklisted("adobe photoshop 24.0", "", SCAN_BLACKLIST),
            Some("photoshop")
        );
        assert_eq!(find_blacklisted("", "GIMP 2.10", SCAN_BLACKLIST), Some("gimp"));
    }

    #[test]
    fn test_clean_metadata() {
        assert_eq!(
            find_blacklisted("microsoft word", "microsoft: print to pdf", SCAN_BLACKLIST),
            None
        );
        assert_eq!(find_blacklisted("", "", NATIVE_BLACKLIST), None);
    }

    #[test]
    fn test_scan_apps_only_blacklisted_for_native() {
        assert_eq!(find_blacklisted("camscanner", "", SCAN_BLACKLIST), None);
        assert_eq!(
            find_blacklisted("camscanner", "", NATIVE_BLACKLIST),
            Some("camscanner")
        );
    }

    #[test]
    fn test_match_spans_creator_and_producer_boundary() {
        // The joined string is what gets searched
        assert_eq!(
            find_blacklisted("clip studio", "paint", SCAN_BLACKLIST),
            Some("paint")
        );
    }

    #[test]
    fn test_blacklist_selection() {
        assert_eq!(blacklist_for(DocumentNature::Scan).len(), SCAN_BLACKLIST.len());
        assert!(blacklist_for(DocumentNature::Native).contains(&"scanbot"));
    }
}
