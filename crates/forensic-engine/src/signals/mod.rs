//! The three forensic signals, in pipeline order

pub mod metadata;
pub mod rescan;
pub mod revision;

pub use metadata::{find_blacklisted, MetadataSignal, NATIVE_BLACKLIST, SCAN_BLACKLIST};
pub use rescan::{RescanOutcome, RescanSignal};
pub use revision::{PdfResurrect, RevisionInspector, RevisionSignal};
