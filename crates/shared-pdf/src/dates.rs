//! Creation / modification timestamps, from the PDF and from the filesystem

use crate::error::ExtractionError;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamps used by the date-comparison revision check
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDates {
    /// Raw `/CreationDate` value
    pub creation: Option<String>,
    /// Raw `/ModDate` value
    pub modification: Option<String>,
    /// Filesystem modification time, seconds since the epoch
    pub fs_modified: f64,
    /// Filesystem metadata-change time (creation time on non-Unix)
    pub fs_changed: f64,
}

impl DocumentDates {
    /// Gather both timestamp sources for a document
    pub fn read(path: &Path, info: &BTreeMap<String, String>) -> Result<Self, ExtractionError> {
        let (fs_modified, fs_changed) = filesystem_times(path)?;
        let non_empty = |key: &str| info.get(key).filter(|v| !v.trim().is_empty()).cloned();
        Ok(Self {
            creation: non_empty("CreationDate"),
            modification: non_empty("ModDate"),
            fs_modified,
            fs_changed,
        })
    }

    /// Both PDF dates, when the document carries them
    pub fn pdf_dates(&self) -> Option<(&str, &str)> {
        match (&self.creation, &self.modification) {
            (Some(c), Some(m)) => Some((c.as_str(), m.as_str())),
            _ => None,
        }
    }
}

/// Modification and metadata-change times of a file, in seconds
pub fn filesystem_times(path: &Path) -> std::io::Result<(f64, f64)> {
    let meta = std::fs::metadata(path)?;
    let modified = seconds_since_epoch(meta.modified()?);

    #[cfg(unix)]
    let changed = {
        use std::os::unix::fs::MetadataExt;
        meta.ctime() as f64 + meta.ctime_nsec() as f64 / 1e9
    };
    #[cfg(not(unix))]
    let changed = seconds_since_epoch(meta.created()?);

    Ok((modified, changed))
}

fn seconds_since_epoch(t: SystemTime) -> f64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Every component after the year is optional; a missing offset means UTC.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }
    let rest = &s[digits.len()..];

    let part = |start: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + 2) {
            Some(p) => p.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits[0..4].parse().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, part(4, 1)?, part(6, 1)?)?.and_hms_opt(
        part(8, 0)?,
        part(10, 0)?,
        part(12, 0)?,
    )?;
    let offset = FixedOffset::east_opt(parse_offset(rest)?)?;
    offset.from_local_datetime(&naive).single()
}

fn parse_offset(rest: &str) -> Option<i32> {
    let mut chars = rest.chars();
    match chars.next() {
        Some(sign @ ('+' | '-')) => {
            let tail: String = chars.filter(|c| c.is_ascii_digit()).collect();
            let hours: i32 = tail.get(0..2)?.parse().ok()?;
            let minutes: i32 = tail.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
            let secs = hours * 3600 + minutes * 60;
            Some(if sign == '-' { -secs } else { secs })
        }
        _ => Some(0),
    }
}
