//! Rolled filename grammar (§6), one of three shapes depending on the active
//! rotation policy:
//!
//! ```text
//! size-only : stem "." digits{3} ext
//! time-day  : stem "." yyyy "-" MM "-" dd "." digits{3} ext
//! time-hour : stem "." yyyy "-" MM "-" dd "-" HH "." digits{3} ext
//! ```
//!
//! `stem` and `ext` are the `splitext` of the base path; if the base path
//! has no extension, `ext` is empty and the trailing dot is omitted. The
//! zero-padded sequence number starts at `001` and disambiguates multiple
//! rotations within the same time bucket.

use super::policy::{Period, RotationPolicy};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Which of the three grammars a policy rotates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    SizeOnly,
    TimeDaily,
    TimeHourly,
}

pub fn kind_for_policy(policy: &RotationPolicy) -> NameKind {
    match policy {
        RotationPolicy::Size(_) | RotationPolicy::Never => NameKind::SizeOnly,
        RotationPolicy::Time(Period::Daily) | RotationPolicy::Hybrid { period: Period::Daily, .. } => {
            NameKind::TimeDaily
        }
        RotationPolicy::Time(Period::Hourly) | RotationPolicy::Hybrid { period: Period::Hourly, .. } => {
            NameKind::TimeHourly
        }
    }
}

fn stem_and_ext(base: &Path) -> (String, String) {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("log").to_string();
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("").to_string();
    (stem, ext)
}

fn ext_suffix(ext: &str) -> String {
    if ext.is_empty() { String::new() } else { format!(".{ext}") }
}

/// The time-bucket stamp embedded in a rolled name for time/hybrid policies,
/// or `None` for size-only (no time component at all).
pub fn stamp_for(kind: NameKind, timestamp: SystemTime) -> Option<String> {
    let datetime: chrono::DateTime<chrono::Utc> = timestamp.into();
    match kind {
        NameKind::SizeOnly => None,
        NameKind::TimeDaily => Some(datetime.format("%Y-%m-%d").to_string()),
        NameKind::TimeHourly => Some(datetime.format("%Y-%m-%d-%H").to_string()),
    }
}

pub fn rolled_name(base: &Path, policy: &RotationPolicy, timestamp: SystemTime, seq: u32) -> PathBuf {
    let (stem, ext) = stem_and_ext(base);
    let kind = kind_for_policy(policy);
    let seq_str = format!("{seq:03}");
    let suffix = ext_suffix(&ext);
    let filename = match stamp_for(kind, timestamp) {
        Some(stamp) => format!("{stem}.{stamp}.{seq_str}{suffix}"),
        None => format!("{stem}.{seq_str}{suffix}"),
    };
    base.parent().map(|p| p.join(&filename)).unwrap_or_else(|| PathBuf::from(filename))
}

/// Parse a rolled filename back into `(stamp, seq)`, used by discovery to
/// order existing files on restart. `stamp` is empty for the size-only
/// grammar. Returns `None` for names that don't match `kind`'s grammar
/// (including the active, unrolled base file).
pub fn parse_rolled_name(base: &Path, kind: NameKind, candidate: &Path) -> Option<(String, u32)> {
    let (stem, ext) = stem_and_ext(base);
    let name = candidate.file_name()?.to_str()?;
    let prefix = format!("{stem}.");
    let suffix = ext_suffix(&ext);
    let middle = name.strip_prefix(&prefix)?;
    let middle = if suffix.is_empty() { middle } else { middle.strip_suffix(&suffix)? };

    match kind {
        NameKind::SizeOnly => {
            if middle.len() != 3 || !middle.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let seq: u32 = middle.parse().ok()?;
            Some((String::new(), seq))
        }
        NameKind::TimeDaily | NameKind::TimeHourly => {
            let (stamp, seq_str) = middle.rsplit_once('.')?;
            if seq_str.len() != 3 || !seq_str.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let seq: u32 = seq_str.parse().ok()?;
            Some((stamp.to_string(), seq))
        }
    }
}
