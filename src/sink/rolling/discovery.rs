//! Discovery-on-restart: scan the log directory for rolled files that
//! already exist so a freshly started process continues the rotation
//! sequence and retention ledger instead of starting from zero (§6).

use super::naming::{parse_rolled_name, NameKind};
use std::path::{Path, PathBuf};

/// One rolled file found on disk, in discovery order (oldest stamp first,
/// then lowest sequence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub stamp: String,
    pub seq: u32,
    pub size: u64,
}

/// Scan `base`'s parent directory for files matching `kind`'s rolled naming
/// grammar, sorted oldest-first. Missing directories yield an empty list
/// rather than an error — there's nothing to discover yet.
pub fn discover(base: &Path, kind: NameKind) -> std::io::Result<Vec<DiscoveredFile>> {
    let dir = base.parent().unwrap_or_else(|| Path::new("."));
    let mut found = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if let Some((stamp, seq)) = parse_rolled_name(base, kind, &path) {
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            found.push(DiscoveredFile { path, stamp, seq, size });
        }
    }

    found.sort_by(|a, b| a.stamp.cmp(&b.stamp).then(a.seq.cmp(&b.seq)));
    Ok(found)
}

/// The next sequence number to use for a rotation at `stamp`, given what's
/// already on disk for that same rendered timestamp. Sequences are 1-based
/// per §6 (`NNN` starts at `001`).
pub fn next_sequence(existing: &[DiscoveredFile], stamp: &str) -> u32 {
    existing.iter().filter(|f| f.stamp == stamp).map(|f| f.seq).max().map(|m| m + 1).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_yields_empty_discovery() {
        let base = Path::new("/nonexistent-minta-log-dir/app.log");
        let found = discover(base, NameKind::SizeOnly).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn discovers_and_orders_rolled_files_by_day_grammar() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("app.log");
        std::fs::write(dir.path().join("app.2026-01-01.001.log"), "a").unwrap();
        std::fs::write(dir.path().join("app.2026-01-01.002.log"), "bb").unwrap();
        std::fs::write(dir.path().join("app.2026-01-02.001.log"), "c").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();

        let found = discover(&base, NameKind::TimeDaily).unwrap();
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].stamp, "2026-01-01");
        assert_eq!(found[0].seq, 1);
        assert_eq!(found[2].stamp, "2026-01-02");
        assert_eq!(next_sequence(&found, "2026-01-01"), 3);
        assert_eq!(next_sequence(&found, "2026-03-01"), 1);
    }

    #[test]
    fn size_only_discovery_ignores_time_stamped_names() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("app.log");
        std::fs::write(dir.path().join("app.001.log"), "a").unwrap();
        std::fs::write(dir.path().join("app.2026-01-01.001.log"), "b").unwrap();

        let found = discover(&base, NameKind::SizeOnly).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].seq, 1);
        assert_eq!(next_sequence(&found, ""), 2);
    }
}
