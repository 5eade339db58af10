//! Retention pruning for rolled files: keep at most `max_count` files and at
//! most `max_total_bytes` of total size, deleting the oldest first (§6).
//! Either limit can be disabled by passing `None`.

use super::discovery::DiscoveredFile;
use std::path::PathBuf;

/// Given the currently-known rolled files (oldest first), return the paths
/// that should be deleted to satisfy the retention limits.
pub fn files_to_prune(existing: &[DiscoveredFile], max_count: Option<usize>, max_total_bytes: Option<u64>) -> Vec<PathBuf> {
    let mut keep_from = 0;

    if let Some(max_count) = max_count {
        if existing.len() > max_count {
            keep_from = keep_from.max(existing.len() - max_count);
        }
    }

    if let Some(max_total_bytes) = max_total_bytes {
        let mut total: u64 = existing[keep_from..].iter().map(|f| f.size).sum();
        let mut i = keep_from;
        while total > max_total_bytes && i < existing.len() {
            total -= existing[i].size;
            i += 1;
        }
        keep_from = keep_from.max(i);
    }

    existing[..keep_from].iter().map(|f| f.path.clone()).collect()
}

/// Delete the given files, ignoring individual failures (a file already
/// removed by another process is not an error here).
pub fn prune(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to prune rolled log file");
            }
        }
    }
}
