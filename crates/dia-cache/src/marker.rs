//! Marker-file cache implementation.
//!
//! [`MarkerCache`] stores each artifact's [`CachedEntry`] as JSON in a
//! hidden file next to the artifact itself: the record for `foo.png` lives
//! at `.foo.png.cache` in the same directory. Keeping the marker adjacent
//! means the association travels with the artifact when the output
//! directory is relocated, and deleting the artifact's directory cleans up
//! the bookkeeping with it.
//!
//! Validity requires all of:
//! - the artifact file exists
//! - the marker parses as a record with the current [`RECORD_VERSION`]
//! - the recorded fingerprint equals the requested one
//!
//! Anything else is a miss. The artifact's mtime is deliberately ignored:
//! an unrelated file could share the name across runs, and only the
//! fingerprint says whether the content matches.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{CachedEntry, DiagramCache, RECORD_VERSION};

/// File-backed [`DiagramCache`] using adjacent hidden marker files.
#[derive(Debug, Default)]
pub struct MarkerCache;

/// Marker path for an artifact: `dir/.{file_name}.cache`.
///
/// Returns `None` for paths without a UTF-8 file name; such targets are
/// simply uncacheable.
fn marker_path(target: &Path) -> Option<PathBuf> {
    let name = target.file_name()?.to_str()?;
    Some(target.with_file_name(format!(".{name}.cache")))
}

impl DiagramCache for MarkerCache {
    fn lookup(&self, target: &Path, fingerprint: &str) -> Option<CachedEntry> {
        if !target.is_file() {
            return None;
        }

        let marker = marker_path(target)?;
        let bytes = fs::read(&marker).ok()?;
        let entry: CachedEntry = serde_json::from_slice(&bytes).ok()?;

        if entry.version != RECORD_VERSION {
            tracing::debug!(
                "stale cache record version {} for {} (current {RECORD_VERSION})",
                entry.version,
                target.display()
            );
            return None;
        }
        if entry.fingerprint != fingerprint {
            tracing::debug!("fingerprint changed for {}", target.display());
            return None;
        }

        Some(entry)
    }

    fn record(&self, target: &Path, entry: &CachedEntry) {
        let Some(marker) = marker_path(target) else {
            return;
        };

        // Best-effort: a lost marker only costs a re-render next run
        match serde_json::to_vec(entry) {
            Ok(bytes) => {
                if let Err(e) = fs::write(&marker, bytes) {
                    tracing::warn!("failed to write cache marker {}: {e}", marker.display());
                }
            }
            Err(e) => {
                tracing::warn!("failed to serialize cache record for {}: {e}", target.display());
            }
        }
    }
}
