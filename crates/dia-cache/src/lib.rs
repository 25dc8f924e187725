//! Fingerprint cache for rendered diagram artifacts.
//!
//! This crate decouples the rendering pipeline from the mechanism used to
//! decide whether an already-rendered artifact is still valid. The core
//! question it answers is: "does the file at this path still correspond to
//! this fingerprint?" — where the fingerprint is an opaque content hash
//! computed by the caller.
//!
//! # Implementations
//!
//! - [`MarkerCache`]: file-backed implementation that records each
//!   artifact's fingerprint (and dimensions) in an adjacent marker file
//! - [`NullCache`]: no-op implementation (always miss) for disabled caching
//!
//! The filesystem is the source of truth: no in-memory state survives the
//! cache value itself, and an entry is only considered valid when the
//! artifact file actually exists on disk.

mod marker;
pub use marker::MarkerCache;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Version of the persisted record layout.
///
/// Bump when [`CachedEntry`] changes shape. A stored record with a
/// different version is treated as a miss, forcing a re-render rather than
/// trusting stale metadata.
pub const RECORD_VERSION: u32 = 1;

/// Persisted association between an artifact file and the fingerprint
/// that produced it.
///
/// Dimensions are recorded alongside the fingerprint so a cache hit never
/// has to re-parse the artifact. They are `None` for artifacts whose
/// dimensions could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Record layout version, see [`RECORD_VERSION`].
    pub version: u32,
    /// Hex-encoded content fingerprint of the render inputs.
    pub fingerprint: String,
    /// Artifact width in pixels, if known.
    pub width: Option<u32>,
    /// Artifact height in pixels, if known.
    pub height: Option<u32>,
}

impl CachedEntry {
    /// Create an entry at the current record version.
    #[must_use]
    pub fn new(fingerprint: impl Into<String>, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            version: RECORD_VERSION,
            fingerprint: fingerprint.into(),
            width,
            height,
        }
    }
}

/// Validity oracle for rendered artifacts.
///
/// `lookup` and `record` bracket the render step: the pipeline calls
/// `lookup` before rendering and `record` after a successful write. Both
/// take the artifact path itself; implementations derive any side-channel
/// storage location from it.
pub trait DiagramCache: Send + Sync {
    /// Return the recorded entry for `target`, but only when the artifact
    /// file exists **and** was recorded with the same `fingerprint`.
    ///
    /// Returns `None` on any mismatch, missing file, or unreadable record.
    /// A `None` result merely costs a re-render; it is never an error.
    fn lookup(&self, target: &Path, fingerprint: &str) -> Option<CachedEntry>;

    /// Durably associate `entry` with the artifact at `target`.
    ///
    /// Overwrites any previous association. Must not modify the artifact
    /// file itself. Failures are logged, not surfaced — the worst case is
    /// a redundant render on the next run.
    fn record(&self, target: &Path, entry: &CachedEntry);
}

/// No-op [`DiagramCache`] that never reports a hit.
///
/// Every `lookup` returns `None`; every `record` is discarded. Use when
/// incremental builds are disabled and every diagram should re-render.
pub struct NullCache;

impl DiagramCache for NullCache {
    fn lookup(&self, _target: &Path, _fingerprint: &str) -> Option<CachedEntry> {
        None
    }

    fn record(&self, _target: &Path, _entry: &CachedEntry) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cache_always_misses() {
        let cache = NullCache;
        let target = Path::new("/tmp/diagram.png");

        assert_eq!(cache.lookup(target, "abc123"), None);

        // Recording and looking the same entry up still misses
        cache.record(target, &CachedEntry::new("abc123", Some(100), Some(50)));
        assert_eq!(cache.lookup(target, "abc123"), None);
    }

    #[test]
    fn test_cached_entry_new_uses_current_version() {
        let entry = CachedEntry::new("fp", None, None);
        assert_eq!(entry.version, RECORD_VERSION);
        assert_eq!(entry.fingerprint, "fp");
        assert_eq!(entry.width, None);
        assert_eq!(entry.height, None);
    }
}
