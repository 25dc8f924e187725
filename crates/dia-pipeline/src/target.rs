//! Target path resolution for image artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DiagramError;
use crate::fingerprint::Fingerprint;
use crate::request::DiagramRequest;

/// Final resting place of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Resolved file path, extension included.
    pub path: PathBuf,
    /// Whether the name was derived from the fingerprint rather than
    /// given explicitly.
    pub is_default_name: bool,
}

/// Append the canonical extension unless the target already ends in it.
fn ensure_extension(target: &str, ext: &str) -> String {
    let has_ext = Path::new(target)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == ext);
    if has_ext {
        target.to_owned()
    } else {
        format!("{target}.{ext}")
    }
}

/// Resolve the output path for an image-format request.
///
/// Explicit targets are taken as a stem or relative path with the
/// extension appended when absent; without one the name derives from the
/// fingerprint, so render-equivalent requests share a single file.
/// Directory precedence: `images_output_dir` over `output_dir` over
/// `base_dir`. The parent directory tree is created here; resolution is
/// otherwise deterministic.
pub(crate) fn resolve(
    request: &DiagramRequest,
    fingerprint: &Fingerprint,
    base_dir: &Path,
) -> Result<ResolvedTarget, DiagramError> {
    let ext = request.format.extension();

    let (name, is_default_name) = match &request.target {
        Some(target) => (ensure_extension(target, ext), false),
        None => (format!("diagram-{}.{ext}", fingerprint.short()), true),
    };

    let dir = request
        .images_output_dir
        .as_deref()
        .or(request.output_dir.as_deref())
        .unwrap_or(base_dir);
    let path = dir.join(name);

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| DiagramError::io("create output directory", parent, e))?;
    }

    Ok(ResolvedTarget {
        path,
        is_default_name,
    })
}
