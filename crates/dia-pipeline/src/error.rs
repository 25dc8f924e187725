//! Error taxonomy for the rendering pipeline.

use std::path::PathBuf;

use crate::engine::EngineError;

/// Fatal pipeline errors.
///
/// Each error aborts processing for its own request only; concurrent
/// requests for other diagrams are unaffected. Metadata-extraction
/// failures are deliberately absent — they degrade to missing dimensions,
/// not failures.
#[derive(Debug, thiserror::Error)]
pub enum DiagramError {
    /// The requested format name is not a known output format.
    #[error("unknown diagram format '{format}' (valid formats: png, svg, txt)")]
    UnknownFormat { format: String },

    /// The variant's capability table rejects this format.
    #[error("{variant} diagrams do not support the '{format}' output format (supported: {supported})")]
    UnsupportedFormat {
        variant: &'static str,
        format: &'static str,
        supported: String,
    },

    /// External render engine failed; diagnostics captured, never retried.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Filesystem failure while preparing or writing the artifact.
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl DiagramError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
