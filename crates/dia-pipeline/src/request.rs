//! Diagram render requests.

use std::path::PathBuf;

use crate::variant::{DiagramFormat, DiagramVariant};

/// A single diagram occurrence to convert.
///
/// The source text must already be substitution-expanded by the caller;
/// the pipeline treats it as opaque diagram notation. Construct with
/// [`DiagramRequest::new`] and the builder methods, then hand to
/// [`Pipeline::process`](crate::Pipeline::process). One request per
/// diagram occurrence; immutable once built.
#[derive(Debug, Clone)]
pub struct DiagramRequest {
    pub(crate) source: String,
    pub(crate) variant: DiagramVariant,
    pub(crate) format: DiagramFormat,
    pub(crate) target: Option<String>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) images_output_dir: Option<PathBuf>,
    pub(crate) scale: Option<f64>,
    pub(crate) config: Option<PathBuf>,
}

impl DiagramRequest {
    /// Create a request for the given source, variant, and output format.
    #[must_use]
    pub fn new(source: impl Into<String>, variant: DiagramVariant, format: DiagramFormat) -> Self {
        Self {
            source: source.into(),
            variant,
            format,
            target: None,
            output_dir: None,
            images_output_dir: None,
            scale: None,
            config: None,
        }
    }

    /// Explicit target name: a bare stem (`"foo"`) or relative path
    /// (`"sub/foo"`). The format's extension is appended when absent.
    ///
    /// Without an explicit target the artifact gets a deterministic
    /// fingerprint-derived name, so identical sources share one file.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Directory for generated artifacts, overriding the pipeline's base
    /// directory.
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Directory for image artifacts specifically; takes precedence over
    /// [`output_dir`](Self::output_dir).
    #[must_use]
    pub fn images_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_output_dir = Some(dir.into());
        self
    }

    /// Scale factor for image output. Reported dimensions equal the
    /// unscaled render's dimensions multiplied by this factor.
    #[must_use]
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Path to an engine style/config file whose contents are injected
    /// into the diagram source before rendering. Config edits change the
    /// fingerprint and therefore invalidate cached artifacts.
    #[must_use]
    pub fn config(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = Some(path.into());
        self
    }

    /// The raw (pre-normalization) diagram source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The requested output format.
    #[must_use]
    pub fn format(&self) -> DiagramFormat {
        self.format
    }

    /// The diagram variant.
    #[must_use]
    pub fn variant(&self) -> DiagramVariant {
        self.variant
    }
}
