//! Pipeline orchestrator.
//!
//! Composes normalization, fingerprinting, target resolution, caching,
//! rendering, artifact writing, and metadata extraction into a single
//! `process` call per diagram occurrence. The filesystem is the only
//! durable state: artifacts plus their cache markers.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;

use dia_cache::{CachedEntry, DiagramCache, MarkerCache};

use crate::engine::RenderEngine;
use crate::error::DiagramError;
use crate::fingerprint::Fingerprint;
use crate::request::DiagramRequest;
use crate::{meta, prepare, target};

/// Result of processing one diagram occurrence.
///
/// The caller (the document model integration) turns this into an image
/// or literal node; the pipeline performs no tree insertion itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutput {
    /// Rendered image artifact on disk.
    Image {
        path: PathBuf,
        /// Pixel width; `None` when unknown or when the pipeline was
        /// built with `emit_sizes(false)`.
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Literal text payload; nothing was written to disk.
    Literal(String),
}

/// Diagram conversion pipeline.
///
/// One value per document-build run. Requests for distinct target paths
/// proceed in parallel; requests resolving to the same path are
/// serialized so the engine runs at most once per fingerprint.
///
/// # Example
///
/// ```ignore
/// use dia_pipeline::{CommandEngine, DiagramFormat, DiagramRequest, DiagramVariant, Pipeline};
///
/// let pipeline = Pipeline::new(CommandEngine::plantuml()).base_dir("build");
/// let request = DiagramRequest::new("A -> B", DiagramVariant::Uml, DiagramFormat::Png);
/// let output = pipeline.process(&request)?;
/// ```
pub struct Pipeline {
    engine: Box<dyn RenderEngine>,
    cache: Box<dyn DiagramCache>,
    base_dir: PathBuf,
    emit_sizes: bool,
    /// Per-target locks guarding the check-render-write-record sequence.
    /// Scoped to this pipeline value; discarded with it.
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl Pipeline {
    /// Pipeline using the given engine, marker-file caching, and the
    /// current directory as base.
    #[must_use]
    pub fn new(engine: impl RenderEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
            cache: Box::new(MarkerCache),
            base_dir: PathBuf::from("."),
            emit_sizes: true,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Base directory for artifacts when the request carries no directory
    /// override (typically the document's own directory).
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Replace the cache implementation (e.g. [`dia_cache::NullCache`]
    /// to force re-renders).
    #[must_use]
    pub fn cache(mut self, cache: impl DiagramCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    /// Whether image results carry pixel dimensions. Disable for
    /// consuming contexts that do not use pixel sizing; artifacts are
    /// still rendered and cached identically.
    #[must_use]
    pub fn emit_sizes(mut self, emit: bool) -> Self {
        self.emit_sizes = emit;
        self
    }

    /// Convert one diagram occurrence.
    ///
    /// Literal-format requests return the source text directly and touch
    /// neither the filesystem nor the cache. Image-format requests render
    /// through the engine unless an intact artifact with a matching
    /// fingerprint already exists at the resolved target.
    pub fn process(&self, request: &DiagramRequest) -> Result<DiagramOutput, DiagramError> {
        let variant = request.variant;
        let format = request.format;

        if !variant.supports(format) {
            return Err(DiagramError::UnsupportedFormat {
                variant: variant.as_str(),
                format: format.as_str(),
                supported: variant
                    .supported_formats()
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        if format.is_literal() {
            tracing::debug!("literal format, returning source verbatim");
            return Ok(DiagramOutput::Literal(request.source.clone()));
        }

        let normalized = prepare::normalize(request)?;
        let fingerprint = Fingerprint::compute(variant, format, request.scale, &normalized);
        let resolved = target::resolve(request, &fingerprint, &self.base_dir)?;

        // Critical section per target path: check, render, write, record
        let lock = self.target_lock(&resolved.path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = self.cache.lookup(&resolved.path, fingerprint.as_hex()) {
            tracing::debug!("up to date, skipping render: {}", resolved.path.display());
            return Ok(self.image_output(resolved.path, entry.width, entry.height));
        }

        tracing::info!("rendering {} diagram to {}", variant.as_str(), resolved.path.display());
        let bytes = self.engine.render(&normalized, variant, format)?;
        write_artifact(&resolved.path, &bytes)?;

        let dimensions = meta::extract(&bytes, format);
        if dimensions.is_none() {
            tracing::warn!(
                "could not determine dimensions of {}",
                resolved.path.display()
            );
        }
        let (width, height) = match dimensions {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };

        self.cache.record(
            &resolved.path,
            &CachedEntry::new(fingerprint.as_hex(), width, height),
        );

        Ok(self.image_output(resolved.path, width, height))
    }

    /// Convert a batch of independent diagram occurrences in parallel.
    ///
    /// Failures are collected per request rather than aborting the batch;
    /// `rendered` and `errors` carry the original request indices.
    #[must_use]
    pub fn process_all(&self, requests: &[DiagramRequest]) -> BatchOutcome {
        let results: Vec<(usize, Result<DiagramOutput, DiagramError>)> = requests
            .par_iter()
            .enumerate()
            .map(|(index, request)| (index, self.process(request)))
            .collect();

        let mut rendered = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for (index, result) in results {
            match result {
                Ok(output) => rendered.push(ProcessedDiagram { index, output }),
                Err(error) => errors.push(BatchError { index, error }),
            }
        }
        BatchOutcome { rendered, errors }
    }

    fn image_output(&self, path: PathBuf, width: Option<u32>, height: Option<u32>) -> DiagramOutput {
        if self.emit_sizes {
            DiagramOutput::Image {
                path,
                width,
                height,
            }
        } else {
            DiagramOutput::Image {
                path,
                width: None,
                height: None,
            }
        }
    }

    fn target_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_owned()).or_default())
    }
}

/// Write artifact bytes via a temporary file in the destination
/// directory, then atomically move into place. A cancelled or failed
/// build can therefore never leave a partial artifact behind a recorded
/// fingerprint.
fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), DiagramError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| DiagramError::io("create temporary file in", dir, e))?;
    tmp.write_all(bytes)
        .map_err(|e| DiagramError::io("write artifact", path, e))?;
    tmp.persist(path)
        .map_err(|e| DiagramError::io("persist artifact", path, e.error))?;
    Ok(())
}

/// One successfully processed diagram within a batch.
#[derive(Debug)]
pub struct ProcessedDiagram {
    /// Index into the request slice passed to `process_all`.
    pub index: usize,
    pub output: DiagramOutput,
}

/// One failed diagram within a batch.
#[derive(Debug, thiserror::Error)]
#[error("diagram {index}: {error}")]
pub struct BatchError {
    pub index: usize,
    pub error: DiagramError,
}

/// Partial result of a batch conversion: successes alongside per-request
/// failures.
#[derive(Debug)]
pub struct BatchOutcome {
    pub rendered: Vec<ProcessedDiagram>,
    pub errors: Vec<BatchError>,
}
