//! Diagram-to-artifact rendering pipeline.
//!
//! Converts embedded diagram-description text into rendered image files
//! or literal text, once per diagram occurrence during document
//! processing. The pipeline normalizes the source, computes a content
//! fingerprint, resolves the output path, skips the render when an intact
//! up-to-date artifact exists, and otherwise dispatches to an external
//! rendering engine and records the result for the next run.
//!
//! # Architecture
//!
//! - [`variant`]: diagram variants, output formats, capability table
//! - [`request`]: the immutable per-occurrence [`DiagramRequest`]
//! - [`prepare`]: source normalization (wrapping, salt prelude, config
//!   and scale injection) — internal
//! - [`fingerprint`]: content hashing for render-equivalence
//! - [`target`]: output path resolution with directory precedence
//! - [`engine`]: the [`RenderEngine`] boundary and [`CommandEngine`]
//! - [`meta`]: PNG/SVG dimension extraction without image decoding
//! - [`pipeline`]: the [`Pipeline`] orchestrator and batch API
//!
//! Caching lives in the `dia-cache` crate: each artifact's fingerprint is
//! persisted in an adjacent marker file, and the filesystem is the only
//! source of truth across runs.
//!
//! # Example
//!
//! ```ignore
//! use dia_pipeline::{CommandEngine, DiagramFormat, DiagramRequest, DiagramVariant, Pipeline};
//!
//! let pipeline = Pipeline::new(CommandEngine::plantuml()).base_dir("build");
//!
//! let request = DiagramRequest::new("A -> B", DiagramVariant::Uml, DiagramFormat::Png)
//!     .target("overview");
//!
//! match pipeline.process(&request)? {
//!     dia_pipeline::DiagramOutput::Image { path, width, height } => { /* insert image node */ }
//!     dia_pipeline::DiagramOutput::Literal(text) => { /* insert literal block */ }
//! }
//! ```

mod engine;
mod error;
mod fingerprint;
mod meta;
mod pipeline;
mod prepare;
mod request;
mod target;
mod variant;

pub use engine::{CommandEngine, EngineError, RenderEngine};
pub use error::DiagramError;
pub use fingerprint::Fingerprint;
pub use meta::extract as extract_dimensions;
pub use pipeline::{BatchError, BatchOutcome, DiagramOutput, Pipeline, ProcessedDiagram};
pub use request::DiagramRequest;
pub use target::ResolvedTarget;
pub use variant::{DiagramFormat, DiagramVariant};
