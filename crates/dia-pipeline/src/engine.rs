//! Render engine boundary.
//!
//! The external rendering engine is a black box behind the
//! [`RenderEngine`] trait: diagram source in, artifact bytes out,
//! synchronously. [`CommandEngine`] is the shipped implementation,
//! spawning a command-line tool per render; tests substitute stub
//! engines.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::variant::{DiagramFormat, DiagramVariant};

/// Failures at the engine boundary.
///
/// Diagnostics from the engine are captured verbatim and surfaced;
/// nothing here is retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine executable could not be started.
    #[error("failed to launch render engine '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// Engine ran but reported failure.
    #[error("render engine '{command}' failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Engine exited successfully but produced no output.
    #[error("render engine '{command}' produced no output")]
    EmptyOutput { command: String },

    /// Pipe I/O with the engine process failed.
    #[error("i/o error talking to render engine '{command}': {source}")]
    Io {
        command: String,
        source: std::io::Error,
    },
}

/// External rendering engine: normalized source text in, artifact bytes
/// out.
///
/// Implementations must be callable from multiple threads; the pipeline
/// invokes `render` concurrently for unrelated targets.
pub trait RenderEngine: Send + Sync {
    /// Render `source` to the requested format.
    fn render(
        &self,
        source: &str,
        variant: DiagramVariant,
        format: DiagramFormat,
    ) -> Result<Vec<u8>, EngineError>;
}

/// [`RenderEngine`] backed by a command-line tool.
///
/// Invokes `{program} {args...} -pipe -t{format}`, writes the diagram
/// source to stdin, and reads the artifact from stdout. stderr is
/// captured for diagnostics. Where the tool is installed is a deployment
/// concern; the default constructor assumes a `plantuml` launcher on
/// `PATH`.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    /// Engine using the given executable.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Engine using the standard `plantuml` launcher.
    #[must_use]
    pub fn plantuml() -> Self {
        Self::new("plantuml")
    }

    /// Extra arguments placed before the pipe/format flags.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn io_err(&self, source: std::io::Error) -> EngineError {
        EngineError::Io {
            command: self.program.clone(),
            source,
        }
    }
}

impl RenderEngine for CommandEngine {
    fn render(
        &self,
        source: &str,
        _variant: DiagramVariant,
        format: DiagramFormat,
    ) -> Result<Vec<u8>, EngineError> {
        tracing::debug!("rendering {} via '{}'", format.as_str(), self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("-pipe")
            .arg(format!("-t{}", format.as_str()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::Spawn {
                command: self.program.clone(),
                source: e,
            })?;

        // Close stdin after writing so the engine sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| self.io_err(e))?;
        }

        let output = child.wait_with_output().map_err(|e| self.io_err(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                command: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        if output.stdout.is_empty() {
            return Err(EngineError::EmptyOutput {
                command: self.program.clone(),
            });
        }

        Ok(output.stdout)
    }
}
