//! Error taxonomy shared by both subcommands.
//!
//! Configuration problems and validation problems are both fatal; they are
//! kept apart so the message prefix tells the operator which input to fix.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Unknown environment or category, malformed mapping/theme file,
    /// unsupported data type, missing external renderer.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Blank content, malformed JSON, wrong JSON shape.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The PDF backend refused the document.
    #[error("PDF rendering failed: {0}")]
    Render(String),

    /// The external Markdown renderer could not be launched or exited non-zero.
    #[error("Markdown renderer failed: {0}")]
    Renderer(String),
}

impl ToolError {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        ToolError::Io { path: path.as_ref().to_path_buf(), source }
    }
}
