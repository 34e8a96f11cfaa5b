/// External Markdown-to-HTML rendering
///
/// HTML output is delegated to a command-line renderer (grip by default).
/// The `MarkdownRenderer` trait is the seam tests use to swap in a fake.
use crate::error::ToolError;
use log::{debug, info};
use std::path::Path;
use std::process::Command;

pub const DEFAULT_RENDERER: &str = "grip";

pub trait MarkdownRenderer {
    /// Name shown in diagnostics.
    fn name(&self) -> &str;

    /// Whether the renderer can be launched at all.
    fn is_available(&self) -> bool;

    /// Convert the Markdown file at `markdown` into an HTML file at `output`.
    fn render(&self, markdown: &Path, output: &Path, title: &str) -> Result<(), ToolError>;
}

/// Renders through `grip <md> --export <out> --title <title>`.
#[derive(Debug, Clone)]
pub struct GripRenderer {
    program: String,
}

impl GripRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        GripRenderer { program: program.into() }
    }
}

impl Default for GripRenderer {
    fn default() -> Self {
        GripRenderer::new(DEFAULT_RENDERER)
    }
}

impl MarkdownRenderer for GripRenderer {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program).arg("--version").output().map(|o| o.status.success()).unwrap_or(false)
    }

    fn render(&self, markdown: &Path, output: &Path, title: &str) -> Result<(), ToolError> {
        info!("Running {} {} --export {} --title {:?}", self.program, markdown.display(), output.display(), title);

        let result = Command::new(&self.program)
            .arg(markdown)
            .arg("--export")
            .arg(output)
            .arg("--title")
            .arg(title)
            .output()
            .map_err(|e| ToolError::Renderer(format!("could not launch {}: {}", self.program, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ToolError::Renderer(format!("{} exited with {}: {}", self.program, result.status, stderr.trim())));
        }
        debug!("{} stdout: {}", self.program, String::from_utf8_lossy(&result.stdout).trim());

        if !output.exists() {
            return Err(ToolError::Renderer(format!("{} reported success but wrote no file", self.program)));
        }

        info!("{} HTML generation completed", self.program);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let renderer = GripRenderer::new("pipeline-kit-no-such-renderer");
        assert!(!renderer.is_available());
    }

    #[test]
    fn test_missing_program_fails_to_render() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("in.md");
        std::fs::write(&md, "# Hi").unwrap();
        let renderer = GripRenderer::new("pipeline-kit-no-such-renderer");

        let err = renderer.render(&md, &dir.path().join("out.html"), "T").unwrap_err();
        assert!(matches!(err, ToolError::Renderer(_)));
        assert!(err.to_string().contains("could not launch"));
    }

    #[test]
    fn test_default_program_is_grip() {
        assert_eq!(GripRenderer::default().name(), "grip");
    }
}
