//! Report dispatch: pick the renderer for the data type and write the file.
//!
//! JSON goes through the in-process PDF pipeline
//! (document -> layout -> paginate -> printpdf). Markdown is handed to an
//! external renderer. Either way the output only appears at its final path
//! once it is complete.

use super::document::ReportDocument;
use super::html::MarkdownRenderer;
use super::layout::LayoutEngine;
use super::pdf::{paginate, write_pdf};
use super::style::Theme;
use crate::error::ToolError;
use crate::types::DataType;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_NAME: &str = "report";
pub const DEFAULT_HTML_TITLE: &str = "Generated Report";

/// Everything one `report` run needs besides the theme and renderer.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub data: String,
    pub data_type: DataType,
    /// Output file name without extension.
    pub output_name: String,
    pub output_dir: PathBuf,
    /// Page title for HTML output.
    pub title: String,
}

impl ReportRequest {
    pub fn new(data: impl Into<String>, data_type: DataType) -> Self {
        ReportRequest {
            data: data.into(),
            data_type,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            output_dir: PathBuf::from("."),
            title: DEFAULT_HTML_TITLE.to_string(),
        }
    }

    /// `{output_dir}/{output_name}.{pdf|html}`
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.{}", self.output_name, self.data_type.extension()))
    }
}

/// Render the request and return the path of the written file.
pub fn generate_report(
    request: &ReportRequest,
    theme: &Theme,
    renderer: &dyn MarkdownRenderer,
    now: DateTime<Utc>,
) -> Result<PathBuf, ToolError> {
    info!("Starting {} report generation", request.data_type);
    debug!("Output path: {}", request.output_path().display());

    let path = match request.data_type {
        DataType::Json => generate_pdf(request, theme, now)?,
        DataType::Markdown => generate_html(request, renderer)?,
    };

    info!("Report generated successfully: {}", path.display());
    Ok(path)
}

/// Parse, lay out and serialize a JSON report into PDF bytes.
pub fn render_json(data: &str, theme: &Theme, now: DateTime<Utc>) -> Result<Vec<u8>, ToolError> {
    if data.trim().is_empty() {
        return Err(ToolError::Validation("No json content provided".to_string()));
    }

    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| ToolError::Validation(format!("Invalid JSON data: {}", e)))?;
    let doc = ReportDocument::from_value(value)?;
    info!("Building PDF '{}' with {} sections", doc.title, doc.sections.len());

    let story = LayoutEngine::new(theme).build(&doc, now);
    let pages = paginate(&story, theme);
    let text_runs: usize = pages.iter().map(|p| p.texts().count()).sum();
    debug!("Laid out {} blocks over {} pages ({} text runs)", story.len(), pages.len(), text_runs);

    write_pdf(&doc.title, &pages, theme)
}

fn generate_pdf(request: &ReportRequest, theme: &Theme, now: DateTime<Utc>) -> Result<PathBuf, ToolError> {
    let bytes = render_json(&request.data, theme, now)?;
    let path = request.output_path();
    write_atomically(&path, &bytes)?;
    Ok(path)
}

fn generate_html(request: &ReportRequest, renderer: &dyn MarkdownRenderer) -> Result<PathBuf, ToolError> {
    if !renderer.is_available() {
        return Err(ToolError::Config(format!("{} is not installed or not available in PATH", renderer.name())));
    }
    if request.data.trim().is_empty() {
        return Err(ToolError::Validation("No markdown content provided".to_string()));
    }

    // Step 1: Markdown source in a scratch file
    let mut markdown = tempfile::Builder::new()
        .prefix("report-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| ToolError::io(std::env::temp_dir(), e))?;
    markdown.write_all(request.data.as_bytes()).map_err(|e| ToolError::io(markdown.path(), e))?;
    markdown.flush().map_err(|e| ToolError::io(markdown.path(), e))?;

    // Step 2: Render into a staging directory next to the destination
    let dir = ensure_dir(&request.output_dir)?;
    let staging = tempfile::Builder::new()
        .prefix(".report-staging-")
        .tempdir_in(&dir)
        .map_err(|e| ToolError::io(&dir, e))?;
    let staged = staging.path().join(format!("{}.html", request.output_name));
    renderer.render(markdown.path(), &staged, &request.title)?;

    // Step 3: Move the finished file into place
    let path = request.output_path();
    fs::rename(&staged, &path).map_err(|e| ToolError::io(&path, e))?;

    let markdown_path = markdown.path().to_path_buf();
    if let Err(e) = markdown.close() {
        warn!("Could not remove temporary file {}: {}", markdown_path.display(), e);
    }
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<PathBuf, ToolError> {
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    fs::create_dir_all(dir).map_err(|e| ToolError::io(dir, e))?;
    Ok(dir.to_path_buf())
}

/// Write `bytes` to `path` through a temporary file in the same directory.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ToolError> {
    let dir = ensure_dir(path.parent().unwrap_or(Path::new(".")))?;
    let mut file = tempfile::NamedTempFile::new_in(&dir).map_err(|e| ToolError::io(&dir, e))?;
    file.write_all(bytes).map_err(|e| ToolError::io(file.path(), e))?;
    file.persist(path).map_err(|e| ToolError::io(path, e.error))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    /// Stand-in renderer that wraps the Markdown in a minimal page.
    struct FakeRenderer {
        available: bool,
        fail: bool,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRenderer {
        fn new(available: bool) -> Self {
            FakeRenderer { available, fail: false, calls: RefCell::new(Vec::new()) }
        }
    }

    impl MarkdownRenderer for FakeRenderer {
        fn name(&self) -> &str {
            "fake-grip"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn render(&self, markdown: &Path, output: &Path, title: &str) -> Result<(), ToolError> {
            self.calls.borrow_mut().push(title.to_string());
            if self.fail {
                return Err(ToolError::Renderer("fake-grip exited with 1".to_string()));
            }
            let body = fs::read_to_string(markdown).unwrap();
            fs::write(output, format!("<html><title>{}</title><body>{}</body></html>", title, body)).unwrap();
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap()
    }

    fn request(dir: &Path, data: &str, data_type: DataType) -> ReportRequest {
        ReportRequest { output_dir: dir.to_path_buf(), ..ReportRequest::new(data, data_type) }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> =
            fs::read_dir(dir).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_json_report_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let data = r#"{"title": "Pipeline Report", "commit_information": {"sha": "abc123"}, "status": "success"}"#;
        let req = request(dir.path(), data, DataType::Json);

        let path = generate_report(&req, &Theme::default(), &FakeRenderer::new(true), now()).unwrap();
        assert_eq!(path, dir.path().join("report.pdf"));
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(entries(dir.path()), vec!["report.pdf"]);
    }

    #[test]
    fn test_blank_json_is_rejected_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), "  \n", DataType::Json);
        let err = generate_report(&req, &Theme::default(), &FakeRenderer::new(true), now()).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ref m) if m == "No json content provided"));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_malformed_json_is_rejected_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), r#"{"a": "#, DataType::Json);
        let err = generate_report(&req, &Theme::default(), &FakeRenderer::new(true), now()).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_json_must_be_an_object() {
        let err = render_json("[1, 2, 3]", &Theme::default(), now()).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
    }

    #[test]
    fn test_repeated_renders_are_stable() {
        let data = r#"{"title": "T", "details": {"start_time": "2024-01-15T10:30:00Z"}, "items": ["a", "b"]}"#;
        let first = render_json(data, &Theme::default(), now()).unwrap();
        let second = render_json(data, &Theme::default(), now()).unwrap();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn test_markdown_report_uses_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(dir.path(), "# Results\n\nAll green.", DataType::Markdown);
        req.output_name = "summary".to_string();
        let renderer = FakeRenderer::new(true);

        let path = generate_report(&req, &Theme::default(), &renderer, now()).unwrap();
        assert_eq!(path, dir.path().join("summary.html"));
        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("All green."));
        assert_eq!(renderer.calls.borrow().as_slice(), ["Generated Report".to_string()]);
        assert_eq!(entries(dir.path()), vec!["summary.html"]);
    }

    #[test]
    fn test_markdown_without_renderer_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), "# Hi", DataType::Markdown);
        let renderer = FakeRenderer::new(false);

        let err = generate_report(&req, &Theme::default(), &renderer, now()).unwrap_err();
        assert!(matches!(err, ToolError::Config(ref m) if m.contains("fake-grip is not installed")));
        assert!(renderer.calls.borrow().is_empty());
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_blank_markdown_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), "", DataType::Markdown);
        let err = generate_report(&req, &Theme::default(), &FakeRenderer::new(true), now()).unwrap_err();
        assert!(matches!(err, ToolError::Validation(ref m) if m == "No markdown content provided"));
    }

    #[test]
    fn test_renderer_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let req = request(dir.path(), "# Hi", DataType::Markdown);
        let renderer = FakeRenderer { fail: true, ..FakeRenderer::new(true) };

        let err = generate_report(&req, &Theme::default(), &renderer, now()).unwrap_err();
        assert!(matches!(err, ToolError::Renderer(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("reports");
        let req = request(&nested, r#"{"status": "ok"}"#, DataType::Json);
        let path = generate_report(&req, &Theme::default(), &FakeRenderer::new(true), now()).unwrap();
        assert!(path.exists());
    }
}
