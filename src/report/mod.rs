//! Report rendering - JSON to PDF, Markdown to HTML.
//!
//! This module handles:
//! - Classifying JSON sections into table strategies
//! - Formatting labels, values and timestamps
//! - Laying out the block story and paginating it
//! - Writing PDF through `printpdf`
//! - Delegating Markdown to an external renderer
//!
//! # Module Organization
//!
//! - `document` - Report model and per-section strategy selection
//! - `format` - Labels, timestamps and value text
//! - `style` - Theme (palette, table metrics, page geometry)
//! - `layout` - Block story and the shared table builder
//! - `pdf` - Pagination into draw ops and the `printpdf` backend
//! - `html` - External Markdown renderer seam
//! - `generate` - Dispatch on data type and atomic output

mod document;
mod format;
mod generate;
mod html;
mod layout;
mod pdf;
mod style;

// Re-export the theme for config loading
pub use style::Theme;

// Re-export the entry points used by main
pub use generate::{generate_report, ReportRequest};
pub use html::GripRenderer;
