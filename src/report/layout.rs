//! Report layout: from `ReportDocument` to a flat story of blocks.
//!
//! All four table strategies go through one `TableBuilder`; they differ only
//! in how rows are produced. Label widths are computed once per table, and
//! label/value and merged tables share one document-wide label width so
//! their columns line up across sections.

use super::document::{ReportDocument, Section, SectionPayload};
use super::format::{display_label, format_value, generated_on};
use super::style::Theme;
use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

/// One drawable unit of the report, in story order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Divider(DividerKind),
    Heading(String),
    Table(TableLayout),
    /// Short scalar in a highlighted single-cell box.
    ValueBox(String),
    Paragraph(String),
    /// Vertical gap in points.
    Spacer(f32),
    Footer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerKind {
    Title,
    Footer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    LabelValue,
    Merged,
    Grid,
    Enumerated,
}

/// A label cell and the value rows it spans. Label/value tables have one
/// value per group; merged tables may have several.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub label: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    /// Label column plus value column.
    TwoColumn(Vec<RowGroup>),
    /// Header row plus uniform rows.
    Grid { header: Vec<String>, rows: Vec<Vec<String>> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    pub kind: TableKind,
    pub column_widths: Vec<f32>,
    pub body: TableBody,
}

impl TableLayout {
    /// Number of physical rows, header included.
    pub fn row_count(&self) -> usize {
        match &self.body {
            TableBody::TwoColumn(groups) => groups.iter().map(|g| g.values.len()).sum(),
            TableBody::Grid { rows, .. } => rows.len() + 1,
        }
    }
}

/// Shared column-width policy and table assembly.
pub struct TableBuilder<'a> {
    theme: &'a Theme,
}

impl<'a> TableBuilder<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        TableBuilder { theme }
    }

    /// `clamp(longest * char_width + padding, min, max)`, never wider than the content.
    pub fn label_width<'s>(&self, labels: impl IntoIterator<Item = &'s str>) -> f32 {
        let page = &self.theme.page;
        let longest = labels.into_iter().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let wanted = longest as f32 * page.label_char_width + page.label_padding;
        let max = page.max_label_width.max(page.min_label_width).min(page.content_width);
        wanted.max(page.min_label_width).min(max)
    }

    /// Two-column table with a fixed label width. Groups with no values are dropped.
    pub fn two_column(&self, kind: TableKind, label_width: f32, groups: Vec<RowGroup>) -> Option<TableLayout> {
        let groups: Vec<RowGroup> = groups.into_iter().filter(|g| !g.values.is_empty()).collect();
        if groups.is_empty() {
            return None;
        }
        let value_width = self.theme.page.content_width - label_width;
        Some(TableLayout { kind, column_widths: vec![label_width, value_width], body: TableBody::TwoColumn(groups) })
    }

    /// Grid with equal column widths.
    pub fn grid(&self, header: Vec<String>, rows: Vec<Vec<String>>) -> Option<TableLayout> {
        if header.is_empty() {
            return None;
        }
        let width = self.theme.page.content_width / header.len() as f32;
        Some(TableLayout {
            kind: TableKind::Grid,
            column_widths: vec![width; header.len()],
            body: TableBody::Grid { header, rows },
        })
    }
}

/// Builds the block story for a document.
pub struct LayoutEngine<'a> {
    theme: &'a Theme,
    tables: TableBuilder<'a>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        LayoutEngine { theme, tables: TableBuilder::new(theme) }
    }

    /// Title, sections in document order, footer stamped with `now`.
    pub fn build(&self, doc: &ReportDocument, now: DateTime<Utc>) -> Vec<Block> {
        let mut story = Vec::new();

        story.push(Block::Title(doc.title.clone()));
        story.push(Block::Spacer(15.0));
        story.push(Block::Divider(DividerKind::Title));
        story.push(Block::Spacer(10.0));

        let shared_label_width = self.shared_label_width(doc);
        for section in &doc.sections {
            story.extend(self.section_blocks(section, shared_label_width));
        }

        story.push(Block::Spacer(30.0));
        story.push(Block::Divider(DividerKind::Footer));
        story.push(Block::Footer(generated_on(now, &self.theme.display_zone)));

        story
    }

    /// One label width for every label/value and merged table in the document.
    fn shared_label_width(&self, doc: &ReportDocument) -> f32 {
        let labels: Vec<String> = doc
            .sections
            .iter()
            .flat_map(|section| match &section.payload {
                SectionPayload::KeyValue(rows) => rows.iter().map(|(k, _)| display_label(k)).collect::<Vec<_>>(),
                SectionPayload::MergedList(groups) => groups.iter().map(|g| display_label(&g.key)).collect(),
                _ => Vec::new(),
            })
            .collect();
        self.tables.label_width(labels.iter().map(|s| s.as_str()))
    }

    fn section_blocks(&self, section: &Section, shared_label_width: f32) -> Vec<Block> {
        let zone = &self.theme.display_zone;
        let heading = display_label(&section.name);

        let body = match &section.payload {
            SectionPayload::KeyValue(rows) => {
                let groups = rows
                    .iter()
                    .map(|(key, value)| RowGroup {
                        label: display_label(key),
                        values: vec![format_value(key, value, zone)],
                    })
                    .collect();
                self.tables.two_column(TableKind::LabelValue, shared_label_width, groups).map(Block::Table)
            }
            SectionPayload::MergedList(merged) => {
                let groups = merged
                    .iter()
                    .map(|g| RowGroup {
                        label: display_label(&g.key),
                        values: g.values.iter().map(|v| format_value(&g.key, v, zone)).collect(),
                    })
                    .collect();
                self.tables.two_column(TableKind::Merged, shared_label_width, groups).map(Block::Table)
            }
            SectionPayload::UniformRecords { columns, rows } => {
                let header = columns.iter().map(|c| display_label(c)).collect();
                let cells = rows
                    .iter()
                    .map(|row| columns.iter().zip(row).map(|(c, v)| format_value(c, v, zone)).collect())
                    .collect();
                self.tables.grid(header, cells).map(Block::Table)
            }
            SectionPayload::EnumeratedList(items) => {
                let groups: Vec<RowGroup> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| RowGroup {
                        label: format!("{} {}", heading, i + 1),
                        values: vec![format_value(&section.name, item, zone)],
                    })
                    .collect();
                let width = self.tables.label_width(groups.iter().map(|g| g.label.as_str()));
                self.tables.two_column(TableKind::Enumerated, width, groups).map(Block::Table)
            }
            SectionPayload::Scalar(value) => {
                let text = format_value(&section.name, value, zone);
                if text.chars().count() > self.theme.value_box_max_chars {
                    Some(Block::Paragraph(text))
                } else {
                    Some(Block::ValueBox(text))
                }
            }
        };

        match body {
            Some(block) => vec![Block::Heading(heading), block, Block::Spacer(8.0)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;
