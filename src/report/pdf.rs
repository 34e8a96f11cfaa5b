//! PDF output: pagination of the block story and the `printpdf` backend.
//!
//! `paginate` flows blocks top to bottom over A4 pages and emits
//! backend-neutral `DrawOp`s (coordinates in points, measured from the top
//! of the page). `write_pdf` replays those ops onto a `printpdf` document
//! using the built-in Helvetica faces.

use super::layout::{Block, DividerKind, RowGroup, TableBody, TableKind, TableLayout};
use super::style::{HexColor, Padding, TextStyle, Theme};
use crate::error::ToolError;
use log::debug;
use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, Color, Line, Mm, PdfDocument, Point, Rect, Rgb};

/// Line height as a multiple of font size for table cells.
const CELL_LEADING: f32 = 1.2;

/// Baseline offset below the top of a line box, as a multiple of font size.
const ASCENT: f32 = 0.85;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { x: f32, y: f32, w: f32, h: f32, color: HexColor },
    StrokeRect { x: f32, y: f32, w: f32, h: f32, color: HexColor, width: f32 },
    Line { x1: f32, y1: f32, x2: f32, y2: f32, color: HexColor, width: f32 },
    /// `y` is the text baseline.
    Text { x: f32, y: f32, size: f32, bold: bool, color: HexColor, text: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Every text run on the page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

//
// Text metrics
//

/// Approximate Helvetica advance width of `ch`, in em.
fn glyph_width(ch: char, bold: bool) -> f32 {
    let regular = match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | ']' | '\\' | 'f' | 't' => 0.278,
        '\'' | '|' | 'i' | 'j' | 'l' => 0.222,
        '(' | ')' | '-' | 'r' | '{' | '}' | '`' => 0.333,
        '0'..='9' | '$' | '?' | '_' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 0.556,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' | '"' | '*' => 0.5,
        'm' | 'M' => 0.833,
        'w' | 'W' | '%' => 0.889,
        '@' => 1.015,
        'A'..='Z' => 0.667,
        _ => 0.6,
    };
    if bold { regular * 1.06 } else { regular }
}

/// Estimated rendered width of `text` in points.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    text.chars().map(|c| glyph_width(c, bold)).sum::<f32>() * size
}

/// Restrict text to what the built-in (WinAnsi) fonts can show.
fn sanitize(text: &str) -> String {
    text.chars()
        .flat_map(|c| match c {
            '\t' => vec![' '; 4],
            '\n' => vec!['\n'],
            ' '..='~' | '\u{A0}'..='\u{FF}' => vec![c],
            '\u{2018}' | '\u{2019}' => vec!['\''],
            '\u{201C}' | '\u{201D}' => vec!['"'],
            '\u{2013}' | '\u{2014}' => vec!['-'],
            '\r' => vec![],
            _ => vec!['?'],
        })
        .collect()
}

/// Wrap `text` to `max_width` points.
///
/// Explicit newlines are kept, leading indentation of each source line is
/// repeated on its continuation lines, and words wider than a line are
/// broken by character. Always returns at least one line.
pub fn wrap_text(text: &str, max_width: f32, size: f32, bold: bool) -> Vec<String> {
    let clean = sanitize(text);
    let mut lines = Vec::new();

    for source_line in clean.split('\n') {
        let body = source_line.trim_start_matches(' ');
        let indent = &source_line[..source_line.len() - body.len()];
        let indent_width = text_width(indent, size, bold);
        let available = (max_width - indent_width).max(size);

        let mut current = String::new();
        for word in body.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() { word.to_string() } else { format!("{} {}", current, word) };
            if text_width(&candidate, size, bold) <= available {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(format!("{}{}", indent, current));
                current.clear();
            }
            // Hard-break words that cannot fit on a line of their own
            let mut piece = String::new();
            for ch in word.chars() {
                piece.push(ch);
                if text_width(&piece, size, bold) > available && piece.chars().count() > 1 {
                    piece.pop();
                    lines.push(format!("{}{}", indent, piece));
                    piece = ch.to_string();
                }
            }
            current = piece;
        }
        lines.push(format!("{}{}", indent, current));
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

//
// Pagination
//

/// A wrapped table cell ready to draw.
#[derive(Clone)]
struct CellText {
    lines: Vec<String>,
    size: f32,
    bold: bool,
    color: HexColor,
    padding: Padding,
}

impl CellText {
    fn new(text: &str, width: f32, size: f32, bold: bool, color: HexColor, padding: Padding) -> Self {
        let lines = wrap_text(text, width - padding.horizontal(), size, bold);
        CellText { lines, size, bold, color, padding }
    }

    fn leading(&self) -> f32 {
        self.size * CELL_LEADING
    }

    fn height(&self) -> f32 {
        self.padding.vertical() + self.content_height()
    }

    fn content_height(&self) -> f32 {
        self.lines.len() as f32 * self.leading()
    }

    /// How many lines fit in a cell of `height` points.
    fn lines_fitting(&self, height: f32) -> usize {
        ((height - self.padding.vertical()) / self.leading()).floor().max(0.0) as usize
    }

    /// Keep the first `at` lines and return the rest as a cell of its own.
    fn split_off(&mut self, at: usize) -> CellText {
        let rest = self.lines.split_off(at.min(self.lines.len()));
        CellText { lines: rest, ..*self }
    }

    /// A copy holding only the lines that fit in `height`.
    fn clipped(&self, height: f32) -> CellText {
        let mut head = self.clone();
        head.lines.truncate(self.lines_fitting(height).max(1));
        head
    }
}

#[derive(Clone, Copy)]
enum VAlign {
    Top,
    Middle,
}

struct Paginator<'a> {
    theme: &'a Theme,
    pages: Vec<Page>,
    cursor: f32,
}

impl<'a> Paginator<'a> {
    fn new(theme: &'a Theme) -> Self {
        Paginator { theme, pages: vec![Page::default()], cursor: theme.page.margin }
    }

    fn top(&self) -> f32 {
        self.theme.page.margin
    }

    fn bottom(&self) -> f32 {
        self.top() + self.theme.page.frame_height()
    }

    fn remaining(&self) -> f32 {
        self.bottom() - self.cursor
    }

    fn frame_height(&self) -> f32 {
        self.theme.page.frame_height()
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= self.top()
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.top();
    }

    /// Start a new page unless `height` fits (or we are already at the top).
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn left(&self) -> f32 {
        self.theme.page.content_left()
    }

    fn width(&self) -> f32 {
        self.theme.page.content_width
    }

    fn layout(mut self, story: &[Block]) -> Vec<Page> {
        for block in story {
            match block {
                Block::Title(text) => {
                    let style = self.theme.text.title;
                    let color = self.theme.palette.primary;
                    self.styled_text(text, style, true, color, true);
                }
                Block::Heading(text) => {
                    let style = self.theme.text.heading;
                    // Keep a heading with at least two lines of what follows
                    self.ensure(style.space_before + style.leading * 3.0 + style.space_after);
                    let color = self.theme.palette.secondary;
                    self.styled_text(text, style, true, color, false);
                }
                Block::Paragraph(text) => {
                    let style = self.theme.text.normal;
                    let color = self.theme.palette.text;
                    self.styled_text(text, style, false, color, false);
                }
                Block::Footer(text) => {
                    let style = self.theme.text.footer;
                    let color = self.theme.palette.border;
                    self.styled_text(text, style, false, color, true);
                }
                Block::Spacer(height) => self.spacer(*height),
                Block::Divider(kind) => self.divider(*kind),
                Block::ValueBox(text) => self.value_box(text),
                Block::Table(table) => self.table(table),
            }
        }
        self.pages
    }

    fn spacer(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        if height >= self.remaining() {
            self.new_page();
        } else {
            self.cursor += height;
        }
    }

    /// Paragraph-like text that may split across pages between lines.
    fn styled_text(&mut self, text: &str, style: TextStyle, bold: bool, color: HexColor, centered: bool) {
        let lines = wrap_text(text, self.width(), style.font_size, bold);

        if !self.at_page_top() {
            self.ensure(style.space_before + style.leading);
            if !self.at_page_top() {
                self.cursor += style.space_before;
            }
        }

        for line in lines {
            self.ensure(style.leading);
            if line.is_empty() {
                self.cursor += style.leading;
                continue;
            }
            let x = if centered {
                self.left() + ((self.width() - text_width(&line, style.font_size, bold)) / 2.0).max(0.0)
            } else {
                self.left()
            };
            let baseline = self.cursor + (style.leading - style.font_size) / 2.0 + style.font_size * ASCENT;
            self.push(DrawOp::Text { x, y: baseline, size: style.font_size, bold, color, text: line });
            self.cursor += style.leading;
        }

        self.cursor = (self.cursor + style.space_after).min(self.bottom());
    }

    fn divider(&mut self, kind: DividerKind) {
        self.ensure(1.0);
        let (x, w, y) = (self.left(), self.width(), self.cursor);
        let palette = &self.theme.palette;
        let (line_color, fill) = match kind {
            DividerKind::Title => (palette.primary, Some(palette.light_bg)),
            DividerKind::Footer => (palette.border, None),
        };
        if let Some(color) = fill {
            self.push(DrawOp::FillRect { x, y, w, h: 1.0, color });
        }
        self.push(DrawOp::Line { x1: x, y1: y, x2: x + w, y2: y, color: line_color, width: 1.0 });
        self.cursor += 1.0;
    }

    fn value_box(&mut self, text: &str) {
        let theme = self.theme;
        let table = &theme.table;
        let cell = CellText::new(
            text,
            self.width(),
            table.value_box_font_size,
            true,
            theme.palette.text,
            table.value_box_padding,
        );
        let height = cell.height();
        self.ensure(height);

        let (x, y, w) = (self.left(), self.cursor, self.width());
        self.push(DrawOp::FillRect { x, y, w, h: height, color: theme.palette.light_bg });
        self.draw_cell_text(&cell, x, y, height, VAlign::Top);
        self.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h: height,
            color: theme.palette.primary,
            width: table.value_box_border_width,
        });
        self.cursor += height;
    }

    fn draw_cell_text(&mut self, cell: &CellText, x: f32, y: f32, height: f32, valign: VAlign) {
        let leading = cell.size * CELL_LEADING;
        let top = match valign {
            VAlign::Top => y + cell.padding.top,
            VAlign::Middle => y + ((height - cell.content_height()) / 2.0).max(cell.padding.top),
        };
        for (i, line) in cell.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = top + i as f32 * leading + (leading - cell.size) / 2.0 + cell.size * ASCENT;
            self.push(DrawOp::Text {
                x: x + cell.padding.left,
                y: baseline,
                size: cell.size,
                bold: cell.bold,
                color: cell.color,
                text: line.clone(),
            });
        }
    }

    /// Background, text and grid border for one cell.
    fn cell(&mut self, cell: &CellText, x: f32, y: f32, w: f32, h: f32, bg: Option<HexColor>, valign: VAlign) {
        if let Some(color) = bg {
            self.push(DrawOp::FillRect { x, y, w, h, color });
        }
        self.draw_cell_text(cell, x, y, h, valign);
        self.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            color: self.theme.palette.border,
            width: self.theme.table.border_width,
        });
    }

    fn row_background(&self, row_index: usize) -> HexColor {
        if row_index % 2 == 0 { self.theme.palette.row_light } else { self.theme.palette.row_dark }
    }

    fn table(&mut self, table: &TableLayout) {
        debug!("Laying out {:?} table with {} rows", table.kind, table.row_count());
        match &table.body {
            TableBody::TwoColumn(groups) => self.two_column_table(table.kind, &table.column_widths, groups),
            TableBody::Grid { header, rows } => self.grid_table(&table.column_widths, header, rows),
        }
    }

    fn two_column_table(&mut self, kind: TableKind, widths: &[f32], groups: &[RowGroup]) {
        let (label_w, value_w) = match widths {
            [l, v, ..] => (*l, *v),
            _ => return,
        };
        let theme = self.theme;
        let (style, palette) = (&theme.table, &theme.palette);
        let value_color = if kind == TableKind::Enumerated { palette.text } else { HexColor::BLACK };
        let label_valign = if kind == TableKind::Merged { VAlign::Middle } else { VAlign::Top };
        let (header_size, value_size) = (style.header_font_size, style.value_font_size);
        let (header_pad, value_pad) = (style.header_padding, style.value_padding);
        let (header_bg, header_text) = (palette.header_bg, palette.header_text);

        let left = self.left();
        let mut row_index = 0usize;

        for group in groups {
            let label = CellText::new(&group.label, label_w, header_size, true, header_text, header_pad);
            let values: Vec<CellText> = group
                .values
                .iter()
                .map(|v| CellText::new(v, value_w, value_size, false, value_color, value_pad))
                .collect();

            let mut heights: Vec<f32> = values.iter().map(|v| v.height()).collect();
            // The label spans every value row; stretch the last row if the label is taller
            let total: f32 = heights.iter().sum();
            if let Some(last) = heights.last_mut() {
                *last += (label.height() - total).max(0.0);
            }

            let mut segment_top = self.cursor;
            for (value, height) in values.into_iter().zip(heights) {
                let bg = self.row_background(row_index);
                let mut piece = value;
                let stretch = height - piece.height();
                loop {
                    let needed = piece.height() + stretch;
                    if needed <= self.remaining() {
                        self.advance_cell(&piece, left + label_w, value_w, needed, bg);
                        break;
                    }
                    let fit = piece.lines_fitting(self.remaining());
                    if !self.at_page_top() && (needed <= self.frame_height() || fit == 0) {
                        self.close_label_segment(&label, left, segment_top, label_w, header_bg, label_valign);
                        self.new_page();
                        segment_top = self.cursor;
                        continue;
                    }
                    if fit >= piece.lines.len() {
                        // Only the stretch overflows; end the cell at the page bottom
                        let h = self.remaining().max(piece.height());
                        self.advance_cell(&piece, left + label_w, value_w, h, bg);
                        break;
                    }
                    // Taller than a page: fill this one and carry the rest over
                    let rest = piece.split_off(fit.max(1));
                    let h = piece.height();
                    self.advance_cell(&piece, left + label_w, value_w, h, bg);
                    self.close_label_segment(&label, left, segment_top, label_w, header_bg, label_valign);
                    self.new_page();
                    segment_top = self.cursor;
                    piece = rest;
                }
                row_index += 1;
            }
            self.close_label_segment(&label, left, segment_top, label_w, header_bg, label_valign);
        }
    }

    /// Draw a value cell at the cursor and move past it.
    fn advance_cell(&mut self, cell: &CellText, x: f32, w: f32, h: f32, bg: HexColor) {
        let y = self.cursor;
        self.cell(cell, x, y, w, h, Some(bg), VAlign::Top);
        self.cursor += h;
    }

    /// Draw the label cell covering the rows laid out since `top` on this page.
    fn close_label_segment(&mut self, label: &CellText, x: f32, top: f32, w: f32, bg: HexColor, valign: VAlign) {
        let height = self.cursor - top;
        if height <= 0.0 {
            return;
        }
        if label.height() > height {
            let clipped = label.clipped(height);
            self.cell(&clipped, x, top, w, height, Some(bg), valign);
        } else {
            self.cell(label, x, top, w, height, Some(bg), valign);
        }
    }

    fn grid_table(&mut self, widths: &[f32], header: &[String], rows: &[Vec<String>]) {
        let theme = self.theme;
        let (style, palette) = (&theme.table, &theme.palette);
        let header_pad = Padding {
            top: style.grid_header_padding,
            bottom: style.grid_header_padding,
            left: style.value_padding.left,
            right: style.value_padding.right,
        };
        let (header_size, value_size, value_pad) = (style.header_font_size, style.value_font_size, style.value_padding);
        let (header_bg, header_text) = (palette.header_bg, palette.header_text);

        let header_cells: Vec<CellText> = header
            .iter()
            .zip(widths)
            .map(|(text, w)| CellText::new(text, *w, header_size, true, header_text, header_pad))
            .collect();
        let header_height = row_height(&header_cells);

        let body: Vec<(Vec<CellText>, f32)> = rows
            .iter()
            .map(|row| {
                let cells: Vec<CellText> = row
                    .iter()
                    .zip(widths)
                    .map(|(text, w)| CellText::new(text, *w, value_size, false, HexColor::BLACK, value_pad))
                    .collect();
                let height = row_height(&cells);
                (cells, height)
            })
            .collect();

        // Keep the header with the first row, or with its first line when the row is taller than a page
        let first_row = body.first().map(|(_, h)| *h).unwrap_or(0.0);
        let one_line = value_pad.vertical() + value_size * CELL_LEADING;
        let keep = if header_height + first_row <= self.frame_height() { first_row } else { one_line };
        self.ensure(header_height + keep);
        self.grid_row(&header_cells, widths, header_height, Some(header_bg));

        for (index, (cells, height)) in body.into_iter().enumerate() {
            let bg = self.row_background(index);
            let (mut cells, mut height) = (cells, height);
            let mut carried = false;
            loop {
                if height <= self.remaining() || cells.iter().all(|c| c.lines.is_empty()) {
                    self.grid_row(&cells, widths, height, Some(bg));
                    break;
                }
                let room = self.remaining();
                let fits: Vec<usize> = cells.iter().map(|c| c.lines_fitting(room)).collect();
                let nothing_fits = fits.iter().all(|f| *f == 0);
                if !carried && (header_height + height <= self.frame_height() || nothing_fits) {
                    self.new_page();
                    self.grid_row(&header_cells, widths, header_height, Some(header_bg));
                    carried = true;
                    continue;
                }
                // Taller than a page: fill this one and carry the rest over
                let rest: Vec<CellText> =
                    cells.iter_mut().zip(&fits).map(|(cell, fit)| cell.split_off((*fit).max(1))).collect();
                let head_height = row_height(&cells).min(room);
                self.grid_row(&cells, widths, head_height, Some(bg));
                self.new_page();
                self.grid_row(&header_cells, widths, header_height, Some(header_bg));
                carried = true;
                height = row_height(&rest);
                cells = rest;
            }
        }
    }

    fn grid_row(&mut self, cells: &[CellText], widths: &[f32], height: f32, bg: Option<HexColor>) {
        let y = self.cursor;
        let mut x = self.left();
        for (cell, w) in cells.iter().zip(widths) {
            self.cell(cell, x, y, *w, height, bg, VAlign::Top);
            x += w;
        }
        self.cursor += height;
    }
}

fn row_height(cells: &[CellText]) -> f32 {
    cells.iter().map(|c| c.height()).fold(0.0, f32::max)
}

/// Flow the story over as many pages as it needs.
pub fn paginate(story: &[Block], theme: &Theme) -> Vec<Page> {
    Paginator::new(theme).layout(story)
}

//
// printpdf backend
//

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn rgb(color: HexColor) -> Color {
    let (r, g, b) = color.fractions();
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn render_error(e: impl std::fmt::Display) -> ToolError {
    ToolError::Render(e.to_string())
}

/// Serialize laid-out pages into PDF bytes.
pub fn write_pdf(title: &str, pages: &[Page], theme: &Theme) -> Result<Vec<u8>, ToolError> {
    let page_height = theme.page.page_height;
    let (width, height) = (mm(theme.page.page_width), mm(page_height));

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_error)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };

        // Flip top-down layout coordinates into PDF user space
        let flip = |y: f32| mm(page_height - y);

        for op in &page.ops {
            match op {
                DrawOp::FillRect { x, y, w, h, color } => {
                    layer.set_fill_color(rgb(*color));
                    let rect = Rect::new(mm(*x), flip(y + h), mm(x + w), flip(*y)).with_mode(PaintMode::Fill);
                    layer.add_rect(rect);
                }
                DrawOp::StrokeRect { x, y, w, h, color, width } => {
                    layer.set_outline_color(rgb(*color));
                    layer.set_outline_thickness(*width);
                    layer.add_line(Line {
                        points: vec![
                            (Point::new(mm(*x), flip(*y)), false),
                            (Point::new(mm(x + w), flip(*y)), false),
                            (Point::new(mm(x + w), flip(y + h)), false),
                            (Point::new(mm(*x), flip(y + h)), false),
                        ],
                        is_closed: true,
                    });
                }
                DrawOp::Line { x1, y1, x2, y2, color, width } => {
                    layer.set_outline_color(rgb(*color));
                    layer.set_outline_thickness(*width);
                    layer.add_line(Line {
                        points: vec![(Point::new(mm(*x1), flip(*y1)), false), (Point::new(mm(*x2), flip(*y2)), false)],
                        is_closed: false,
                    });
                }
                DrawOp::Text { x, y, size, bold: is_bold, color, text } => {
                    layer.set_fill_color(rgb(*color));
                    let font = if *is_bold { &bold } else { &regular };
                    layer.use_text(text.as_str(), *size, mm(*x), flip(*y), font);
                }
            }
        }
    }

    doc.save_to_bytes().map_err(render_error)
}

#[cfg(test)]
#[path = "pdf_test.rs"]
mod pdf_test;
