//! Report theme: colors, table metrics, page geometry and text styles.
//!
//! A `Theme` is an immutable value built once (defaults, optionally
//! overridden from TOML by `config::load_theme`) and passed to the layout
//! engine and the PDF writer. All lengths are in PDF points (1/72 inch).

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

const INCH: f32 = 72.0;

/// An sRGB color written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        HexColor { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn parse(s: &str) -> Result<Self, String> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{}', expected #RRGGBB", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(HexColor { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    /// Channels scaled to 0.0..=1.0, as PDF color operators expect.
    pub fn fractions(&self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: HexColor,
    pub secondary: HexColor,
    pub text: HexColor,
    pub light_bg: HexColor,
    pub header_bg: HexColor,
    pub header_text: HexColor,
    pub row_light: HexColor,
    pub row_dark: HexColor,
    pub border: HexColor,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            primary: HexColor::new(0x2E, 0x86, 0xAB),
            secondary: HexColor::new(0xA2, 0x3B, 0x72),
            text: HexColor::new(0x2C, 0x3E, 0x50),
            light_bg: HexColor::new(0xF8, 0xF9, 0xFA),
            header_bg: HexColor::new(0x2E, 0x86, 0xAB),
            header_text: HexColor::new(0xF0, 0xF0, 0xF0),
            row_light: HexColor::new(0xF8, 0xF9, 0xFA),
            row_dark: HexColor::new(0xE9, 0xEC, 0xEF),
            border: HexColor::new(0xDE, 0xE2, 0xE6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Padding {
    pub const fn new(vertical: f32, horizontal: f32) -> Self {
        Padding { top: vertical, bottom: vertical, left: horizontal, right: horizontal }
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }
}

impl Default for Padding {
    fn default() -> Self {
        Padding::new(8.0, 12.0)
    }
}

/// Cell fonts, paddings and borders shared by every table strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub header_font_size: f32,
    pub value_font_size: f32,
    pub border_width: f32,
    pub header_padding: Padding,
    pub value_padding: Padding,
    /// Vertical padding of the header row in grid tables.
    pub grid_header_padding: f32,
    pub value_box_font_size: f32,
    pub value_box_padding: Padding,
    pub value_box_border_width: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            header_font_size: 11.0,
            value_font_size: 10.0,
            border_width: 0.5,
            header_padding: Padding::new(8.0, 12.0),
            value_padding: Padding::new(8.0, 12.0),
            grid_header_padding: 12.0,
            value_box_font_size: 12.0,
            value_box_padding: Padding::new(10.0, 15.0),
            value_box_border_width: 1.0,
        }
    }
}

/// Page size, margins and the label column sizing policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    /// Width of every table and box; centered inside the margins.
    pub content_width: f32,
    pub min_label_width: f32,
    pub max_label_width: f32,
    pub label_char_width: f32,
    pub label_padding: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // A4 portrait
        PageGeometry {
            page_width: 595.28,
            page_height: 841.89,
            margin: 36.0,
            content_width: 6.0 * INCH,
            min_label_width: 1.2 * INCH,
            max_label_width: 3.0 * INCH,
            label_char_width: 0.08 * INCH,
            label_padding: 0.3 * INCH,
        }
    }
}

impl PageGeometry {
    /// Left edge of the content column.
    pub fn content_left(&self) -> f32 {
        let frame = self.page_width - 2.0 * self.margin;
        self.margin + ((frame - self.content_width) / 2.0).max(0.0)
    }

    /// Usable vertical space on one page.
    pub fn frame_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub font_size: f32,
    pub leading: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle { font_size: 11.0, leading: 14.0, space_before: 0.0, space_after: 8.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyles {
    pub title: TextStyle,
    pub heading: TextStyle,
    pub normal: TextStyle,
    pub footer: TextStyle,
}

impl Default for TextStyles {
    fn default() -> Self {
        TextStyles {
            title: TextStyle { font_size: 20.0, leading: 24.0, space_before: 15.0, space_after: 20.0 },
            heading: TextStyle { font_size: 14.0, leading: 17.0, space_before: 15.0, space_after: 10.0 },
            normal: TextStyle::default(),
            footer: TextStyle { font_size: 9.0, leading: 11.0, space_before: 0.0, space_after: 0.0 },
        }
    }
}

/// Fixed timezone used for every rendered timestamp.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayZone {
    pub utc_offset_minutes: i32,
    pub label: String,
}

impl Default for DisplayZone {
    fn default() -> Self {
        DisplayZone { utc_offset_minutes: -5 * 60, label: "EST".to_string() }
    }
}

impl DisplayZone {
    /// The offset; out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub palette: Palette,
    pub table: TableStyle,
    pub page: PageGeometry,
    pub text: TextStyles,
    pub display_zone: DisplayZone,
    /// Scalars longer than this render as a paragraph instead of a value box.
    pub value_box_max_chars: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            palette: Palette::default(),
            table: TableStyle::default(),
            page: PageGeometry::default(),
            text: TextStyles::default(),
            display_zone: DisplayZone::default(),
            value_box_max_chars: 100,
        }
    }
}
