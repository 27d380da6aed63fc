//! Renderers over a grid and a visibility mask
//!
//! All three renderers agree on what a cell shows: hidden cells render as
//! unknown, visible cells show their topmost object or an empty marker.

use base64::Engine;
use base64::engine::general_purpose;
use clem_core::{ClemError, Position, Result};
use png::{BitDepth, ColorType, Encoder};
use std::fmt::Write;

use crate::grid::Grid;
use crate::visibility::VisibilityMask;

pub const UNKNOWN_SYMBOL: &str = "?";
pub const EMPTY_SYMBOL: &str = "empty";
pub const UNKNOWN_GLYPH: &str = "❓";
pub const EMPTY_GLYPH: &str = "⬜️";

/// Output of a render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    /// PNG bytes
    Image(Vec<u8>),
}

impl Rendered {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            Rendered::Image(_) => None,
        }
    }

    /// `data:` URL for image renders
    pub fn to_data_url(&self) -> Option<String> {
        match self {
            Rendered::Image(bytes) => Some(png_data_url(bytes)),
            Rendered::Text(_) => None,
        }
    }
}

pub fn png_data_url(bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// One line per row: `(r,c) is X, ` for every cell
pub fn render_string(grid: &Grid, mask: &VisibilityMask) -> String {
    let mut out = String::new();
    for row in 0..grid.height() as i32 {
        for col in 0..grid.width() as i32 {
            let pos = Position::new(row, col);
            let content = if !mask.is_visible(pos) {
                UNKNOWN_SYMBOL
            } else {
                grid.topmost(pos).map_or(EMPTY_SYMBOL, |o| o.symbol.as_str())
            };
            let _ = write!(out, "({row},{col}) is {content}, ");
        }
        out.push('\n');
    }
    out
}

/// One glyph per cell, one line per row
pub fn render_human_readable(grid: &Grid, mask: &VisibilityMask) -> String {
    let mut out = String::new();
    for row in 0..grid.height() as i32 {
        for col in 0..grid.width() as i32 {
            let pos = Position::new(row, col);
            let glyph = if !mask.is_visible(pos) {
                UNKNOWN_GLYPH
            } else {
                grid.topmost(pos)
                    .map_or(EMPTY_GLYPH, |o| o.pretty_symbol.as_str())
            };
            out.push_str(glyph);
        }
        out.push('\n');
    }
    out
}

/// Turns a masked grid into PNG bytes
pub trait GridImageRenderer {
    fn render_grid_image(
        &self,
        grid: &Grid,
        mask: &VisibilityMask,
        player_position: Option<Position>,
    ) -> Result<Vec<u8>>;
}

type Rgb = [u8; 3];

const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];
const LIGHT_GRAY: Rgb = [211, 211, 211];
const LIGHT_GREEN: Rgb = [144, 238, 144];
const OUTLINE_RED: Rgb = [220, 20, 60];

/// Marker colours for occupied cells, picked by symbol
const MARKERS: [Rgb; 6] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
];

/// Flat-colour PNG renderer
///
/// Hidden cells are light gray, occupied cells light green with a centred
/// marker whose colour depends on the topmost symbol, empty cells white.
/// The viewing player's cell gets a red outline.
#[derive(Debug, Clone, Copy)]
pub struct PngGridRenderer {
    pub cell_size: u32,
}

impl Default for PngGridRenderer {
    fn default() -> Self {
        Self { cell_size: 32 }
    }
}

impl PngGridRenderer {
    fn marker_color(symbol: &str) -> Rgb {
        let sum: u32 = symbol.bytes().map(u32::from).sum();
        MARKERS[sum as usize % MARKERS.len()]
    }

    fn pixel(
        &self,
        grid: &Grid,
        mask: &VisibilityMask,
        player_position: Option<Position>,
        x: u32,
        y: u32,
    ) -> Rgb {
        let cell = self.cell_size;
        let pos = Position::new((y / cell) as i32, (x / cell) as i32);
        let (lx, ly) = (x % cell, y % cell);

        if lx == 0 || ly == 0 || lx == cell - 1 || ly == cell - 1 {
            return BLACK;
        }
        let edge = lx.min(ly).min(cell - 1 - lx).min(cell - 1 - ly);
        if player_position == Some(pos) && edge <= 3 {
            return OUTLINE_RED;
        }
        if !mask.is_visible(pos) {
            return LIGHT_GRAY;
        }
        match grid.topmost(pos) {
            Some(obj) => {
                let quarter = cell / 4;
                let inner = (quarter..cell - quarter).contains(&lx)
                    && (quarter..cell - quarter).contains(&ly);
                if inner {
                    Self::marker_color(&obj.symbol)
                } else {
                    LIGHT_GREEN
                }
            }
            None => WHITE,
        }
    }
}

impl GridImageRenderer for PngGridRenderer {
    fn render_grid_image(
        &self,
        grid: &Grid,
        mask: &VisibilityMask,
        player_position: Option<Position>,
    ) -> Result<Vec<u8>> {
        if self.cell_size < 8 {
            return Err(ClemError::Render(format!(
                "cell size {} too small",
                self.cell_size
            )));
        }
        let width = grid.width() as u32 * self.cell_size;
        let height = grid.height() as u32 * self.cell_size;

        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&self.pixel(grid, mask, player_position, x, y));
            }
        }

        let mut png_data = Vec::new();
        {
            let mut encoder = Encoder::new(&mut png_data, width, height);
            encoder.set_color(ColorType::Rgb);
            encoder.set_depth(BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| ClemError::Render(e.to_string()))?;
            writer
                .write_image_data(&data)
                .map_err(|e| ClemError::Render(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| ClemError::Render(e.to_string()))?;
        }
        Ok(png_data)
    }
}
