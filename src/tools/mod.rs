//! Drawing tool strategies.
//!
//! Each tool consumes an ordered run of stroke points and produces pixel
//! mutations on the active layer plus the dirty rectangle those mutations
//! cover. Tools are selected via [`ToolKind`] and dispatched by `match`;
//! per-tool rasterization rules live in the submodules.

pub mod bucket;
pub mod line;
pub mod stroke;

use crate::config::StyleConfig;
use crate::draw::{Color, DirtyRect, PixelBuffer};

/// One sampled input point of a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePoint {
    /// X position in composition pixels.
    pub x: i32,
    /// Y position in composition pixels.
    pub y: i32,
    /// Pen pressure in `(0, 1]`. Non-pressure devices report 1.
    pub force: f32,
    /// Contact identity; -1 is reserved for the pointing device.
    pub touch_id: i32,
}

impl StrokePoint {
    /// Position as a coordinate pair.
    pub fn pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// The available drawing tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolKind {
    /// Thin pressure-sensitive pen.
    Outline,
    /// Wide pressure-sensitive pen (default).
    #[default]
    Brush,
    /// Cuts content away by overwriting with transparency.
    Eraser,
    /// Straight-line preview from first to last point.
    Line,
    /// Flood fill from the clicked pixel.
    Bucket,
}

impl ToolKind {
    /// Whether every pointer move re-rasterizes the whole accumulated
    /// stroke from a rolled-back layer, instead of appending the new
    /// segment incrementally.
    ///
    /// Only tools whose appearance depends on the global stroke shape
    /// need this (the straight-line preview).
    pub fn redraws_whole_stroke(self) -> bool {
        matches!(self, ToolKind::Line)
    }

    /// Rasterizes the run of `points` starting at `from` onto `buffer`.
    ///
    /// Returns the dirty rectangle of touched pixels, or `None` when
    /// nothing changed (empty run, or a fill whose seed already has the
    /// fill color).
    pub fn draw(
        self,
        buffer: &mut PixelBuffer,
        styles: &StyleConfig,
        foreground: Color,
        points: &[StrokePoint],
        from: usize,
    ) -> Option<DirtyRect> {
        match self {
            ToolKind::Outline => stroke::draw_outline(buffer, styles, foreground, points, from),
            ToolKind::Brush => stroke::draw_brush(buffer, styles, foreground, points, from),
            ToolKind::Eraser => stroke::draw_eraser(buffer, styles, points, from),
            ToolKind::Line => line::draw(buffer, styles, foreground, points),
            ToolKind::Bucket => bucket::draw(buffer, foreground, points),
        }
    }

    /// Bounding rectangle the tool would touch for this run of points,
    /// without drawing.
    ///
    /// Used to merge dirty regions across concurrent contacts and to roll
    /// back the previous whole-stroke preview before redrawing it.
    pub fn determine_dirty(
        self,
        styles: &StyleConfig,
        points: &[StrokePoint],
        from: usize,
    ) -> Option<DirtyRect> {
        match self {
            ToolKind::Outline => stroke::dirty_for_width(points, from, styles.outline.line_width),
            ToolKind::Brush => {
                let width = stroke::brush_width(styles, points);
                stroke::dirty_for_width(points, from, width)
            }
            ToolKind::Eraser => stroke::dirty_for_width(points, from, styles.eraser.line_width),
            ToolKind::Line => line::determine_dirty(styles, points),
            // A fill is a discrete action; its extent is only known after
            // the flood runs.
            ToolKind::Bucket => None,
        }
    }
}
