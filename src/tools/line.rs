//! Straight-line preview tool.
//!
//! The line always connects the first recorded point to the most recent
//! one, ignoring everything in between. The session rolls the layer back
//! to its pre-stroke state before each redraw, so the user sees a live
//! straight segment instead of an accumulating scribble.

use super::StrokePoint;
use crate::config::StyleConfig;
use crate::draw::raster::{PaintOp, stroke_segment};
use crate::draw::{Color, DirtyRect, PixelBuffer};

pub(super) fn draw(
    buffer: &mut PixelBuffer,
    styles: &StyleConfig,
    foreground: Color,
    points: &[StrokePoint],
) -> Option<DirtyRect> {
    let first = points.first()?;
    let last = points.last()?;
    let width = styles.line.line_width;
    stroke_segment(
        buffer, first.x, first.y, last.x, last.y, width, foreground, PaintOp::Over,
    );

    let padding = ((width / 2.0).ceil() as i32).max(1);
    Some(
        DirtyRect::new(
            first.x.min(last.x),
            first.y.min(last.y),
            first.x.max(last.x),
            first.y.max(last.y),
        )
        .expanded(padding),
    )
}

/// Bounding box over *all* recorded points, padded by half the width.
///
/// Intermediate points matter here even though drawing ignores them: the
/// previous preview may have passed through any of them, and the roll-back
/// region has to cover it.
pub(super) fn determine_dirty(styles: &StyleConfig, points: &[StrokePoint]) -> Option<DirtyRect> {
    let bounds = DirtyRect::from_points(points.iter().map(StrokePoint::pos))?;
    let padding = ((styles.line.line_width / 2.0).ceil() as i32).max(1);
    Some(bounds.expanded(padding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;

    fn pt(x: i32, y: i32) -> StrokePoint {
        StrokePoint {
            x,
            y,
            force: 1.0,
            touch_id: -1,
        }
    }

    #[test]
    fn result_depends_only_on_the_endpoints() {
        let styles = StyleConfig::default();
        let fg = Color::rgb(255, 0, 255);

        let mut with_detour = PixelBuffer::new(32, 32);
        ToolKind::Line.draw(
            &mut with_detour,
            &styles,
            fg,
            &[pt(0, 0), pt(5, 5), pt(10, 0)],
            0,
        );

        let mut direct = PixelBuffer::new(32, 32);
        ToolKind::Line.draw(&mut direct, &styles, fg, &[pt(0, 0), pt(10, 0)], 0);

        assert_eq!(with_detour.pixels(), direct.pixels());
    }

    #[test]
    fn dirty_covers_intermediate_points() {
        let styles = StyleConfig::default();
        let dirty =
            ToolKind::Line.determine_dirty(&styles, &[pt(0, 0), pt(5, 40), pt(10, 0)], 0).unwrap();
        assert!(dirty.contains(5, 40));
    }

    #[test]
    fn line_redraws_whole_stroke_and_others_do_not() {
        assert!(ToolKind::Line.redraws_whole_stroke());
        assert!(!ToolKind::Brush.redraws_whole_stroke());
        assert!(!ToolKind::Outline.redraws_whole_stroke());
        assert!(!ToolKind::Eraser.redraws_whole_stroke());
        assert!(!ToolKind::Bucket.redraws_whole_stroke());
    }
}
