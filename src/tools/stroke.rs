//! Polyline stroke tools: Outline, Brush, and Eraser.
//!
//! All three rasterize the point run as a round-join polyline; they differ
//! only in width selection and paint operation. Outline and Brush scale
//! their width with the pressure of the run's first point; the eraser uses
//! a fixed width and replaces pixels with transparency.

use crate::config::StyleConfig;
use crate::draw::raster::{PaintOp, stroke_polyline};
use crate::draw::{Color, DirtyRect, PixelBuffer, color};
use super::StrokePoint;

pub(super) fn draw_outline(
    buffer: &mut PixelBuffer,
    styles: &StyleConfig,
    foreground: Color,
    points: &[StrokePoint],
    from: usize,
) -> Option<DirtyRect> {
    let run = points.get(from..)?;
    let width = styles.outline.width_for_force(run.first()?.force);
    draw_run(buffer, run, width, foreground, PaintOp::Over);
    dirty_for_width(points, from, styles.outline.line_width)
}

pub(super) fn draw_brush(
    buffer: &mut PixelBuffer,
    styles: &StyleConfig,
    foreground: Color,
    points: &[StrokePoint],
    from: usize,
) -> Option<DirtyRect> {
    let run = points.get(from..)?;
    let width = styles.brush.width_for_force(run.first()?.force);
    draw_run(buffer, run, width, foreground, PaintOp::Over);
    dirty_for_width(points, from, brush_width(styles, points))
}

pub(super) fn draw_eraser(
    buffer: &mut PixelBuffer,
    styles: &StyleConfig,
    points: &[StrokePoint],
    from: usize,
) -> Option<DirtyRect> {
    let run = points.get(from..)?;
    if run.is_empty() {
        return None;
    }
    draw_run(
        buffer,
        run,
        styles.eraser.line_width,
        color::TRANSPARENT,
        PaintOp::Replace,
    );
    dirty_for_width(points, from, styles.eraser.line_width)
}

/// Effective brush width for a point run (pressure of the first point).
pub(super) fn brush_width(styles: &StyleConfig, points: &[StrokePoint]) -> f32 {
    let force = points.first().map_or(1.0, |p| p.force);
    styles.brush.width_for_force(force)
}

fn draw_run(
    buffer: &mut PixelBuffer,
    run: &[StrokePoint],
    width: f32,
    color: Color,
    op: PaintOp,
) {
    let positions: Vec<(i32, i32)> = run.iter().map(StrokePoint::pos).collect();
    stroke_polyline(buffer, &positions, width, color, op);
}

/// Bounding box of `points[from..]` expanded by half the stroke width.
pub(super) fn dirty_for_width(
    points: &[StrokePoint],
    from: usize,
    width: f32,
) -> Option<DirtyRect> {
    let run = points.get(from..)?;
    let bounds = DirtyRect::from_points(run.iter().map(StrokePoint::pos))?;
    let padding = (width / 2.0).ceil() as i32;
    Some(bounds.expanded(padding.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;

    fn pt(x: i32, y: i32, force: f32) -> StrokePoint {
        StrokePoint {
            x,
            y,
            force,
            touch_id: -1,
        }
    }

    #[test]
    fn brush_paints_along_the_run() {
        let mut buf = PixelBuffer::new(32, 32);
        let styles = StyleConfig::default();
        let points = [pt(4, 4, 1.0), pt(20, 4, 1.0)];

        let dirty = ToolKind::Brush
            .draw(&mut buf, &styles, Color::rgb(255, 0, 0), &points, 0)
            .unwrap();

        assert_eq!(buf.color_at(4, 4), Color::rgb(255, 0, 0));
        assert_eq!(buf.color_at(12, 4), Color::rgb(255, 0, 0));
        assert_eq!(buf.color_at(20, 4), Color::rgb(255, 0, 0));
        assert!(dirty.contains(4, 4) && dirty.contains(20, 4));
    }

    #[test]
    fn pressure_narrows_the_stroke() {
        let styles = StyleConfig::default();
        let mut wide = PixelBuffer::new(32, 32);
        let mut narrow = PixelBuffer::new(32, 32);

        ToolKind::Brush.draw(
            &mut wide,
            &styles,
            Color::rgb(0, 0, 0),
            &[pt(16, 16, 1.0)],
            0,
        );
        ToolKind::Brush.draw(
            &mut narrow,
            &styles,
            Color::rgb(0, 0, 0),
            &[pt(16, 16, 0.1)],
            0,
        );

        let coverage = |buf: &PixelBuffer| buf.pixels().iter().filter(|&&p| p != 0).count();
        assert!(coverage(&wide) > coverage(&narrow));
        assert!(coverage(&narrow) > 0);
    }

    #[test]
    fn eraser_cuts_through_existing_content() {
        let mut buf = PixelBuffer::new(16, 16);
        let styles = StyleConfig::default();
        ToolKind::Brush.draw(
            &mut buf,
            &styles,
            Color::rgb(0, 128, 0),
            &[pt(2, 8, 1.0), pt(13, 8, 1.0)],
            0,
        );
        assert_ne!(buf.get(8, 8), 0);

        ToolKind::Eraser.draw(
            &mut buf,
            &styles,
            Color::rgb(0, 128, 0),
            &[pt(8, 8, 1.0)],
            0,
        );
        assert_eq!(buf.get(8, 8), 0);
    }

    #[test]
    fn dirty_rect_is_padded_by_half_width() {
        let points = [pt(10, 10, 1.0), pt(20, 14, 1.0)];
        let dirty = dirty_for_width(&points, 0, 4.0).unwrap();
        assert_eq!(dirty, DirtyRect::new(8, 8, 22, 16));
    }

    #[test]
    fn from_index_limits_the_segment() {
        let points = [pt(0, 0, 1.0), pt(50, 0, 1.0), pt(50, 8, 1.0)];
        let dirty = dirty_for_width(&points, 1, 2.0).unwrap();
        assert_eq!(dirty, DirtyRect::new(49, -1, 51, 9));
    }

    #[test]
    fn empty_run_reports_no_dirt() {
        let styles = StyleConfig::default();
        let mut buf = PixelBuffer::new(8, 8);
        assert!(ToolKind::Outline
            .draw(&mut buf, &styles, Color::rgb(0, 0, 0), &[], 0)
            .is_none());
        assert!(dirty_for_width(&[pt(1, 1, 1.0)], 5, 2.0).is_none());
    }
}
