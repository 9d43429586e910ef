//! Software rasterization of thick polylines.
//!
//! Strokes are rendered with round caps and joins by testing each pixel in
//! a segment's padded bounding box against the distance to the segment.
//! That keeps joins seamless without tracking join geometry explicitly.

use super::buffer::PixelBuffer;
use super::color::Color;
use super::dirty::DirtyRect;

/// How stroked pixels combine with existing layer content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOp {
    /// Standard source-over alpha compositing.
    Over,
    /// Destination pixels are overwritten, not blended. The eraser uses
    /// this with a transparent color to cut content away.
    Replace,
}

/// Strokes a polyline with the given width, clipping to the buffer.
///
/// A single point produces a round dot. Width below one pixel still
/// produces a one-pixel-wide trace so hairlines stay visible.
pub fn stroke_polyline(
    buf: &mut PixelBuffer,
    points: &[(i32, i32)],
    width: f32,
    color: Color,
    op: PaintOp,
) {
    match points {
        [] => {}
        [(x, y)] => stroke_segment(buf, *x, *y, *x, *y, width, color, op),
        _ => {
            for pair in points.windows(2) {
                let (x0, y0) = pair[0];
                let (x1, y1) = pair[1];
                stroke_segment(buf, x0, y0, x1, y1, width, color, op);
            }
        }
    }
}

/// Strokes one segment with round caps.
#[allow(clippy::too_many_arguments)]
pub fn stroke_segment(
    buf: &mut PixelBuffer,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    width: f32,
    color: Color,
    op: PaintOp,
) {
    let half = (width / 2.0).max(0.5);
    let pad = half.ceil() as i32 + 1;
    let bounds = DirtyRect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)).expanded(pad);
    let Some(bounds) = bounds.clamped(buf.width(), buf.height()) else {
        return;
    };

    for y in bounds.min_y..=bounds.max_y {
        for x in bounds.min_x..=bounds.max_x {
            let dist = segment_distance(
                x as f32, y as f32, x0 as f32, y0 as f32, x1 as f32, y1 as f32,
            );
            if dist <= half {
                paint_pixel(buf, x, y, color, op);
            }
        }
    }
}

fn paint_pixel(buf: &mut PixelBuffer, x: i32, y: i32, color: Color, op: PaintOp) {
    match op {
        PaintOp::Replace => buf.set(x, y, color.pack()),
        PaintOp::Over => {
            let blended = source_over(Color::unpack(buf.get(x, y)), color);
            buf.set(x, y, blended.pack());
        }
    }
}

/// Composites `src` over `dst` with non-premultiplied alpha.
pub fn source_over(dst: Color, src: Color) -> Color {
    if src.a == 255 {
        return src;
    }
    if src.a == 0 {
        return dst;
    }

    let sa = f32::from(src.a) / 255.0;
    let da = f32::from(dst.a) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return super::color::TRANSPARENT;
    }

    let channel = |s: u8, d: u8| -> u8 {
        let s = f32::from(s);
        let d = f32::from(d);
        ((s * sa + d * da * (1.0 - sa)) / out_a).round() as u8
    };

    Color {
        r: channel(src.r, dst.r),
        g: channel(src.g, dst.g),
        b: channel(src.b, dst.b),
        a: (out_a * 255.0).round() as u8,
    }
}

/// Distance from `(px, py)` to the closed segment `(x0, y0)-(x1, y1)`.
fn segment_distance(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((px - x0) * dx + (py - y0) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let cx = x0 + t * dx;
    let cy = y0 + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}
