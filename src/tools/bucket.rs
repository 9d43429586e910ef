//! Bucket tool: 4-connected flood fill.
//!
//! Fills the contiguous region of pixels that bit-equal the seed pixel's
//! packed color. Uses an explicit stack of pending coordinates; a popped
//! coordinate is re-checked against the seed color instead of keeping a
//! visited set, which tolerates duplicate stack entries cheaply. The
//! running bounding box of recolored pixels becomes the dirty rect, so the
//! caller only flushes that sub-region back to the rendering surface.

use super::StrokePoint;
use crate::draw::{Color, DirtyRect, PixelBuffer};

/// Floods from the most recent point; earlier points are ignored.
///
/// Returns `None` when the fill color already matches the seed pixel
/// (no-op, nothing mutated).
///
/// # Panics
/// Panics when the seed lies outside the buffer. Callers validate input
/// coordinates before a stroke ever starts.
pub(super) fn draw(
    buffer: &mut PixelBuffer,
    foreground: Color,
    points: &[StrokePoint],
) -> Option<DirtyRect> {
    let seed = points.last()?;
    // The fill is always fully opaque, whatever the foreground alpha.
    let fill = Color::rgb(foreground.r, foreground.g, foreground.b).pack();

    let width = buffer.width() as i32;
    let height = buffer.height() as i32;
    let old = buffer.get(seed.x, seed.y);
    if fill == old {
        return None;
    }

    let row = width as usize;
    let pixels = buffer.pixels_mut();
    let mut pending = vec![(seed.x, seed.y)];
    let mut dirty = DirtyRect::from_point(seed.x, seed.y);

    while let Some((x, y)) = pending.pop() {
        let idx = y as usize * row + x as usize;
        if pixels[idx] != old {
            continue;
        }
        pixels[idx] = fill;
        dirty.include(x, y);

        if x > 0 {
            pending.push((x - 1, y));
        }
        if x < width - 1 {
            pending.push((x + 1, y));
        }
        if y > 0 {
            pending.push((x, y - 1));
        }
        if y < height - 1 {
            pending.push((x, y + 1));
        }
    }

    Some(dirty)
}
