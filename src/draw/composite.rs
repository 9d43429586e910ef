//! Flattening of the layer stack into a single raster.
//!
//! Visible layers composite bottom-to-top; each layer's opacity scales its
//! source alpha, and its blend mode selects the separable blend function
//! applied before source-over compositing. This backs both the partial
//! recomposite path and the flattened PNG export.

use super::buffer::PixelBuffer;
use super::color::Color;
use super::dirty::DirtyRect;
use crate::layers::{BlendMode, LayerStack};

/// Flattens the whole stack into a fresh transparent-backed buffer.
pub fn flatten(stack: &LayerStack) -> PixelBuffer {
    let mut target = PixelBuffer::new(stack.width(), stack.height());
    let full = DirtyRect::new(0, 0, stack.width() as i32 - 1, stack.height() as i32 - 1);
    flatten_region(stack, &mut target, full);
    target
}

/// Recomposites only `rect` of the stack into `target`.
///
/// `target` must match the composition dimensions. The rectangle may extend
/// past the surface; it is clipped internally.
pub fn flatten_region(stack: &LayerStack, target: &mut PixelBuffer, rect: DirtyRect) {
    assert_eq!(
        (target.width(), target.height()),
        (stack.width(), stack.height()),
        "composite target does not match composition dimensions"
    );
    let Some(rect) = rect.clamped(stack.width(), stack.height()) else {
        return;
    };

    for y in rect.min_y..=rect.max_y {
        for x in rect.min_x..=rect.max_x {
            let mut dst = super::color::TRANSPARENT;
            for layer in stack.iter() {
                if !layer.visible {
                    continue;
                }
                let src = Color::unpack(layer.buffer.get(x, y));
                dst = composite_pixel(dst, src, layer.blend_mode, layer.opacity);
            }
            target.set(x, y, dst.pack());
        }
    }
}

/// Composites one source pixel over the backdrop.
///
/// `opacity` is the layer opacity in percent and scales the source alpha.
pub fn composite_pixel(backdrop: Color, src: Color, mode: BlendMode, opacity: u8) -> Color {
    let sa = f32::from(src.a) / 255.0 * f32::from(opacity.min(100)) / 100.0;
    if sa <= 0.0 {
        return backdrop;
    }
    let ba = f32::from(backdrop.a) / 255.0;
    let out_a = sa + ba * (1.0 - sa);
    if out_a <= 0.0 {
        return super::color::TRANSPARENT;
    }

    let channel = |cs: u8, cb: u8| -> u8 {
        let cs = f32::from(cs) / 255.0;
        let cb = f32::from(cb) / 255.0;
        let blended = blend_channel(mode, cb, cs);
        // W3C compositing: blend toward the backdrop where it has coverage,
        // keep the raw source where it does not.
        let co = sa * (1.0 - ba) * cs + sa * ba * blended + (1.0 - sa) * ba * cb;
        ((co / out_a) * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Color {
        r: channel(src.r, backdrop.r),
        g: channel(src.g, backdrop.g),
        b: channel(src.b, backdrop.b),
        a: (out_a * 255.0).round() as u8,
    }
}

fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::Normal => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
    }
}
