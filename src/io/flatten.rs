//! Flattened PNG export.

use log::debug;

use super::SaveError;
use super::format::encode_png;
use crate::draw::{DirtyRect, PixelBuffer, composite};
use crate::layers::LayerStack;

/// Flattens all visible layers and encodes the result as a single PNG.
pub fn flatten_png(stack: &LayerStack) -> Result<Vec<u8>, SaveError> {
    let flat = composite::flatten(stack);
    let bytes = encode_flat(&flat)?;
    debug!(
        "Exported {}x{} flattened image, {} bytes",
        flat.width(),
        flat.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Flattens the composition and encodes only `rect` as a PNG.
///
/// The rectangle is clamped to the composition first.
///
/// # Panics
///
/// Panics if `rect` lies entirely outside the composition.
pub fn copy_region_png(stack: &LayerStack, rect: DirtyRect) -> Result<Vec<u8>, SaveError> {
    let clipped = rect
        .clamped(stack.width(), stack.height())
        .expect("export region outside the composition");
    let flat = composite::flatten(stack);
    let mut region = PixelBuffer::new(clipped.width() as u32, clipped.height() as u32);
    region.copy_region(&flat, clipped, 0, 0);
    encode_flat(&region)
}

fn encode_flat(buffer: &PixelBuffer) -> Result<Vec<u8>, SaveError> {
    encode_png(buffer).map_err(|source| SaveError::Encode {
        name: "flattened".to_string(),
        source,
    })
}
