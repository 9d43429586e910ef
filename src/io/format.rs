//! The layered save format.
//!
//! A save blob is a header, a metadata block, and the layer images:
//!
//! ```text
//! [0, 4)        u32    byte length of the UTF-16 JSON metadata block
//! [4, 8)        u32    layer count N
//! [8, 8 + 4N)   N*u32  byte length of each layer's PNG, in layer order
//! ...           UTF-16 JSON {options: {width, height}, layers: [...]}
//! ...           N concatenated PNG images, in layer order
//! ```
//!
//! Integers are little-endian. The per-layer metadata entries carry the
//! attributes a pixel buffer cannot (visibility, blend mode, opacity,
//! name); pixel content travels as one PNG per layer.

use std::thread;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{FormatError, SaveError};
use crate::draw::PixelBuffer;
use crate::layers::{Layer, LayerSettings, LayerStack};

#[derive(Debug, Serialize, Deserialize)]
struct FileMeta {
    options: CompositionMeta,
    layers: Vec<LayerSettings>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CompositionMeta {
    width: u32,
    height: u32,
}

/// Serializes the stack to a save blob.
///
/// Layer images are PNG-encoded on one thread per layer and joined in
/// layer order; any single encode failure fails the whole save.
pub fn encode(stack: &LayerStack) -> Result<Vec<u8>, SaveError> {
    let meta = FileMeta {
        options: CompositionMeta {
            width: stack.width(),
            height: stack.height(),
        },
        layers: stack.iter().map(LayerSettings::of).collect(),
    };
    let json = serde_json::to_string(&meta)?;
    let json_utf16: Vec<u8> = json.encode_utf16().flat_map(u16::to_le_bytes).collect();

    let images = encode_layer_images(stack)?;
    let image_bytes: usize = images.iter().map(Vec::len).sum();

    let mut out = Vec::with_capacity(8 + 4 * images.len() + json_utf16.len() + image_bytes);
    out.extend_from_slice(&(json_utf16.len() as u32).to_le_bytes());
    out.extend_from_slice(&(images.len() as u32).to_le_bytes());
    for image in &images {
        out.extend_from_slice(&(image.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(&json_utf16);
    for image in &images {
        out.extend_from_slice(image);
    }
    debug!(
        "Encoded {} layers into {} bytes",
        images.len(),
        out.len()
    );
    Ok(out)
}

/// PNG-encodes every layer concurrently, results in layer order.
fn encode_layer_images(stack: &LayerStack) -> Result<Vec<Vec<u8>>, SaveError> {
    thread::scope(|scope| {
        let handles: Vec<_> = stack
            .iter()
            .map(|layer| scope.spawn(move || encode_layer(layer)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("layer encoder thread panicked"))
            .collect()
    })
}

fn encode_layer(layer: &Layer) -> Result<Vec<u8>, SaveError> {
    encode_png(&layer.buffer).map_err(|source| SaveError::Encode {
        name: layer.name.clone(),
        source,
    })
}

/// PNG-encodes a pixel buffer.
pub(crate) fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, image::ImageError> {
    use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        buffer.data(),
        buffer.width(),
        buffer.height(),
        ColorType::Rgba8.into(),
    )?;
    Ok(out)
}

/// Reads a save blob back into a layer stack.
///
/// Validation is strict and all-or-nothing: section lengths must add up
/// to the blob length exactly, the header layer count must match the
/// metadata list, and every layer image must decode. No layer is active
/// on the returned stack.
pub fn decode(bytes: &[u8]) -> Result<LayerStack, FormatError> {
    let json_len = read_u32(bytes, 0)? as usize;
    let layer_count = read_u32(bytes, 4)? as usize;

    let mut image_lens = Vec::with_capacity(layer_count);
    for i in 0..layer_count {
        image_lens.push(read_u32(bytes, 8 + 4 * i)? as usize);
    }

    let header_len = 8 + 4 * layer_count;
    let expected = header_len + json_len + image_lens.iter().sum::<usize>();
    if bytes.len() != expected {
        return Err(FormatError::LengthMismatch {
            expected,
            found: bytes.len(),
        });
    }
    if json_len % 2 != 0 {
        return Err(FormatError::OddMetadataLength(json_len));
    }

    let json_bytes = &bytes[header_len..header_len + json_len];
    let units: Vec<u16> = json_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let json = String::from_utf16(&units).map_err(|_| FormatError::InvalidUtf16)?;
    let meta: FileMeta = serde_json::from_str(&json)?;

    if meta.layers.len() != layer_count {
        return Err(FormatError::LayerCountMismatch {
            header: layer_count,
            metadata: meta.layers.len(),
        });
    }
    let (width, height) = (meta.options.width, meta.options.height);
    if width == 0 || height == 0 {
        return Err(FormatError::InvalidDimensions { width, height });
    }

    let mut stack = LayerStack::new(width, height);
    let mut offset = header_len + json_len;
    for (index, (settings, image_len)) in meta.layers.into_iter().zip(image_lens).enumerate() {
        let image_bytes = &bytes[offset..offset + image_len];
        offset += image_len;

        let id = stack.add_layer(index);
        let layer = stack.layer_mut(id).expect("layer just added");
        layer.visible = settings.visible;
        layer.blend_mode = settings.blend_mode;
        layer.opacity = settings.opacity;
        layer.name = settings.name;
        decode_layer_image(&mut layer.buffer, image_bytes)?;
        layer.commit();
    }
    debug!("Decoded {} layers at {width}x{height}", stack.len());
    Ok(stack)
}

/// Decodes a PNG into the layer's buffer at the top-left corner.
///
/// Images smaller or larger than the composition are clipped; the save
/// path always writes matching sizes, so this only matters for blobs
/// produced elsewhere.
fn decode_layer_image(buffer: &mut PixelBuffer, bytes: &[u8]) -> Result<(), FormatError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
    let copy_width = (image.width().min(buffer.width()) as usize) * 4;
    let rows = image.height().min(buffer.height());
    let src_stride = image.width() as usize * 4;
    let dst_stride = buffer.width() as usize * 4;

    let src = image.as_raw();
    let dst = buffer.data_mut();
    for row in 0..rows as usize {
        let src_row = &src[row * src_stride..row * src_stride + copy_width];
        dst[row * dst_stride..row * dst_stride + copy_width].copy_from_slice(src_row);
    }
    Ok(())
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, FormatError> {
    let end = offset + 4;
    let slice = bytes.get(offset..end).ok_or(FormatError::Truncated {
        needed: end,
        available: bytes.len(),
    })?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
