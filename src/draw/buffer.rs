//! Fixed-size RGBA pixel buffer backing each layer.

use super::color::Color;
use super::dirty::DirtyRect;

/// An owned `width` x `height` RGBA raster.
///
/// Bytes are stored row-major in `[r, g, b, a]` order. The buffer can also
/// be viewed as packed native-endian `u32` words (see [`Color::pack`]),
/// which is how the flood fill walks it.
///
/// Out-of-bounds access is a programming error and panics; callers clip
/// rectangles to the buffer with [`DirtyRect::clamped`] before use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    // Packed words; keeps the u32 view alignment-safe.
    data: Vec<u32>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer. Dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "pixel buffer must be non-empty");
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw bytes in `[r, g, b, a]` row-major order.
    pub fn data(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Mutable raw bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// The buffer as packed native-endian words, one per pixel.
    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    /// Mutable packed-word view.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    fn index(&self, x: i32, y: i32) -> usize {
        assert!(
            x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} buffer",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    /// Reads the packed color at `(x, y)`.
    ///
    /// # Panics
    /// Panics when the coordinate lies outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> u32 {
        self.pixels()[self.index(x, y)]
    }

    /// Writes a packed color at `(x, y)`.
    ///
    /// # Panics
    /// Panics when the coordinate lies outside the buffer.
    pub fn set(&mut self, x: i32, y: i32, packed: u32) {
        let idx = self.index(x, y);
        self.pixels_mut()[idx] = packed;
    }

    /// Reads the color at `(x, y)` in struct form.
    pub fn color_at(&self, x: i32, y: i32) -> Color {
        Color::unpack(self.get(x, y))
    }

    /// Copies `src_rect` from `src` to this buffer at `(dst_x, dst_y)`.
    ///
    /// The rectangle must lie within `src` and the destination within this
    /// buffer; both are programming errors otherwise.
    pub fn copy_region(&mut self, src: &PixelBuffer, src_rect: DirtyRect, dst_x: i32, dst_y: i32) {
        for row in 0..src_rect.height() {
            for col in 0..src_rect.width() {
                let packed = src.get(src_rect.min_x + col, src_rect.min_y + row);
                self.set(dst_x + col, dst_y + row, packed);
            }
        }
    }

    /// Copies the same rectangle of `src` over this buffer in place.
    ///
    /// Used to roll a region back to a backup taken from an identically
    /// sized buffer.
    pub fn restore_region(&mut self, src: &PixelBuffer, rect: DirtyRect) {
        debug_assert_eq!((src.width, src.height), (self.width, self.height));
        self.copy_region(src, rect, rect.min_x, rect.min_y);
    }

    /// Returns an immutable deep copy of the buffer.
    pub fn snapshot(&self) -> PixelBuffer {
        self.clone()
    }

    /// Overwrites the whole buffer from an identically sized snapshot.
    pub fn restore(&mut self, snapshot: &PixelBuffer) {
        assert_eq!(
            (snapshot.width, snapshot.height),
            (self.width, self.height),
            "snapshot dimensions do not match buffer"
        );
        self.data.copy_from_slice(&snapshot.data);
    }

    /// Overwrites the buffer from a snapshot of any size, scaling with
    /// nearest-neighbor sampling.
    ///
    /// History entries use 1x1 placeholder snapshots for the initial blank
    /// state; scaling such a snapshot floods the buffer with its one pixel.
    pub fn restore_scaled(&mut self, snapshot: &PixelBuffer) {
        if (snapshot.width, snapshot.height) == (self.width, self.height) {
            self.restore(snapshot);
            return;
        }
        for y in 0..self.height {
            let sy = (y as u64 * snapshot.height as u64 / self.height as u64) as i32;
            for x in 0..self.width {
                let sx = (x as u64 * snapshot.width as u64 / self.width as u64) as i32;
                let packed = snapshot.get(sx, sy);
                self.set(x as i32, y as i32, packed);
            }
        }
    }
}
