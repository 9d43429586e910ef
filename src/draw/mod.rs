//! Raster primitives: pixel buffers, colors, dirty regions, compositing.
//!
//! This module defines the core drawing types used by the painting engine:
//! - [`Color`]: RGBA color with native-endian packing and HSV conversions
//! - [`PixelBuffer`]: the fixed-size raster owned by each layer
//! - [`DirtyRect`] / [`DirtyTracker`]: damage tracking for partial redraws
//! - Rasterization ([`raster`]) and stack flattening ([`composite`])

pub mod buffer;
pub mod color;
pub mod composite;
pub mod dirty;
pub mod raster;

// Re-export commonly used types at module level
pub use buffer::PixelBuffer;
pub use color::{Color, Hsv, hsv_to_rgb, rgb_to_hsv};
pub use dirty::{DirtyRect, DirtyTracker};
pub use raster::{PaintOp, stroke_polyline};

// Re-export color constants for public API
#[allow(unused_imports)]
pub use color::{BLACK, TRANSPARENT, WHITE};
