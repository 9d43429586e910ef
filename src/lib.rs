//! In-memory raster painting engine.
//!
//! Hosts feed pointer/touch events into a [`Canvas`] and receive pixel
//! mutations plus the dirty rectangles that cover them; everything else
//! (layering, blending, undo history, the layered save format) lives
//! behind that surface. The engine owns no window or event loop of its
//! own.

pub mod config;
pub mod draw;
pub mod history;
pub mod io;
pub mod layers;
pub mod session;
pub mod tools;

pub use config::StyleConfig;
pub use draw::{Color, DirtyRect, PixelBuffer};
pub use layers::{BlendMode, LayerId, LayerStack};
pub use session::{Canvas, CanvasOptions};
pub use tools::{StrokePoint, ToolKind};
