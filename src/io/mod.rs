//! Serialization of compositions.
//!
//! Two surfaces: the layered save format (```format```), which preserves
//! every layer's pixels and attributes for later editing, and flattened
//! PNG export (```flatten```), which bakes the visible layers into a
//! single image for sharing.

pub mod flatten;
pub mod format;

use thiserror::Error;

/// Errors while producing a save blob or export image.
#[derive(Debug, Error)]
pub enum SaveError {
    /// A layer's pixel data failed to encode as PNG.
    #[error("failed to encode image {name:?}: {source}")]
    Encode {
        name: String,
        source: image::ImageError,
    },
    /// The layer metadata could not be serialized.
    #[error("failed to serialize layer metadata: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors while reading a save blob back.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The blob ends before a declared field.
    #[error("save data truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    /// The declared section lengths do not add up to the blob length.
    #[error("save data length mismatch: expected {expected} bytes, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// The metadata block length is not a whole number of UTF-16 units.
    #[error("metadata length {0} is not a multiple of two")]
    OddMetadataLength(usize),
    /// The metadata block contains unpaired surrogates.
    #[error("metadata block is not valid UTF-16")]
    InvalidUtf16,
    /// The metadata JSON failed to parse or has the wrong shape.
    #[error("invalid metadata JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    /// The header layer count and the metadata layer list disagree.
    #[error("layer count mismatch: header says {header}, metadata lists {metadata}")]
    LayerCountMismatch { header: usize, metadata: usize },
    /// The metadata declares a zero-sized composition.
    #[error("invalid composition dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// A layer's PNG data failed to decode.
    #[error("failed to decode layer image: {0}")]
    Image(#[from] image::ImageError),
}
