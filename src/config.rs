//! Tool style configuration.
//!
//! Hosts may ship a TOML file overriding the per-tool stroke constants.
//! All sections and fields are optional; anything missing falls back to the
//! built-in defaults, and [`StyleConfig::validate`] clamps out-of-range
//! values instead of rejecting the file.
//!
//! # Example TOML
//! ```toml
//! [outline]
//! min_line_width = 0.5
//! line_width = 2.0
//!
//! [brush]
//! min_line_width = 0.1
//! line_width = 5.0
//!
//! [line]
//! line_width = 5.0
//!
//! [eraser]
//! line_width = 4.0
//! ```

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MIN_LINE_WIDTH: f32 = 0.1;
const MAX_LINE_WIDTH: f32 = 512.0;

/// Style for a pressure-sensitive stroke tool.
///
/// The effective stroke width for a segment is
/// `min_line_width * line_width + (line_width - min_line_width * line_width) * force`,
/// so `min_line_width` is the fraction of `line_width` drawn at zero
/// pressure and full pressure reaches `line_width` exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PressureStyle {
    /// Width fraction applied at minimum pressure, in `(0, 1]`.
    pub min_line_width: f32,
    /// Full-pressure stroke width in pixels.
    pub line_width: f32,
}

impl PressureStyle {
    /// Effective stroke width for the given pressure value.
    pub fn width_for_force(&self, force: f32) -> f32 {
        let floor = self.min_line_width * self.line_width;
        floor + (self.line_width - floor) * force
    }
}

/// Style for a fixed-width tool (no pressure scaling).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedStyle {
    /// Stroke width in pixels.
    pub line_width: f32,
}

fn default_outline() -> PressureStyle {
    PressureStyle {
        min_line_width: 0.5,
        line_width: 2.0,
    }
}

fn default_brush() -> PressureStyle {
    PressureStyle {
        min_line_width: 0.1,
        line_width: 5.0,
    }
}

fn default_line() -> FixedStyle {
    FixedStyle { line_width: 5.0 }
}

fn default_eraser() -> FixedStyle {
    FixedStyle { line_width: 4.0 }
}

/// Per-tool stroke style table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Outline tool: thin pressure-sensitive pen.
    #[serde(default = "default_outline")]
    pub outline: PressureStyle,

    /// Brush tool: wide pressure-sensitive pen.
    #[serde(default = "default_brush")]
    pub brush: PressureStyle,

    /// Straight-line tool (fixed width).
    #[serde(default = "default_line")]
    pub line: FixedStyle,

    /// Eraser (fixed width).
    #[serde(default = "default_eraser")]
    pub eraser: FixedStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            outline: default_outline(),
            brush: default_brush(),
            line: default_line(),
            eraser: default_eraser(),
        }
    }
}

impl StyleConfig {
    /// Parses a style table from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: StyleConfig =
            toml::from_str(text).context("failed to parse style config")?;
        config.validate();
        Ok(config)
    }

    /// Loads a style table from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading style config from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read style config {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Clamps all values to acceptable ranges, warning on adjustments.
    pub fn validate(&mut self) {
        let clamp_width = |value: &mut f32, what: &str| {
            if !value.is_finite() || *value < MIN_LINE_WIDTH || *value > MAX_LINE_WIDTH {
                let clamped = if value.is_finite() {
                    value.clamp(MIN_LINE_WIDTH, MAX_LINE_WIDTH)
                } else {
                    MIN_LINE_WIDTH
                };
                warn!("{what} line width {value} out of range; clamping to {clamped}");
                *value = clamped;
            }
        };
        let clamp_fraction = |value: &mut f32, what: &str| {
            if !value.is_finite() || *value <= 0.0 || *value > 1.0 {
                let clamped = if value.is_finite() && *value > 0.0 {
                    value.min(1.0)
                } else {
                    MIN_LINE_WIDTH
                };
                warn!("{what} min_line_width {value} out of range; clamping to {clamped}");
                *value = clamped;
            }
        };

        clamp_width(&mut self.outline.line_width, "outline");
        clamp_fraction(&mut self.outline.min_line_width, "outline");
        clamp_width(&mut self.brush.line_width, "brush");
        clamp_fraction(&mut self.brush.min_line_width, "brush");
        clamp_width(&mut self.line.line_width, "line");
        clamp_width(&mut self.eraser.line_width, "eraser");
    }
}
