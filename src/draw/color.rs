//! RGBA color type, native-endian packing, and HSV conversions.
//!
//! Pixel buffers store bytes in `[r, g, b, a]` order. The packed `u32` form
//! mirrors how that byte sequence reads as a native-endian word, so the two
//! representations can be reinterpreted in place (flood fill relies on this).

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with an explicit alpha channel.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses a `#RRGGBB` hex string into an opaque color.
    ///
    /// Returns `None` if the string is not exactly seven characters starting
    /// with `#` or contains non-hex digits.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self::rgb(r, g, b))
    }

    /// Packs the color into a native-endian `u32`.
    ///
    /// On little-endian targets byte 0 of the word is red and byte 3 is
    /// alpha; big-endian targets use the reverse layout. Either way the word
    /// reinterprets the `[r, g, b, a]` byte sequence in place.
    pub fn pack(self) -> u32 {
        u32::from_ne_bytes([self.r, self.g, self.b, self.a])
    }

    /// Unpacks a native-endian `u32` produced by [`Color::pack`].
    pub fn unpack(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_ne_bytes();
        Self { r, g, b, a }
    }
}

/// Fully transparent black. Written by the eraser tool.
pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

/// Opaque black, the default foreground color.
pub const BLACK: Color = Color::rgb(0, 0, 0);

/// Opaque white.
pub const WHITE: Color = Color::rgb(255, 255, 255);

/// A hue/saturation/value triple.
///
/// `h` is in degrees `[0, 360)`, `s` and `v` are in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Converts HSV to RGB using the standard six-sector mapping.
///
/// `h` must be in `[0, 360)`, `s` and `v` in `[0, 1]`. Returned channels are
/// in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let h = h / 60.0;
    let sector = (h.floor() as i32).rem_euclid(6);
    let f = h - h.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector {
        0 => [v, t, p],
        1 => [q, v, p],
        2 => [p, v, t],
        3 => [p, q, v],
        4 => [t, p, v],
        _ => [v, p, q],
    }
}

/// Converts 8-bit RGB channels to HSV.
///
/// Returns all zeros when any channel is exactly 0 (degenerate-input
/// shortcut kept for compatibility with existing palette behavior) or when
/// the input is achromatic.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    if r == 0 || g == 0 || b == 0 {
        return Hsv {
            h: 0.0,
            s: 0.0,
            v: 0.0,
        };
    }

    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return Hsv {
            h: 0.0,
            s: 0.0,
            v: 0.0,
        };
    }

    let mut h = if max == r {
        (g - b) / delta
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    h *= 60.0;
    if h < 0.0 {
        h += 360.0;
    }

    Hsv {
        h,
        s: delta / max,
        v: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_reads_bytes_in_buffer_order() {
        let color = Color::rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(color.pack().to_ne_bytes(), [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(Color::unpack(color.pack()), color);
    }

    #[test]
    fn hex_parsing_accepts_rrggbb_only() {
        assert_eq!(Color::from_hex("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("#FF8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(Color::from_hex("ff8000"), None);
        assert_eq!(Color::from_hex("#ff80"), None);
        assert_eq!(Color::from_hex("#ff80zz"), None);
    }

    #[test]
    fn hsv_sector_mapping_matches_reference() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [1.0, 0.0, 0.0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0.0, 1.0, 0.0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn rgb_to_hsv_degenerate_inputs_return_zero() {
        let zero = Hsv {
            h: 0.0,
            s: 0.0,
            v: 0.0,
        };
        assert_eq!(rgb_to_hsv(0, 128, 255), zero);
        assert_eq!(rgb_to_hsv(90, 90, 90), zero);
    }

    #[test]
    fn hsv_round_trip_within_rounding_tolerance() {
        for &(r, g, b) in &[
            (200u8, 100u8, 50u8),
            (10, 240, 30),
            (30, 60, 250),
            (128, 64, 32),
        ] {
            let hsv = rgb_to_hsv(r, g, b);
            let [fr, fg, fb] = hsv_to_rgb(hsv.h, hsv.s, hsv.v);
            assert!((fr * 255.0 - f32::from(r)).abs() < 1.0, "r for {:?}", (r, g, b));
            assert!((fg * 255.0 - f32::from(g)).abs() < 1.0, "g for {:?}", (r, g, b));
            assert!((fb * 255.0 - f32::from(b)).abs() < 1.0, "b for {:?}", (r, g, b));
        }
    }
}
