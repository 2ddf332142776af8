//! Packed RGB colors and the color sequences animations consume.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 24-bit RGB color packed as `0x00RRGGBB`.
///
/// The packed form is what the pixel buffer stores atomically, so the type
/// stays `Copy` and conversion to and from `u32` is free. Serde goes through
/// the `u32` conversions so deserialized values get the same high-bit mask
/// as every other constructor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const RED: Color = Color(0xFF0000);
    pub const GREEN: Color = Color(0x00FF00);
    pub const BLUE: Color = Color(0x0000FF);
    pub const YELLOW: Color = Color(0xFFFF00);
    pub const CYAN: Color = Color(0x00FFFF);
    pub const MAGENTA: Color = Color(0xFF00FF);
    pub const ORANGE: Color = Color(0xFF8000);

    pub const fn new(r: u8, g: u8, b: u8) -> Color {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Wraps a packed `0x00RRGGBB` value, masking anything above bit 23.
    pub const fn from_value(value: u32) -> Color {
        Color(value & 0x00FF_FFFF)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Converts HSV to RGB. Hue is in degrees and wraps, saturation and
    /// value are clamped to `0.0..=1.0`.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Color {
        let h = h.rem_euclid(360.0);
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0..=59 => (c, x, 0.0),
            60..=119 => (x, c, 0.0),
            120..=179 => (0.0, c, x),
            180..=239 => (0.0, x, c),
            240..=299 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Color::new(
            ((r + m) * 255.0) as u8,
            ((g + m) * 255.0) as u8,
            ((b + m) * 255.0) as u8,
        )
    }

    /// Linear per-channel interpolation toward `other`.
    ///
    /// `amount` is clamped to `0.0..=1.0`; 0 keeps `self`, 1 yields `other`.
    pub fn blend(self, other: Color, amount: f32) -> Color {
        let t = amount.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f32 * (1.0 - t) + b as f32 * t) as u8;
        Color::new(
            lerp(self.red(), other.red()),
            lerp(self.green(), other.green()),
            lerp(self.blue(), other.blue()),
        )
    }

    /// Scales all channels by `intensity`, clamped to `0.0..=1.0`.
    pub fn scale(self, intensity: f32) -> Color {
        let i = intensity.clamp(0.0, 1.0);
        Color::new(
            (self.red() as f32 * i) as u8,
            (self.green() as f32 * i) as u8,
            (self.blue() as f32 * i) as u8,
        )
    }

    /// Largest single-channel difference to `other`.
    pub fn max_channel_delta(self, other: Color) -> u8 {
        let d = |a: u8, b: u8| a.abs_diff(b);
        d(self.red(), other.red())
            .max(d(self.green(), other.green()))
            .max(d(self.blue(), other.blue()))
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Color {
        Color::from_value(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> u32 {
        color.0
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Color {
        Color::new(r, g, b)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// An ordered list of colors that can be spread across a pixel range.
///
/// A sequence on its own has no length; [`ColorSequence::prepare`] resolves
/// it against a concrete pixel count, interpolating between entries so the
/// last color wraps smoothly back to the first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSequence {
    colors: Vec<Color>,
}

impl ColorSequence {
    pub fn new() -> ColorSequence {
        ColorSequence::default()
    }

    /// A single-color sequence; prepares to a flat fill.
    pub fn solid(color: Color) -> ColorSequence {
        ColorSequence {
            colors: vec![color],
        }
    }

    pub fn push(&mut self, color: Color) {
        self.colors.push(color);
    }

    pub fn with(mut self, color: Color) -> ColorSequence {
        self.colors.push(color);
        self
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Resolves the sequence to one color per pixel.
    ///
    /// Entries are treated as evenly spaced anchors around a cycle, so a
    /// two-color sequence over ten pixels fades out and back in again.
    /// An empty sequence prepares to all black.
    pub fn prepare(&self, num_leds: usize) -> PreparedColors {
        if num_leds == 0 {
            return PreparedColors { pixels: Vec::new() };
        }
        if self.colors.is_empty() {
            return PreparedColors {
                pixels: vec![Color::BLACK; num_leds],
            };
        }
        if self.colors.len() == 1 {
            return PreparedColors {
                pixels: vec![self.colors[0]; num_leds],
            };
        }

        let count = self.colors.len();
        let mut pixels = Vec::with_capacity(num_leds);
        for i in 0..num_leds {
            let scaled = i as f32 * count as f32 / num_leds as f32;
            let idx = scaled as usize;
            let sub_t = scaled - idx as f32;
            let start = self.colors[idx % count];
            let end = self.colors[(idx + 1) % count];
            pixels.push(start.blend(end, sub_t));
        }
        PreparedColors { pixels }
    }
}

impl From<Vec<Color>> for ColorSequence {
    fn from(colors: Vec<Color>) -> ColorSequence {
        ColorSequence { colors }
    }
}

impl From<Color> for ColorSequence {
    fn from(color: Color) -> ColorSequence {
        ColorSequence::solid(color)
    }
}

/// A color sequence resolved against a concrete pixel count.
///
/// Lookups wrap, so `get(i + offset)` rotates the palette; animations use
/// that for chase effects instead of reshuffling the buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreparedColors {
    pixels: Vec<Color>,
}

impl PreparedColors {
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Color for `pixel`, wrapping past the end. Black when empty.
    pub fn get(&self, pixel: usize) -> Color {
        if self.pixels.is_empty() {
            return Color::BLACK;
        }
        self.pixels[pixel % self.pixels.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels.iter().copied()
    }
}
