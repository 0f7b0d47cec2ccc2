//! 8-bit RGB colors and the HSL palette helpers.

use serde::Serialize;

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear per-channel blend; `f = 0` gives `self`, `f = 1` gives `other`.
    pub fn mix(self, other: Color, f: f64) -> Color {
        Color {
            r: mix_bytes(self.r, other.r, f),
            g: mix_bytes(self.g, other.g, f),
            b: mix_bytes(self.b, other.b, f),
        }
    }

    /// Subtract `amount` from every channel, stopping at 0.
    pub fn darken(self, amount: u8) -> Color {
        Color {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }

    /// Add `amount` to every channel, stopping at 255.
    pub fn lighten(self, amount: u8) -> Color {
        Color {
            r: self.r.saturating_add(amount),
            g: self.g.saturating_add(amount),
            b: self.b.saturating_add(amount),
        }
    }

    /// Color from hue (degrees, 0-360), saturation and lightness (both 0-100).
    ///
    /// Zero saturation yields white regardless of lightness.
    pub fn from_hsl(hue: i32, sat: i32, lightness: i32) -> Color {
        let h = f64::from(hue) / 360.0;
        let s = f64::from(sat) / 100.0;
        let l = f64::from(lightness) / 100.0;

        let (r, g, b) = if s == 0.0 {
            (1.0, 1.0, 1.0)
        } else {
            let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let m1 = 2.0 * l - m2;
            (
                hue_channel(m1, m2, h + 1.0 / 3.0),
                hue_channel(m1, m2, h),
                hue_channel(m1, m2, h - 1.0 / 3.0),
            )
        };
        Color::new(to_byte(r), to_byte(g), to_byte(b))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color> for image::Rgb<u8> {
    fn from(c: Color) -> Self {
        image::Rgb(c.to_array())
    }
}

fn mix_bytes(b1: u8, b2: u8, f: f64) -> u8 {
    let v = f64::from(b1) + f * (f64::from(b2) - f64::from(b1));
    v.round().clamp(0.0, 255.0) as u8
}

fn to_byte(v: f64) -> u8 {
    (255.0 * v).clamp(0.0, 255.0) as u8
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

/// A palette role: fixed hue and saturation, lightness chosen per use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HueSat {
    pub hue: i32,
    pub sat: i32,
}

impl HueSat {
    pub fn new(hue: i32, sat: i32) -> Self {
        Self { hue, sat }
    }

    pub fn color(&self, lightness: i32) -> Color {
        Color::from_hsl(self.hue, self.sat, lightness)
    }
}
