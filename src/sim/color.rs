//! Pixel colors and the fixed palette

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            3 => {
                let mut channels = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    channels[i] = v * 17;
                }
                Some(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => None,
        }
    }

    /// CSS hex string (`#rrggbb`)
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation per channel, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> u8 {
            let a = a as f32;
            let b = b as f32;
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// Colors matching the page gradient, plus white for contrast
pub const PALETTE: [Rgb; 4] = [
    Rgb::new(0x57, 0xcb, 0xf8), // light blue (text shadow)
    Rgb::new(0xe1, 0xff, 0x6e), // green-yellow (top gradient)
    Rgb::new(0x50, 0xc8, 0xff), // sky blue (bottom gradient)
    Rgb::WHITE,
];

/// Any palette color
pub fn random_color<R: Rng>(rng: &mut R) -> Rgb {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// A palette color different from `current` (when the palette allows it)
pub fn random_color_except<R: Rng>(rng: &mut R, current: Rgb) -> Rgb {
    let choices: Vec<Rgb> = PALETTE.iter().copied().filter(|c| *c != current).collect();
    if choices.is_empty() {
        return current;
    }
    choices[rng.random_range(0..choices.len())]
}
