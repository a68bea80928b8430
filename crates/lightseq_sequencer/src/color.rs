// SPDX-License-Identifier: MIT OR Apache-2.0
//! RGBA color value type.

use serde::{Deserialize, Serialize};

/// An RGBA color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Fully opaque black, the color of a light that is off
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Fully opaque white
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Create a color from all four channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Build a color from wide integer channels, clamping each to `[0, 255]`
    pub fn clamped(r: i64, g: i64, b: i64, a: i64) -> Self {
        let c = |v: i64| v.clamp(0, 255) as u8;
        Self::new(c(r), c(g), c(b), c(a))
    }

    /// Channels as an array, in `[r, g, b, a]` order
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}
