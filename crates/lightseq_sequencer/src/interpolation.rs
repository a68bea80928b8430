// SPDX-License-Identifier: MIT OR Apache-2.0
//! Color interpolation and easing curves.
//!
//! Every function here is pure. Easing curves expect `t` already clamped
//! to `[0, 1]` by the caller.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Easing applied to a gradient's normalized time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    /// Straight linear fade
    #[default]
    Linear,
    /// Slow start, cubic
    EaseIn,
    /// Slow finish, cubic
    EaseOut,
    /// Slow start and finish, symmetric around the midpoint
    EaseInOut,
}

impl GradientKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "ease in",
            Self::EaseOut => "ease out",
            Self::EaseInOut => "ease inout",
        }
    }

    /// Get all gradient kinds
    pub fn all() -> &'static [GradientKind] {
        &[
            GradientKind::Linear,
            GradientKind::EaseIn,
            GradientKind::EaseOut,
            GradientKind::EaseInOut,
        ]
    }

    /// Shape a normalized time with this curve
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => Interpolation::ease_in(t),
            Self::EaseOut => Interpolation::ease_out(t),
            Self::EaseInOut => Interpolation::ease_in_out(t),
        }
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Cubic ease-in: `t^3`
    pub fn ease_in(t: f64) -> f64 {
        t * t * t
    }

    /// Cubic ease-out: `1 - (1 - t)^3`
    pub fn ease_out(t: f64) -> f64 {
        let inv = 1.0 - t;
        1.0 - inv * inv * inv
    }

    /// Cubic ease-in-out
    pub fn ease_in_out(t: f64) -> f64 {
        if t < 0.5 {
            0.5 * (2.0 * t).powi(3)
        } else {
            1.0 - 0.5 * (2.0 * (1.0 - t)).powi(3)
        }
    }

    /// Interpolate every channel of two colors, truncating toward zero
    pub fn lerp_color(a: Color, b: Color, t: f64) -> Color {
        let channel = |x: u8, y: u8| Self::lerp(f64::from(x), f64::from(y), t) as i64;
        Color::clamped(
            channel(a.r, b.r),
            channel(a.g, b.g),
            channel(a.b, b.b),
            channel(a.a, b.a),
        )
    }
}
