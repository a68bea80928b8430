// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation descriptions: what a light is currently doing.
//!
//! Every animation that depends on time carries the sample at which its
//! own clock started. Evaluation is a pure function of that origin and
//! the sample being rendered.

use crate::color::Color;
use crate::interpolation::{GradientKind, Interpolation};
use serde::{Deserialize, Serialize};

/// Kind of animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    /// Static on/off color
    Toggle,
    /// Timed fade between two colors
    Gradient,
    /// Periodic square wave between two colors
    Blink,
}

impl AnimationKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Gradient => "gradient",
            Self::Blink => "blink",
        }
    }
}

/// Static light state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleInfo {
    /// Whether the light is lit
    pub is_on: bool,
    /// Color shown while lit
    pub color: Color,
}

impl Default for ToggleInfo {
    fn default() -> Self {
        Self {
            is_on: false,
            color: Color::BLACK,
        }
    }
}

/// Time-bounded fade between two colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientInfo {
    /// Color at the start of the fade
    pub start_color: Color,
    /// Color once the fade completes
    pub end_color: Color,
    /// Easing curve
    pub kind: GradientKind,
    /// Sample at which the fade begins
    pub start_sample: i64,
    /// Fade length in samples
    pub duration: i64,
}

/// Periodic two-color square wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkInfo {
    /// Color for the first half of each period
    pub on_color: Color,
    /// Color for the second half of each period
    pub off_color: Color,
    /// Sample at which the first period begins
    pub start_sample: i64,
    /// Period length in samples
    pub period: i64,
}

/// Animation description, tagged by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationDesc {
    /// Static on/off color
    Toggle(ToggleInfo),
    /// Timed fade
    Gradient(GradientInfo),
    /// Periodic blink
    Blink(BlinkInfo),
}

impl Default for AnimationDesc {
    fn default() -> Self {
        Self::Toggle(ToggleInfo::default())
    }
}

impl AnimationDesc {
    /// Light switched on with a color
    pub fn on(color: Color) -> Self {
        Self::Toggle(ToggleInfo { is_on: true, color })
    }

    /// Light switched off
    pub fn off() -> Self {
        Self::Toggle(ToggleInfo::default())
    }

    /// Fade starting at sample 0; retiming moves the origin
    pub fn gradient(
        start_color: Color,
        end_color: Color,
        kind: GradientKind,
        duration: i64,
    ) -> Self {
        Self::Gradient(GradientInfo {
            start_color,
            end_color,
            kind,
            start_sample: 0,
            duration,
        })
    }

    /// Blink starting at sample 0; retiming moves the origin
    pub fn blink(on_color: Color, off_color: Color, period: i64) -> Self {
        Self::Blink(BlinkInfo {
            on_color,
            off_color,
            start_sample: 0,
            period,
        })
    }

    /// Get the animation kind
    pub fn kind(&self) -> AnimationKind {
        match self {
            Self::Toggle(_) => AnimationKind::Toggle,
            Self::Gradient(_) => AnimationKind::Gradient,
            Self::Blink(_) => AnimationKind::Blink,
        }
    }

    /// Time origin, if this animation has one
    pub fn start_sample(&self) -> Option<i64> {
        match self {
            Self::Toggle(_) => None,
            Self::Gradient(g) => Some(g.start_sample),
            Self::Blink(b) => Some(b.start_sample),
        }
    }

    /// Move the time origin to `sample`. Toggles have none and are untouched.
    pub fn retime(&mut self, sample: i64) {
        match self {
            Self::Toggle(_) => {}
            Self::Gradient(g) => g.start_sample = sample,
            Self::Blink(b) => b.start_sample = sample,
        }
    }

    /// Sample at which the animation stops changing.
    ///
    /// Blinks never settle; their first full period is reported.
    pub fn end_sample(&self) -> Option<i64> {
        match self {
            Self::Toggle(_) => None,
            Self::Gradient(g) => Some(g.end_sample()),
            Self::Blink(b) => Some(b.start_sample.saturating_add(b.period.max(0))),
        }
    }

    /// Evaluate the color this animation shows at `sample`
    pub fn color_at(&self, sample: i64) -> Color {
        match self {
            Self::Toggle(toggle) => toggle.color_at(),
            Self::Gradient(gradient) => gradient.color_at(sample),
            Self::Blink(blink) => blink.color_at(sample),
        }
    }
}

impl ToggleInfo {
    /// Color of the light, opaque black when off
    pub fn color_at(&self) -> Color {
        if self.is_on {
            self.color
        } else {
            Color::BLACK
        }
    }
}

impl GradientInfo {
    /// Sample at which the fade reaches its end color
    pub fn end_sample(&self) -> i64 {
        self.start_sample.saturating_add(self.duration.max(0))
    }

    /// Normalized, clamped progress through the fade
    pub fn progress(&self, sample: i64) -> f64 {
        if self.duration <= 0 {
            return 1.0;
        }
        let elapsed = sample.saturating_sub(self.start_sample) as f64;
        (elapsed / self.duration as f64).clamp(0.0, 1.0)
    }

    /// Color at `sample`
    pub fn color_at(&self, sample: i64) -> Color {
        let t = self.kind.apply(self.progress(sample));
        Interpolation::lerp_color(self.start_color, self.end_color, t)
    }
}

impl BlinkInfo {
    /// Whether the blink shows its on color at `sample`
    pub fn is_on_at(&self, sample: i64) -> bool {
        if self.period <= 0 {
            return false;
        }
        let elapsed = sample.saturating_sub(self.start_sample).max(0) % self.period;
        elapsed < self.period / 2
    }

    /// Color at `sample`
    pub fn color_at(&self, sample: i64) -> Color {
        if self.is_on_at(sample) {
            self.on_color
        } else {
            self.off_color
        }
    }
}
