// SPDX-License-Identifier: MIT OR Apache-2.0
//! Group-targeted animation commands.

use crate::animation::AnimationDesc;
use crate::group::GroupId;
use serde::{Deserialize, Serialize};

/// A single animation instruction for a group of lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Animation every light of the group switches to
    pub animation: AnimationDesc,
    /// Sample at which the command fires
    pub trigger_sample: i64,
    /// Target group
    pub group_id: GroupId,
}

impl Command {
    /// Create a command, already timed to `trigger_sample`
    pub fn new(animation: AnimationDesc, group_id: GroupId, trigger_sample: i64) -> Self {
        let mut command = Self {
            animation,
            trigger_sample,
            group_id,
        };
        command.retime(trigger_sample);
        command
    }

    /// Blank command attached to fresh keyframes: switch group 0 off
    pub fn empty(trigger_sample: i64) -> Self {
        Self::new(AnimationDesc::off(), GroupId(0), trigger_sample)
    }

    /// Move the command, and its animation's time origin, to `sample`.
    ///
    /// This is the only place command timing is written.
    pub fn retime(&mut self, sample: i64) {
        self.trigger_sample = sample;
        self.animation.retime(sample);
    }

    /// Whether the command and its animation agree on `sample`
    pub fn is_timed_to(&self, sample: i64) -> bool {
        self.trigger_sample == sample && self.animation.start_sample().unwrap_or(sample) == sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::interpolation::GradientKind;

    #[test]
    fn test_retime_gradient() {
        let anim = AnimationDesc::gradient(Color::BLACK, Color::WHITE, GradientKind::Linear, 100);
        let mut command = Command::new(anim, GroupId(1), 10);
        assert!(command.is_timed_to(10));

        command.retime(4_410);
        assert_eq!(command.trigger_sample, 4_410);
        assert_eq!(command.animation.start_sample(), Some(4_410));
        assert!(command.is_timed_to(4_410));
        assert!(!command.is_timed_to(10));
    }

    #[test]
    fn test_retime_toggle() {
        let mut command = Command::new(AnimationDesc::on(Color::WHITE), GroupId(0), 0);
        command.retime(99);
        assert_eq!(command.trigger_sample, 99);
        assert_eq!(command.animation, AnimationDesc::on(Color::WHITE));
    }

    #[test]
    fn test_empty_command() {
        let command = Command::empty(12);
        assert_eq!(command.group_id, GroupId(0));
        assert_eq!(command.animation, AnimationDesc::off());
        assert_eq!(command.trigger_sample, 12);
    }
}
