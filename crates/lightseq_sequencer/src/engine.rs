// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sample-clocked light replay.
//!
//! The [`LightManager`] holds the animation every light is running and
//! replays a compiled [`CommandStack`] as the playhead advances. One call
//! to [`LightManager::update`] consumes every command that has become due,
//! in time order, so a forward seek of any length lands on the same state
//! continuous playback would have reached.
//!
//! Moving the playhead backwards does not un-apply consumed commands: to
//! rewind, [`reset`](LightManager::reset), install a fresh stack and
//! replay from the new position.

use crate::animation::AnimationDesc;
use crate::color::Color;
use crate::command::Command;
use crate::compiler::CommandStack;
use crate::group::{GroupId, GroupRegistry, LightId};

/// Per-light animation state machine
#[derive(Debug, Clone, Default)]
pub struct LightManager {
    /// Current animation of each light
    lights: Vec<AnimationDesc>,
    /// Last evaluated color of each light
    light_states: Vec<Color>,
    /// Member lights of each group
    groups: Vec<Vec<LightId>>,
    /// Commands still to fire
    command_stack: CommandStack,
}

impl LightManager {
    /// Create an engine with no lights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with `light_count` lights and the registry's groups.
    ///
    /// Returns the first group member outside the light range on failure.
    pub fn with_registry(
        light_count: usize,
        registry: &GroupRegistry,
    ) -> Result<Self, (GroupId, LightId)> {
        if let Some(bad) = registry.find_out_of_range(light_count) {
            return Err(bad);
        }
        let mut manager = Self::new();
        for _ in 0..light_count {
            manager.add_light();
        }
        for (_, group) in registry.iter() {
            manager.new_group(&group.lights);
        }
        Ok(manager)
    }

    /// Add a light, switched off, and return its index
    pub fn add_light(&mut self) -> LightId {
        let id = LightId(self.lights.len());
        self.lights.push(AnimationDesc::default());
        self.light_states.push(Color::BLACK);
        id
    }

    /// Register a group and return its index. Membership is copied.
    pub fn new_group(&mut self, lights: &[LightId]) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(lights.to_vec());
        id
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Install a compiled stack, replacing the current one
    pub fn set_command_stack(&mut self, stack: CommandStack) {
        self.command_stack = stack;
    }

    /// Commands not yet consumed
    pub fn pending_commands(&self) -> &CommandStack {
        &self.command_stack
    }

    /// Switch every light off and drop the command stack
    pub fn reset(&mut self) {
        self.lights.fill(AnimationDesc::default());
        self.light_states.fill(Color::BLACK);
        self.command_stack.clear();
    }

    /// Advance to `current_sample`: apply due commands, then recompute colors
    pub fn update(&mut self, current_sample: i64) {
        self.update_animations(current_sample);
        self.update_light_states(current_sample);
    }

    /// Apply every command due at or before `current_sample`, earliest first
    pub fn update_animations(&mut self, current_sample: i64) {
        while let Some(command) = self.command_stack.pop_due(current_sample) {
            self.apply(&command);
        }
    }

    fn apply(&mut self, command: &Command) {
        let Some(group) = self.groups.get(command.group_id.0) else {
            panic!(
                "command at sample {} targets {} but only {} groups are registered",
                command.trigger_sample,
                command.group_id,
                self.groups.len()
            );
        };
        for &light in group {
            let Some(slot) = self.lights.get_mut(light.0) else {
                panic!("{} in {} does not exist", light, command.group_id);
            };
            *slot = command.animation;
        }
    }

    /// Recompute every light's color at `current_sample`
    pub fn update_light_states(&mut self, current_sample: i64) {
        for (state, animation) in self.light_states.iter_mut().zip(&self.lights) {
            *state = animation.color_at(current_sample);
        }
    }

    /// Last computed color of every light, indexed by light
    pub fn light_states(&self) -> &[Color] {
        &self.light_states
    }

    /// Current animation of a light
    pub fn animation(&self, light: LightId) -> Option<&AnimationDesc> {
        self.lights.get(light.0)
    }
}
