// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattening of keyframe commands into a playback stack.

use crate::command::Command;
use crate::group::{GroupId, GroupRegistry};
use crate::keyframe::{Keyframe, KeyframeId, KeyframeStore};
use thiserror::Error;

/// Compilation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A command targets a group missing from the registry
    #[error("{keyframe} targets {group}, but only {group_count} groups exist")]
    UnknownGroup {
        /// Keyframe owning the command
        keyframe: KeyframeId,
        /// Referenced group
        group: GroupId,
        /// Registry size at compile time
        group_count: usize,
    },
}

/// Commands ready for playback.
///
/// Stored latest-first so the earliest due command is always at the tail
/// and can be popped in O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStack {
    commands: Vec<Command>,
}

impl CommandStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap commands already stored latest-first.
    ///
    /// The caller guarantees the ordering; it is not checked.
    pub fn from_reversed(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Build a stack from commands in playback order (earliest first)
    pub fn from_chronological(mut commands: Vec<Command>) -> Self {
        commands.reverse();
        Self { commands }
    }

    /// Pop the next command if it fires at or before `sample`
    pub fn pop_due(&mut self, sample: i64) -> Option<Command> {
        match self.commands.last() {
            Some(next) if next.trigger_sample <= sample => self.commands.pop(),
            _ => None,
        }
    }

    /// Next command to fire
    pub fn peek(&self) -> Option<&Command> {
        self.commands.last()
    }

    /// Remaining commands, latest first
    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Number of remaining commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether every command has been consumed
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every remaining command
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

/// Keyframes in compile order, each with its retimed commands.
///
/// Disabled keyframes are included; callers decide whether to skip them.
pub fn timeline(store: &KeyframeStore) -> Vec<(Keyframe, Vec<Command>)> {
    let mut keyframes = store.keyframes().to_vec();
    keyframes.sort_by_key(Keyframe::sort_key);

    keyframes
        .into_iter()
        .map(|keyframe| {
            let mut commands = store.commands(keyframe.uuid).unwrap_or_default().to_vec();
            for command in &mut commands {
                command.retime(keyframe.trigger_sample);
            }
            (keyframe, commands)
        })
        .collect()
}

/// Compile the store into a command stack.
///
/// Commands of enabled keyframes are emitted in `(trigger_sample, uuid)`
/// order, then command-list order, and every command is retimed to its
/// keyframe. Compiling an unchanged store always yields the same stack.
pub fn compile(
    store: &KeyframeStore,
    groups: &GroupRegistry,
) -> Result<CommandStack, CompileError> {
    let mut flat = Vec::new();
    let mut skipped = 0usize;

    for (keyframe, commands) in timeline(store) {
        if !keyframe.is_enabled {
            skipped += 1;
            continue;
        }
        for command in commands {
            if !groups.contains(command.group_id) {
                return Err(CompileError::UnknownGroup {
                    keyframe: keyframe.uuid,
                    group: command.group_id,
                    group_count: groups.len(),
                });
            }
            flat.push(command);
        }
    }

    tracing::debug!(
        "Compiled {} commands from {} keyframes ({} disabled)",
        flat.len(),
        store.len(),
        skipped
    );

    Ok(CommandStack::from_chronological(flat))
}
