// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframes and the store that owns them.
//!
//! Keyframes and their commands are kept apart: the keyframe list holds
//! time anchors and flags, while commands live in a map keyed by keyframe
//! id so they survive any reordering of the list.

use crate::command::Command;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable keyframe identity, assigned monotonically and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeId(pub i64);

impl fmt::Display for KeyframeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keyframe #{}", self.0)
    }
}

/// A time anchor on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Sample the keyframe fires at
    pub trigger_sample: i64,
    /// Unique keyframe ID
    pub uuid: KeyframeId,
    /// Locked keyframes cannot be dragged
    pub is_locked: bool,
    /// Disabled keyframes contribute nothing to playback
    pub is_enabled: bool,
}

impl Keyframe {
    fn new(uuid: KeyframeId, trigger_sample: i64) -> Self {
        Self {
            trigger_sample,
            uuid,
            is_locked: false,
            is_enabled: true,
        }
    }

    /// Ordering key used everywhere keyframes are sorted
    pub fn sort_key(&self) -> (i64, KeyframeId) {
        (self.trigger_sample, self.uuid)
    }
}

/// Keyframe editing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyframeError {
    /// No keyframe with this ID
    #[error("Keyframe not found: {0}")]
    NotFound(KeyframeId),

    /// Keyframe is locked against moves
    #[error("{0} is locked")]
    Locked(KeyframeId),

    /// Command index out of range for the keyframe
    #[error("{keyframe} has no command at index {index}")]
    CommandIndex {
        /// Keyframe addressed
        keyframe: KeyframeId,
        /// Offending index
        index: usize,
    },
}

/// Authoritative set of keyframes and their commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeStore {
    /// Keyframes, kept sorted by `(trigger_sample, uuid)`
    keyframes: Vec<Keyframe>,
    /// Commands owned by each keyframe
    commands: IndexMap<KeyframeId, Vec<Command>>,
    /// Next fresh ID
    next_uuid: i64,
}

impl KeyframeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts.
    ///
    /// Keyframes are re-sorted, every command is retimed to its owner and
    /// the fresh-id counter is raised above every existing ID. Callers are
    /// expected to have validated uniqueness of IDs.
    pub fn from_parts(
        keyframes: Vec<Keyframe>,
        mut commands: IndexMap<KeyframeId, Vec<Command>>,
        max_uuid: i64,
    ) -> Self {
        let next_uuid = keyframes
            .iter()
            .map(|k| k.uuid.0 + 1)
            .fold(max_uuid.max(0), i64::max);

        let mut ordered = IndexMap::with_capacity(keyframes.len());
        for keyframe in &keyframes {
            let list = commands.swap_remove(&keyframe.uuid).unwrap_or_default();
            ordered.insert(keyframe.uuid, list);
        }

        let mut store = Self {
            keyframes,
            commands: ordered,
            next_uuid,
        };
        store.sort_keyframes();
        store.retime_all();
        store
    }

    /// Counter value to persist for fresh-id allocation
    pub fn max_uuid(&self) -> i64 {
        self.next_uuid
    }

    /// Sort keyframes by time, ties broken by ID
    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by_key(Keyframe::sort_key);
    }

    /// Bring every command back in line with its keyframe's sample
    pub fn retime_all(&mut self) {
        for keyframe in &self.keyframes {
            if let Some(list) = self.commands.get_mut(&keyframe.uuid) {
                for command in list.iter_mut() {
                    command.retime(keyframe.trigger_sample);
                }
            }
        }
    }

    /// Create a keyframe at `sample` carrying one empty command
    pub fn create(&mut self, sample: i64) -> KeyframeId {
        let id = KeyframeId(self.next_uuid);
        self.next_uuid += 1;

        self.keyframes.push(Keyframe::new(id, sample));
        self.commands.insert(id, vec![Command::empty(sample)]);
        self.sort_keyframes();

        tracing::debug!("Created {} at sample {}", id, sample);
        id
    }

    /// Remove a keyframe and all its commands
    pub fn remove(&mut self, id: KeyframeId) -> Option<(Keyframe, Vec<Command>)> {
        let index = self.keyframes.iter().position(|k| k.uuid == id)?;
        let keyframe = self.keyframes.remove(index);
        let commands = self.commands.shift_remove(&id).unwrap_or_default();
        Some((keyframe, commands))
    }

    /// Get a keyframe by ID
    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.uuid == id)
    }

    fn keyframe_mut(&mut self, id: KeyframeId) -> Result<&mut Keyframe, KeyframeError> {
        self.keyframes
            .iter_mut()
            .find(|k| k.uuid == id)
            .ok_or(KeyframeError::NotFound(id))
    }

    /// Keyframes in `(trigger_sample, uuid)` order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Commands owned by a keyframe
    pub fn commands(&self, id: KeyframeId) -> Option<&[Command]> {
        self.commands.get(&id).map(Vec::as_slice)
    }

    /// The raw ID → commands map
    pub fn command_map(&self) -> &IndexMap<KeyframeId, Vec<Command>> {
        &self.commands
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether there are no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframe closest to `sample` within `tolerance` samples
    pub fn keyframe_near(&self, sample: i64, tolerance: i64) -> Option<&Keyframe> {
        let tolerance = u64::try_from(tolerance).ok()?;
        self.keyframes
            .iter()
            .filter(|k| k.trigger_sample.abs_diff(sample) <= tolerance)
            .min_by_key(|k| k.trigger_sample.abs_diff(sample))
    }

    /// Last sample touched by any keyframe or animation, 0 when empty
    pub fn end_sample(&self) -> i64 {
        let commands = self.commands.values().flatten();
        let animation_end = commands.filter_map(|c| c.animation.end_sample());
        self.keyframes
            .iter()
            .map(|k| k.trigger_sample)
            .chain(animation_end)
            .max()
            .unwrap_or(0)
    }

    /// Keyframes strictly between two samples, in either argument order
    pub fn keyframes_between(&self, a: i64, b: i64) -> impl Iterator<Item = &Keyframe> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.keyframes
            .iter()
            .filter(move |k| start < k.trigger_sample && k.trigger_sample < end)
    }

    /// Move a keyframe to `sample`, retiming its commands.
    ///
    /// Locked keyframes are rejected and keep their position.
    pub fn move_keyframe(&mut self, id: KeyframeId, sample: i64) -> Result<(), KeyframeError> {
        let keyframe = self.keyframe_mut(id)?;
        if keyframe.is_locked {
            tracing::warn!("Refusing to move locked {}", id);
            return Err(KeyframeError::Locked(id));
        }
        keyframe.trigger_sample = sample;

        if let Some(list) = self.commands.get_mut(&id) {
            for command in list.iter_mut() {
                command.retime(sample);
            }
        }
        self.sort_keyframes();
        Ok(())
    }

    /// Shift several keyframes by `delta` samples, clamping at zero.
    ///
    /// Locked keyframes are skipped. Returns how many keyframes moved.
    pub fn drag(&mut self, ids: &[KeyframeId], delta: i64) -> usize {
        let mut moved = 0;
        for &id in ids {
            let Some(keyframe) = self.keyframe(id) else {
                continue;
            };
            if keyframe.is_locked {
                continue;
            }
            let target = keyframe.trigger_sample.saturating_add(delta).max(0);
            if self.move_keyframe(id, target).is_ok() {
                moved += 1;
            }
        }
        moved
    }

    /// Lock or unlock a keyframe
    pub fn set_locked(&mut self, id: KeyframeId, locked: bool) -> Result<(), KeyframeError> {
        self.keyframe_mut(id)?.is_locked = locked;
        Ok(())
    }

    /// Enable or disable a keyframe
    pub fn set_enabled(&mut self, id: KeyframeId, enabled: bool) -> Result<(), KeyframeError> {
        self.keyframe_mut(id)?.is_enabled = enabled;
        Ok(())
    }

    /// Append an empty command to a keyframe, returning its index
    pub fn add_command(&mut self, id: KeyframeId) -> Result<usize, KeyframeError> {
        let sample = self.keyframe_mut(id)?.trigger_sample;
        let list = self.commands.entry(id).or_default();
        list.push(Command::empty(sample));
        Ok(list.len() - 1)
    }

    /// Remove a command from a keyframe
    pub fn remove_command(
        &mut self,
        id: KeyframeId,
        index: usize,
    ) -> Result<Command, KeyframeError> {
        self.keyframe_mut(id)?;
        let list = self.commands.entry(id).or_default();
        if index >= list.len() {
            return Err(KeyframeError::CommandIndex { keyframe: id, index });
        }
        Ok(list.remove(index))
    }

    /// Edit a command in place.
    ///
    /// The command is retimed to its keyframe after `edit` runs, so edits
    /// cannot break the timing of a command.
    pub fn edit_command<R>(
        &mut self,
        id: KeyframeId,
        index: usize,
        edit: impl FnOnce(&mut Command) -> R,
    ) -> Result<R, KeyframeError> {
        let sample = self.keyframe_mut(id)?.trigger_sample;
        let command = self
            .commands
            .get_mut(&id)
            .and_then(|list| list.get_mut(index))
            .ok_or(KeyframeError::CommandIndex { keyframe: id, index })?;
        let result = edit(command);
        command.retime(sample);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationDesc;
    use crate::color::Color;
    use crate::group::GroupId;
    use crate::interpolation::GradientKind;

    fn gradient_store() -> (KeyframeStore, KeyframeId) {
        let mut store = KeyframeStore::new();
        let id = store.create(1_000);
        store
            .edit_command(id, 0, |c| {
                c.animation =
                    AnimationDesc::gradient(Color::BLACK, Color::WHITE, GradientKind::Linear, 500);
                c.group_id = GroupId(2);
            })
            .unwrap();
        store.add_command(id).unwrap();
        store
            .edit_command(id, 1, |c| {
                c.animation = AnimationDesc::blink(Color::WHITE, Color::BLACK, 50);
            })
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let mut store = KeyframeStore::new();
        let a = store.create(500);
        let b = store.create(100);
        store.remove(a);
        let c = store.create(300);

        assert_eq!((a, b, c), (KeyframeId(0), KeyframeId(1), KeyframeId(2)));
        assert_eq!(store.max_uuid(), 3);
        assert_eq!(store.commands(b).unwrap(), &[Command::empty(100)]);

        let order: Vec<i64> = store.keyframes().iter().map(|k| k.trigger_sample).collect();
        assert_eq!(order, vec![100, 300]);
    }

    #[test]
    fn test_remove_drops_commands() {
        let (mut store, id) = gradient_store();
        let (keyframe, commands) = store.remove(id).unwrap();
        assert_eq!(keyframe.uuid, id);
        assert_eq!(commands.len(), 2);
        assert!(store.commands(id).is_none());
        assert!(store.remove(id).is_none());
    }

    #[test]
    fn test_move_retimes_commands() {
        let (mut store, id) = gradient_store();
        store.move_keyframe(id, 2_000).unwrap();

        assert_eq!(store.keyframe(id).unwrap().trigger_sample, 2_000);
        for command in store.commands(id).unwrap() {
            assert_eq!(command.trigger_sample, 2_000);
            assert_eq!(command.animation.start_sample(), Some(2_000));
        }
    }

    #[test]
    fn test_locked_keyframe_rejects_move() {
        let (mut store, id) = gradient_store();
        store.set_locked(id, true).unwrap();

        assert_eq!(store.move_keyframe(id, 5), Err(KeyframeError::Locked(id)));
        assert_eq!(store.drag(&[id], 300), 0);
        assert_eq!(store.keyframe(id).unwrap().trigger_sample, 1_000);
        assert!(store.commands(id).unwrap().iter().all(|c| c.is_timed_to(1_000)));

        store.set_locked(id, false).unwrap();
        assert_eq!(store.drag(&[id], -5_000), 1);
        assert_eq!(store.keyframe(id).unwrap().trigger_sample, 0);
    }

    #[test]
    fn test_drag_keeps_sorted() {
        let mut store = KeyframeStore::new();
        let a = store.create(0);
        let b = store.create(100);
        let c = store.create(200);
        store.set_locked(c, true).unwrap();

        assert_eq!(store.drag(&[a, c], 150), 1);
        let order: Vec<KeyframeId> = store.keyframes().iter().map(|k| k.uuid).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_equal_times_sort_by_id() {
        let mut store = KeyframeStore::new();
        let a = store.create(50);
        let b = store.create(10);
        store.move_keyframe(b, 50).unwrap();
        let order: Vec<KeyframeId> = store.keyframes().iter().map(|k| k.uuid).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_command_crud_errors() {
        let (mut store, id) = gradient_store();
        let missing = KeyframeId(99);

        assert_eq!(store.add_command(missing), Err(KeyframeError::NotFound(missing)));
        assert_eq!(
            store.remove_command(id, 7),
            Err(KeyframeError::CommandIndex { keyframe: id, index: 7 })
        );
        let removed = store.remove_command(id, 0).unwrap();
        assert_eq!(removed.group_id, GroupId(2));
        assert_eq!(store.commands(id).unwrap().len(), 1);
    }

    #[test]
    fn test_edit_cannot_break_timing() {
        let (mut store, id) = gradient_store();
        store.edit_command(id, 0, |c| c.trigger_sample = 3).unwrap();
        assert!(store.commands(id).unwrap()[0].is_timed_to(1_000));
    }

    #[test]
    fn test_keyframe_queries() {
        let mut store = KeyframeStore::new();
        let a = store.create(1_000);
        let b = store.create(1_300);
        store.create(5_000);

        assert_eq!(store.keyframe_near(1_200, 200).map(|k| k.uuid), Some(b));
        assert_eq!(store.keyframe_near(1_100, 200).map(|k| k.uuid), Some(a));
        assert!(store.keyframe_near(3_000, 200).is_none());

        let between: Vec<KeyframeId> =
            store.keyframes_between(5_000, 1_000).map(|k| k.uuid).collect();
        assert_eq!(between, vec![b]);
    }

    #[test]
    fn test_end_sample() {
        assert_eq!(KeyframeStore::new().end_sample(), 0);

        // Gradient at 1_000 for 500 samples, blink with a 50 sample period
        let (mut store, _) = gradient_store();
        assert_eq!(store.end_sample(), 1_500);

        store.create(4_000);
        assert_eq!(store.end_sample(), 4_000);
    }

    #[test]
    fn test_keyframe_near_extreme_samples() {
        let mut store = KeyframeStore::new();
        let far = store.create(i64::MAX);

        assert_eq!(store.keyframe_near(i64::MIN, i64::MAX), None);
        assert_eq!(store.keyframe_near(i64::MAX - 5, 10).map(|k| k.uuid), Some(far));
        assert_eq!(store.keyframe_near(-1, i64::MAX).map(|k| k.uuid), None);
        assert_eq!(store.keyframe_near(0, i64::MAX).map(|k| k.uuid), Some(far));
        assert!(store.keyframe_near(i64::MAX, -1).is_none());
    }

    #[test]
    fn test_from_parts_rebuilds_index() {
        let keyframes = vec![
            Keyframe {
                trigger_sample: 900,
                uuid: KeyframeId(7),
                is_locked: true,
                is_enabled: true,
            },
            Keyframe {
                trigger_sample: 100,
                uuid: KeyframeId(3),
                is_locked: false,
                is_enabled: false,
            },
        ];
        let blink = AnimationDesc::blink(Color::WHITE, Color::BLACK, 10);
        let mut commands = IndexMap::new();
        commands.insert(KeyframeId(7), vec![Command::new(blink, GroupId(0), 0)]);

        let mut store = KeyframeStore::from_parts(keyframes, commands, 2);
        assert_eq!(store.keyframes()[0].uuid, KeyframeId(3));
        assert_eq!(store.commands(KeyframeId(3)).unwrap().len(), 0);
        assert!(store.commands(KeyframeId(7)).unwrap()[0].is_timed_to(900));
        assert_eq!(store.create(0), KeyframeId(8));
    }
}
