// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edit session: keyframe editing, selection and playback in one context.
//!
//! The session owns everything an editor front end needs (the keyframe
//! store, the group registry, the replay engine and the selection), and
//! serializes compile and replay so they never overlap.

use crate::color::Color;
use crate::compiler::{compile, CompileError};
use crate::group::GroupRegistry;
use crate::engine::LightManager;
use crate::keyframe::{KeyframeId, KeyframeStore};
use crate::project::{ProjectData, ProjectError};
use std::collections::BTreeSet;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Paused
    Paused,
}

/// Selected keyframes
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected keyframe IDs
    pub keyframes: BTreeSet<KeyframeId>,
}

/// Editing and playback context for one project
#[derive(Debug, Clone)]
pub struct EditSession {
    /// Keyframes being edited
    store: KeyframeStore,
    /// Group registry
    groups: GroupRegistry,
    /// Replay engine
    engine: LightManager,
    /// Rig size
    light_count: usize,
    /// Sample rate of the keyframe timeline
    sample_rate: u32,
    /// Current selection
    selection: Selection,
    /// Playback state
    state: PlaybackState,
    /// Last sample the engine replayed to
    playhead: Option<i64>,
}

impl EditSession {
    /// Create an empty session with one single-light group per light
    pub fn new(light_count: usize, sample_rate: u32) -> Self {
        let groups = GroupRegistry::with_single_light_groups(light_count);
        let mut engine = LightManager::new();
        for _ in 0..light_count {
            engine.add_light();
        }
        for (_, group) in groups.iter() {
            engine.new_group(&group.lights);
        }

        Self {
            store: KeyframeStore::new(),
            groups,
            engine,
            light_count,
            sample_rate: sample_rate.max(1),
            selection: Selection::default(),
            state: PlaybackState::Stopped,
            playhead: None,
        }
    }

    /// Open a session on a validated project snapshot
    pub fn from_project(project: &ProjectData) -> Result<Self, ProjectError> {
        project.validate()?;
        let engine = LightManager::with_registry(project.light_count, &project.groups).map_err(
            |(group, light)| ProjectError::LightOutOfRange {
                group,
                light,
                light_count: project.light_count,
            },
        )?;

        Ok(Self {
            store: project.to_store(),
            groups: project.groups.clone(),
            engine,
            light_count: project.light_count,
            sample_rate: project.sample_rate,
            selection: Selection::default(),
            state: PlaybackState::Stopped,
            playhead: None,
        })
    }

    /// Snapshot the session for saving
    pub fn to_project(&self) -> ProjectData {
        let groups = self.groups.clone();
        ProjectData::from_store(self.light_count, self.sample_rate, groups, &self.store)
    }

    /// Keyframes being edited
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    /// Keyframes for command edits; playback picks changes up on the next
    /// [`play`](Self::play) or backward [`tick`](Self::tick)
    pub fn store_mut(&mut self) -> &mut KeyframeStore {
        &mut self.store
    }

    /// Current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Group registry
    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    /// Sample rate of the timeline
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Last replayed sample
    pub fn playhead(&self) -> Option<i64> {
        self.playhead
    }

    /// Current light colors
    pub fn light_states(&self) -> &[Color] {
        self.engine.light_states()
    }

    // ---- Editing ----

    /// Create a keyframe at `sample` unless one already sits within `tolerance`
    pub fn create_keyframe(&mut self, sample: i64, tolerance: i64) -> Option<KeyframeId> {
        if let Some(existing) = self.store.keyframe_near(sample, tolerance) {
            tracing::debug!("{} already near sample {}", existing.uuid, sample);
            return None;
        }
        Some(self.store.create(sample.max(0)))
    }

    /// Delete every selected keyframe, returning how many were removed
    pub fn delete_selected(&mut self) -> usize {
        let selected = std::mem::take(&mut self.selection.keyframes);
        selected
            .into_iter()
            .filter(|id| self.store.remove(*id).is_some())
            .count()
    }

    /// Add a keyframe to the selection
    pub fn select(&mut self, id: KeyframeId) -> bool {
        self.store.keyframe(id).is_some() && self.selection.keyframes.insert(id)
    }

    /// Remove a keyframe from the selection
    pub fn deselect(&mut self, id: KeyframeId) -> bool {
        self.selection.keyframes.remove(&id)
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.keyframes.clear();
    }

    /// Select both ends and every keyframe strictly between them
    pub fn select_range(&mut self, from: KeyframeId, to: KeyframeId) -> usize {
        let (Some(a), Some(b)) = (self.store.keyframe(from), self.store.keyframe(to)) else {
            return 0;
        };
        let mut ids: Vec<KeyframeId> = self
            .store
            .keyframes_between(a.trigger_sample, b.trigger_sample)
            .map(|k| k.uuid)
            .collect();
        ids.extend([from, to]);

        ids.into_iter()
            .filter(|id| self.selection.keyframes.insert(*id))
            .count()
    }

    /// Shift the selection by `delta` samples; locked keyframes stay put
    pub fn drag_selection(&mut self, delta: i64) -> usize {
        let ids: Vec<KeyframeId> = self.selection.keyframes.iter().copied().collect();
        let moved = self.store.drag(&ids, delta);
        if moved < ids.len() {
            tracing::debug!("Dragged {} of {} selected keyframes", moved, ids.len());
        }
        moved
    }

    // ---- Playback ----

    /// Rebuild engine state and replay up to `sample`
    fn replay_from_start(&mut self, sample: i64) -> Result<(), CompileError> {
        let stack = compile(&self.store, &self.groups)?;
        self.engine.reset();
        self.engine.set_command_stack(stack);
        self.engine.update(sample);
        self.playhead = Some(sample);
        Ok(())
    }

    /// Compile the current keyframes and start playing from `sample`
    pub fn play(&mut self, sample: i64) -> Result<(), CompileError> {
        self.replay_from_start(sample)?;
        self.state = PlaybackState::Playing;
        tracing::debug!("Playback started at sample {}", sample);
        Ok(())
    }

    /// Pause playback, keeping the current light states
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Stop playback and switch every light off
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.engine.reset();
        self.playhead = None;
    }

    /// Advance to the sample reported by the audio playhead.
    ///
    /// Moving forward replays incrementally. Moving backward, or ticking
    /// without a prior [`play`](Self::play), recompiles and replays from the
    /// start so the result always matches continuous playback.
    pub fn tick(&mut self, sample: i64) -> Result<&[Color], CompileError> {
        match self.playhead {
            Some(last) if sample >= last => {
                self.engine.update(sample);
                self.playhead = Some(sample);
            }
            _ => self.replay_from_start(sample)?,
        }
        Ok(self.engine.light_states())
    }

    /// Render one color vector per video frame, replaying from the start.
    ///
    /// Frame `n` is evaluated at sample `n * sample_rate / fps`. Playback
    /// state is left stopped afterwards.
    pub fn render_frames(
        &mut self,
        fps: f64,
        total_samples: i64,
    ) -> Result<Vec<Vec<Color>>, CompileError> {
        let samples_per_frame = f64::from(self.sample_rate) / fps.max(f64::MIN_POSITIVE);
        let frame_count = if total_samples <= 0 {
            0
        } else {
            (total_samples as f64 / samples_per_frame).ceil() as usize
        };

        self.replay_from_start(0)?;
        let mut frames = Vec::with_capacity(frame_count);
        for frame in 0..frame_count {
            let sample = (frame as f64 * samples_per_frame) as i64;
            self.engine.update(sample);
            frames.push(self.engine.light_states().to_vec());
        }

        tracing::debug!("Rendered {} frames at {} fps", frames.len(), fps);
        self.stop();
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationDesc;
    use crate::group::GroupId;
    use crate::interpolation::GradientKind;

    const RED: Color = Color::rgb(255, 0, 0);

    fn session_with_show() -> (EditSession, KeyframeId, KeyframeId) {
        let mut session = EditSession::new(2, 1_000);
        let on = session.create_keyframe(0, 10).unwrap();
        session
            .store_mut()
            .edit_command(on, 0, |c| c.animation = AnimationDesc::on(RED))
            .unwrap();

        let fade = session.create_keyframe(1_000, 10).unwrap();
        session
            .store_mut()
            .edit_command(fade, 0, |c| {
                c.animation =
                    AnimationDesc::gradient(RED, Color::WHITE, GradientKind::Linear, 1_000);
                c.group_id = GroupId(1);
            })
            .unwrap();
        (session, on, fade)
    }

    #[test]
    fn test_create_refuses_nearby_keyframe() {
        let (mut session, on, _) = session_with_show();
        assert!(session.create_keyframe(5, 10).is_none());
        assert!(session.create_keyframe(500, 10).is_some());
        assert!(session.select(on));
        assert!(!session.select(KeyframeId(99)));
    }

    #[test]
    fn test_store_edits_apply_on_replay() {
        let (mut session, on, _) = session_with_show();
        session.play(0).unwrap();
        assert_eq!(session.light_states()[0], RED);

        session
            .store_mut()
            .edit_command(on, 0, |c| c.animation = AnimationDesc::off())
            .unwrap();
        // Forward ticks keep the compiled stack; a replay recompiles
        assert_eq!(session.tick(10).unwrap()[0], RED);
        session.play(0).unwrap();
        assert_eq!(session.light_states()[0], Color::BLACK);
        assert!(session.selection().keyframes.is_empty());
    }

    #[test]
    fn test_play_and_tick() {
        let (mut session, _, _) = session_with_show();
        session.play(0).unwrap();
        assert_eq!(session.state(), PlaybackState::Playing);
        assert_eq!(session.light_states(), &[RED, Color::BLACK]);

        let states = session.tick(1_500).unwrap().to_vec();
        assert_eq!(states[0], RED);
        assert_eq!(states[1], Color::new(255, 127, 127, 255));

        session.pause();
        assert_eq!(session.state(), PlaybackState::Paused);
        session.stop();
        assert_eq!(session.light_states(), &[Color::BLACK, Color::BLACK]);
    }

    #[test]
    fn test_backward_tick_replays() {
        let (mut session, _, _) = session_with_show();
        session.play(0).unwrap();
        session.tick(2_500).unwrap();
        assert_eq!(session.light_states()[1], Color::WHITE);

        // Seeking back before the fade must bring light 1 back to black
        let states = session.tick(500).unwrap();
        assert_eq!(states, &[RED, Color::BLACK]);
        assert_eq!(session.playhead(), Some(500));
    }

    #[test]
    fn test_drag_selection_respects_locks() {
        let (mut session, on, fade) = session_with_show();
        session.store_mut().set_locked(on, true).unwrap();
        session.select(on);
        session.select(fade);

        assert_eq!(session.drag_selection(250), 1);
        let store = session.store();
        assert_eq!(store.keyframe(on).unwrap().trigger_sample, 0);
        assert_eq!(store.keyframe(fade).unwrap().trigger_sample, 1_250);
        let command = store.commands(fade).unwrap()[0];
        assert_eq!(command.animation.start_sample(), Some(1_250));
    }

    #[test]
    fn test_select_range_and_delete() {
        let (mut session, on, fade) = session_with_show();
        let middle = session.create_keyframe(500, 10).unwrap();
        session.create_keyframe(3_000, 10).unwrap();

        assert_eq!(session.select_range(fade, on), 3);
        assert!(session.selection().keyframes.contains(&middle));
        assert_eq!(session.delete_selected(), 3);
        assert_eq!(session.store().len(), 1);
        assert!(session.selection().keyframes.is_empty());
    }

    #[test]
    fn test_render_frames() {
        let (mut session, _, _) = session_with_show();
        let frames = session.render_frames(4.0, 2_000).unwrap();
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0], vec![RED, Color::BLACK]);
        assert_eq!(frames[6][1], Color::new(255, 127, 127, 255));
        assert_eq!(session.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_project_round_trip() {
        let (session, _, _) = session_with_show();
        let project = session.to_project();
        let reopened = EditSession::from_project(&project).unwrap();
        assert_eq!(reopened.store(), session.store());
        assert_eq!(reopened.sample_rate(), 1_000);
        assert_eq!(reopened.groups().len(), 2);
    }
}
