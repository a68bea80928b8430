// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project snapshots and their JSON persistence.
//!
//! A snapshot holds everything needed to rebuild an edit session: the rig
//! size, the group registry, every keyframe with its flags, the commands
//! owned by each keyframe and the fresh-id counter.

use crate::command::Command;
use crate::group::{GroupId, GroupRegistry, LightId};
use crate::keyframe::{Keyframe, KeyframeId, KeyframeStore};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Project file extension
pub const PROJECT_EXTENSION: &str = "json";

/// Project load/save errors
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or missing fields
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Sample rate of zero
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    /// Two keyframes share an ID
    #[error("Duplicate keyframe: {0}")]
    DuplicateKeyframe(KeyframeId),

    /// Commands stored for a keyframe that does not exist
    #[error("Commands stored for missing {0}")]
    OrphanCommands(KeyframeId),

    /// A group references a light outside the rig
    #[error("{group} references {light}, but the rig has {light_count} lights")]
    LightOutOfRange {
        /// Offending group
        group: GroupId,
        /// Offending light
        light: LightId,
        /// Rig size
        light_count: usize,
    },

    /// A command targets a group missing from the registry
    #[error("{keyframe} targets unknown {group}")]
    UnknownGroup {
        /// Keyframe owning the command
        keyframe: KeyframeId,
        /// Referenced group
        group: GroupId,
    },
}

/// Serializable project snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Number of lights in the rig
    pub light_count: usize,
    /// Audio sample rate the keyframe samples are expressed in
    pub sample_rate: u32,
    /// Group registry
    pub groups: GroupRegistry,
    /// Keyframes with their flags
    pub keyframes: Vec<Keyframe>,
    /// Commands owned by each keyframe
    pub commands: IndexMap<KeyframeId, Vec<Command>>,
    /// Fresh-id counter
    pub max_uuid: i64,
}

impl ProjectData {
    /// Empty project with one single-light group per light
    pub fn new(light_count: usize, sample_rate: u32) -> Self {
        Self {
            light_count,
            sample_rate,
            groups: GroupRegistry::with_single_light_groups(light_count),
            keyframes: Vec::new(),
            commands: IndexMap::new(),
            max_uuid: 0,
        }
    }

    /// Snapshot a keyframe store
    pub fn from_store(
        light_count: usize,
        sample_rate: u32,
        groups: GroupRegistry,
        store: &KeyframeStore,
    ) -> Self {
        Self {
            light_count,
            sample_rate,
            groups,
            keyframes: store.keyframes().to_vec(),
            commands: store.command_map().clone(),
            max_uuid: store.max_uuid(),
        }
    }

    /// Check the snapshot for integrity problems
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.sample_rate == 0 {
            return Err(ProjectError::InvalidSampleRate(self.sample_rate));
        }

        let mut seen = HashSet::with_capacity(self.keyframes.len());
        for keyframe in &self.keyframes {
            if !seen.insert(keyframe.uuid) {
                return Err(ProjectError::DuplicateKeyframe(keyframe.uuid));
            }
        }

        if let Some(orphan) = self.commands.keys().find(|id| !seen.contains(id)) {
            return Err(ProjectError::OrphanCommands(*orphan));
        }

        if let Some((group, light)) = self.groups.find_out_of_range(self.light_count) {
            return Err(ProjectError::LightOutOfRange {
                group,
                light,
                light_count: self.light_count,
            });
        }

        for (keyframe, commands) in &self.commands {
            if let Some(command) = commands.iter().find(|c| !self.groups.contains(c.group_id)) {
                return Err(ProjectError::UnknownGroup {
                    keyframe: *keyframe,
                    group: command.group_id,
                });
            }
        }

        Ok(())
    }

    /// Rebuild the keyframe store: re-sorted, retimed, index rebuilt
    pub fn to_store(&self) -> KeyframeStore {
        KeyframeStore::from_parts(self.keyframes.clone(), self.commands.clone(), self.max_uuid)
    }

    /// Parse and validate a project from JSON text
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let project: Self = serde_json::from_str(json)?;
        project.validate()?;
        Ok(project)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a project file
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path)?;
        let project = Self::from_json(&content)?;
        tracing::info!(
            "Loaded project {:?}: {} lights, {} groups, {} keyframes",
            path,
            project.light_count,
            project.groups.len(),
            project.keyframes.len()
        );
        Ok(project)
    }

    /// Save a project file
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("Saved project to {:?}", path);
        Ok(())
    }
}
