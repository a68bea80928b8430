// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencer settings.
//!
//! Settings are stored as RON next to the projects that use them and
//! cover the audio sample rate, the default rig size, offline render frame
//! rate and the metadata written into exported scripts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "lightseq.ron";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be written
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Metadata written at the top of exported scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptMetadata {
    /// Show title
    pub title: String,
    /// Path to the music file, as seen by the script runner
    pub music: String,
    /// Scheduling priority
    pub priority: i32,
}

impl Default for ScriptMetadata {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            music: String::new(),
            priority: -1,
        }
    }
}

/// Sequencer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSettings {
    /// Settings format version
    pub version: u32,
    /// Audio sample rate of new projects
    pub sample_rate: u32,
    /// Number of lights in new projects
    pub light_count: usize,
    /// Frame rate used for offline rendering
    pub frame_rate: f64,
    /// Two keyframes closer than this many samples count as the same spot
    pub keyframe_tolerance: i64,
    /// Script export metadata
    pub script: ScriptMetadata,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            sample_rate: 44_100,
            light_count: 12,
            frame_rate: 30.0,
            keyframe_tolerance: 441, // 10ms at 44.1kHz
            script: ScriptMetadata::default(),
        }
    }
}

impl SequencerSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = ron::from_str(&content)?;
        if settings.version != SETTINGS_FORMAT_VERSION {
            tracing::warn!(
                "Settings {:?} use format version {}, expected {}",
                path,
                settings.version,
                SETTINGS_FORMAT_VERSION
            );
        }
        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save settings as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}
