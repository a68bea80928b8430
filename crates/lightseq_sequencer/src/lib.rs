// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-driven light sequencing.
//!
//! This crate turns an editable set of keyframes into sample-accurate
//! light colors:
//! - Keyframes anchored on an audio sample timeline, each owning commands
//! - Commands that switch a group of lights to a toggle, gradient or blink
//! - A compiler flattening keyframes into a time-ordered command stack
//! - A replay engine evaluating every light at any playhead position
//!
//! ## Architecture
//!
//! Editing happens on the [`KeyframeStore`]. Before playback the store is
//! compiled into a [`CommandStack`], which the [`LightManager`] consumes as
//! the sample clock advances. [`EditSession`] ties the pieces together for
//! editor front ends; [`ProjectData`] and [`script`] cover persistence and
//! export.

pub mod color;
pub mod interpolation;
pub mod animation;
pub mod group;
pub mod command;
pub mod keyframe;
pub mod compiler;
pub mod engine;
pub mod project;
pub mod script;
pub mod settings;
pub mod session;

pub use color::Color;
pub use interpolation::{GradientKind, Interpolation};
pub use animation::{AnimationDesc, AnimationKind, BlinkInfo, GradientInfo, ToggleInfo};
pub use group::{Group, GroupId, GroupRegistry, LightId};
pub use command::Command;
pub use keyframe::{Keyframe, KeyframeError, KeyframeId, KeyframeStore};
pub use compiler::{compile, timeline, CommandStack, CompileError};
pub use engine::LightManager;
pub use project::{ProjectData, ProjectError};
pub use script::{generate_script, sample_to_ms, save_script};
pub use settings::{ScriptMetadata, SequencerSettings, SettingsError};
pub use session::{EditSession, PlaybackState, Selection};
