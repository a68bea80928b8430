// SPDX-License-Identifier: MIT OR Apache-2.0
//! Python show script export.
//!
//! The script declares one builder light per rig light, one builder group
//! per extra registry entry, then replays every command of every enabled
//! keyframe in timeline order with times in milliseconds.

use crate::animation::AnimationDesc;
use crate::color::Color;
use crate::command::Command;
use crate::compiler::timeline;
use crate::group::GroupId;
use crate::interpolation::GradientKind;
use crate::project::ProjectData;
use crate::settings::ScriptMetadata;
use std::fmt::Write as _;
use std::path::Path;

const INDENT: &str = "    ";

/// Convert a sample position to whole milliseconds
pub fn sample_to_ms(sample: i64, sample_rate: u32) -> i64 {
    sample.saturating_mul(1000) / i64::from(sample_rate)
}

fn interpolation_name(kind: GradientKind) -> &'static str {
    match kind {
        GradientKind::Linear => "Inter.LINEAR",
        GradientKind::EaseIn => "Inter.EASE_IN",
        GradientKind::EaseOut => "Inter.EASE_OUT",
        GradientKind::EaseInOut => "Inter.EASE_INOUT",
    }
}

fn color_literal(color: Color) -> String {
    format!("({}, {}, {}, {})", color.r, color.g, color.b, color.a)
}

fn group_name(group: GroupId) -> String {
    format!("group_{}", group.0)
}

/// Render one command as a builder call
pub fn command_directive(command: &Command, sample_rate: u32) -> String {
    let at = sample_to_ms(command.trigger_sample, sample_rate);
    let group = group_name(command.group_id);

    match &command.animation {
        AnimationDesc::Toggle(toggle) if toggle.is_on => {
            format!("on({at}, {group}, {})", color_literal(toggle.color))
        }
        AnimationDesc::Toggle(_) => format!("off({at}, {group})"),
        AnimationDesc::Gradient(gradient) => format!(
            "gradient({at}, {group}, {}, {}, {}, {})",
            color_literal(gradient.start_color),
            color_literal(gradient.end_color),
            sample_to_ms(gradient.duration, sample_rate),
            interpolation_name(gradient.kind),
        ),
        AnimationDesc::Blink(blink) => format!(
            "blink({at}, {group}, {}, {}, {})",
            color_literal(blink.on_color),
            color_literal(blink.off_color),
            sample_to_ms(blink.period, sample_rate),
        ),
    }
}

fn header(metadata: &ScriptMetadata) -> String {
    format!(
        "from Sequencer.builder_utils import *\n\
         \n\
         metadata = {{\n\
         {INDENT}\"title\"      : {:?},\n\
         {INDENT}\"music\"      : {:?},\n\
         {INDENT}\"priority\"   : {}\n\
         }}\n\
         \n\
         def build():\n\
         {INDENT}reset_builder()\n\
         \n",
        metadata.title, metadata.music, metadata.priority
    )
}

/// Generate the show script for a project
pub fn generate_script(project: &ProjectData, metadata: &ScriptMetadata) -> String {
    let mut out = header(metadata);

    for light in 0..project.light_count {
        let _ = writeln!(out, "{INDENT}group_{light} = add_light()");
    }
    out.push('\n');

    for (id, group) in project.groups.iter().skip(project.light_count) {
        let members: String = group
            .lights
            .iter()
            .map(|light| format!("group_{}, ", light.0))
            .collect();
        let _ = writeln!(out, "{INDENT}{} = new_group(({members}))", group_name(id));
    }
    out.push_str("\n\n");

    let store = project.to_store();
    let mut emitted = 0usize;
    for (keyframe, commands) in timeline(&store) {
        if !keyframe.is_enabled {
            continue;
        }
        for command in &commands {
            let _ = writeln!(out, "{INDENT}{}", command_directive(command, project.sample_rate));
            emitted += 1;
        }
        out.push('\n');
    }

    out.push('\n');
    let _ = writeln!(out, "{INDENT}return main_return()");

    tracing::debug!("Generated script with {} directives", emitted);
    out
}

/// Write a generated script to disk
pub fn save_script(path: &Path, script: &str) -> std::io::Result<()> {
    std::fs::write(path, script)?;
    tracing::info!("Exported script to {:?}", path);
    Ok(())
}
