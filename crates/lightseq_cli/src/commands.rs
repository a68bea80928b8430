// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::{Cli, Command};
use lightseq_sequencer::{
    generate_script, save_script, Color, CompileError, EditSession, ProjectData, ProjectError,
    SequencerSettings, SettingsError,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Error type for subcommands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Project could not be loaded or saved
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    /// Project keyframes do not compile
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Output could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad argument value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Light colors at one point in time
#[derive(Debug, Serialize)]
struct StatesRecord<'a> {
    /// Frame index, absent for single-sample queries
    #[serde(skip_serializing_if = "Option::is_none")]
    frame: Option<usize>,
    /// Sample evaluated
    sample: i64,
    /// One color per light
    lights: &'a [Color],
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<(), CliError> {
    let settings = SequencerSettings::load_or_default(&cli.settings)?;

    match cli.command {
        Command::New { path, lights, sample_rate } => new_project(
            &path,
            lights.unwrap_or(settings.light_count),
            sample_rate.unwrap_or(settings.sample_rate),
        ),
        Command::Script { project, output } => {
            export_script(&project, output.as_deref(), &settings)
        }
        Command::States { project, sample } => print_states(&project, sample),
        Command::Frames { project, fps, duration_ms, output } => {
            let fps = fps.unwrap_or(settings.frame_rate);
            if fps.is_nan() || fps <= 0.0 {
                return Err(CliError::InvalidArgument(format!("fps must be positive, got {fps}")));
            }
            export_frames(&project, fps, duration_ms, output.as_deref())
        }
    }
}

fn new_project(path: &Path, lights: usize, sample_rate: u32) -> Result<(), CliError> {
    if sample_rate == 0 {
        return Err(CliError::InvalidArgument("sample rate must be positive".to_string()));
    }
    ProjectData::new(lights, sample_rate).save(path)?;
    Ok(())
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>, CliError> {
    Ok(match output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn export_script(
    project: &Path,
    output: Option<&Path>,
    settings: &SequencerSettings,
) -> Result<(), CliError> {
    let project = ProjectData::load(project)?;
    let script = generate_script(&project, &settings.script);
    match output {
        Some(path) => save_script(path, &script)?,
        None => std::io::stdout().write_all(script.as_bytes())?,
    }
    Ok(())
}

fn print_states(project: &Path, sample: i64) -> Result<(), CliError> {
    let mut session = EditSession::from_project(&ProjectData::load(project)?)?;
    let lights = session.tick(sample)?;
    let record = StatesRecord { frame: None, sample, lights };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Samples to render: the requested length, or through the timeline end
fn render_length(session: &EditSession, duration_ms: Option<i64>) -> i64 {
    match duration_ms {
        Some(ms) => ms.max(0).saturating_mul(i64::from(session.sample_rate())) / 1000,
        None => session.store().end_sample().saturating_add(1),
    }
}

fn export_frames(
    project: &Path,
    fps: f64,
    duration_ms: Option<i64>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let mut session = EditSession::from_project(&ProjectData::load(project)?)?;
    let total_samples = render_length(&session, duration_ms);
    let frames = session.render_frames(fps, total_samples)?;

    let samples_per_frame = f64::from(session.sample_rate()) / fps;
    let mut out = open_output(output)?;
    for (frame, lights) in frames.iter().enumerate() {
        let record = StatesRecord {
            frame: Some(frame),
            sample: (frame as f64 * samples_per_frame) as i64,
            lights,
        };
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::info!("Wrote {} frames", frames.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_frames() {
        let args = ["lightseq", "frames", "show.json", "--duration-ms", "2000", "--fps", "25"];
        match Cli::parse_from(args).command {
            Command::Frames { fps, duration_ms, output, .. } => {
                assert_eq!(fps, Some(25.0));
                assert_eq!(duration_ms, Some(2_000));
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }

        match Cli::parse_from(["lightseq", "frames", "show.json"]).command {
            Command::Frames { fps, duration_ms, .. } => {
                assert_eq!(fps, None);
                assert_eq!(duration_ms, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_new_then_states() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("show.json");
        new_project(&project, 3, 44_100).unwrap();

        let loaded = ProjectData::load(&project).unwrap();
        assert_eq!(loaded.light_count, 3);
        print_states(&project, 100).unwrap();
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero_rate.json");
        assert!(matches!(new_project(&path, 1, 0), Err(CliError::InvalidArgument(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_render_length_defaults_to_timeline_end() {
        let mut session = EditSession::new(1, 1_000);
        assert_eq!(render_length(&session, None), 1);

        session.create_keyframe(2_000, 0).unwrap();
        assert_eq!(render_length(&session, None), 2_001);
        assert_eq!(render_length(&session, Some(500)), 500);
        assert_eq!(render_length(&session, Some(-5)), 0);
        assert_eq!(render_length(&session, Some(i64::MAX)), i64::MAX / 1000);
    }

    #[test]
    fn test_export_frames_through_timeline_end() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("show.json");
        let mut session = EditSession::new(1, 1_000);
        session.create_keyframe(2_000, 0).unwrap();
        session.to_project().save(&project).unwrap();

        let output = dir.path().join("frames.jsonl");
        export_frames(&project, 1.0, None, Some(&output)).unwrap();
        let lines = std::fs::read_to_string(&output).unwrap();
        assert_eq!(lines.lines().count(), 3);
    }
}
