// SPDX-License-Identifier: MIT OR Apache-2.0
//! `lightseq` - command-line host for the light sequencer
//!
//! Loads a project, compiles its keyframes and replays them:
//! - Light colors at any sample
//! - Per-frame colors for offline video rendering
//! - Python show script export
//! - New empty projects

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "lightseq", version, about = "Keyframed light show sequencer")]
pub struct Cli {
    /// Settings file (RON); defaults are used when it does not exist
    #[arg(long, global = true, default_value = lightseq_sequencer::settings::SETTINGS_FILE_NAME)]
    pub settings: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write an empty project
    New {
        /// Project file to create
        path: PathBuf,
        /// Number of lights (defaults to the settings value)
        #[arg(long)]
        lights: Option<usize>,
        /// Sample rate (defaults to the settings value)
        #[arg(long)]
        sample_rate: Option<u32>,
    },
    /// Export the Python show script
    Script {
        /// Project file
        project: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print light colors at a sample as JSON
    States {
        /// Project file
        project: PathBuf,
        /// Sample to evaluate
        #[arg(long)]
        sample: i64,
    },
    /// Write per-frame light colors as JSON lines
    Frames {
        /// Project file
        project: PathBuf,
        /// Frame rate (defaults to the settings value)
        #[arg(long)]
        fps: Option<f64>,
        /// Length to render, in milliseconds; through the last keyframe or
        /// animation end when omitted
        #[arg(long)]
        duration_ms: Option<i64>,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("lightseq_cli=info,lightseq_sequencer=info")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!("lightseq v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = commands::run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
