use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use dance_coach::config::Config;
use dance_coach::profile::{load_profile, save_profile};
use dance_coach::{DanceAnalyzer, DanceMove, Landmark, SkillLevel, UserProfile};

/// Replay a recorded landmark stream through the dance analyzer.
#[derive(Parser, Debug)]
#[command(name = "dance_replay", version)]
struct Args {
    /// JSON-lines recording, one `{"timestamp": secs, "landmarks": [...]}` per line
    recording: PathBuf,

    /// Dance move id (basic-step, side-step)
    #[arg(short, long, default_value = "basic-step")]
    r#move: String,

    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Profile JSON; loaded if present and saved back after the replay
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Override the profile's skill level
    #[arg(long, value_enum)]
    skill: Option<SkillLevel>,
}

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    timestamp: Option<f64>,
    landmarks: Vec<Landmark>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let dance_move: DanceMove = args.r#move.parse()?;
    let config = Config::load_or_default(&args.config);

    let mut profile = match &args.profile {
        Some(path) if path.exists() => load_profile(path)?,
        _ => UserProfile::default(),
    };
    if let Some(skill) = args.skill {
        profile.skill_level = skill;
    }
    tracing::info!(
        "Replaying {} as '{}' ({:?}) for {}",
        args.recording.display(),
        dance_move,
        profile.skill_level,
        profile.name
    );

    let file = File::open(&args.recording)
        .with_context(|| format!("Failed to open recording {}", args.recording.display()))?;
    let mut analyzer = DanceAnalyzer::with_config(&config, profile);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut frames = 0usize;
    let mut scored = 0usize;
    let mut rejected = 0usize;
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let recorded: RecordedFrame = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record on line {}", line_no + 1))?;
        frames += 1;

        let result = match recorded.timestamp {
            Some(ts) => analyzer.analyze_at(recorded.landmarks, dance_move, ts),
            None => analyzer.analyze(recorded.landmarks, dance_move),
        };
        match result {
            Ok(Some(feedback)) => {
                scored += 1;
                serde_json::to_writer(&mut out, &feedback)?;
                writeln!(out)?;
            }
            Ok(None) => {}
            Err(e) => {
                rejected += 1;
                tracing::warn!("Line {}: {}", line_no + 1, e);
            }
        }
    }

    tracing::info!("Frames: {}, scored: {}, rejected: {}", frames, scored, rejected);
    if let Some(last) = analyzer.score_history().scores().last() {
        let progress = analyzer.score_history().progress();
        tracing::info!(
            "Last score {} | improvement {:+} | consistency {:.1} | {}",
            last,
            progress.improvement,
            progress.consistency,
            progress.trend.message()
        );
    }

    if let Some(path) = &args.profile {
        save_profile(path, analyzer.user_profile())?;
        tracing::info!("Profile saved to {}", path.display());
    }

    Ok(())
}
