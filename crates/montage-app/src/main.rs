//! Montage - clip-to-segment matching driver
//!
//! Reads a blueprint and a clip index, runs the matching engine and writes
//! the resulting EDL.

use anyhow::{Context, Result};
use clap::Parser;
use montage_core::{BeatGrid, Blueprint, ClipIndex};
use montage_matcher::{MatchConfig, MatchEngine};
use montage_timeline::EdlFile;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Match analysed clips to a blueprint and assemble an EDL
#[derive(Debug, Parser)]
#[command(name = "montage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Blueprint JSON: the segments to fill
    blueprint: PathBuf,

    /// Clip index JSON: analysed clips and their moment windows
    clips: PathBuf,

    /// Beat grid JSON (array of seconds)
    #[arg(long)]
    beats: Option<PathBuf>,

    /// Matcher configuration JSON; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the versioned EDL file here
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let blueprint: Blueprint = read_json(&args.blueprint)?;
    let clips: ClipIndex = read_json(&args.clips)?;
    let beats: Option<BeatGrid> = args.beats.as_deref().map(read_json::<BeatGrid>).transpose()?;
    let config: MatchConfig = match args.config.as_deref() {
        Some(path) => read_json(path)?,
        None => MatchConfig::default(),
    };

    info!(
        blueprint = %args.blueprint.display(),
        clips = clips.len(),
        beats = beats.as_ref().map_or(0, BeatGrid::len),
        "Inputs loaded"
    );

    let mut engine = MatchEngine::new(config);
    let outcome = engine
        .run(&blueprint, &clips, beats.as_ref())
        .context("matching failed")?;
    let edl = outcome.edl;

    let stats = edl.stats();
    println!(
        "{} cuts over {:.2}s (declared {:.2}s)",
        stats.cut_count,
        edl.timeline_end(),
        edl.total_duration
    );
    println!(
        "cut length: avg {:.2}s, min {:.2}s, max {:.2}s",
        stats.avg_cut, stats.min_cut, stats.max_cut
    );
    for (clip, uses) in &stats.clip_usage {
        println!("  {clip}: {uses}");
    }
    if !edl.warnings.is_empty() {
        let label = if stats.degraded { " (degraded)" } else { "" };
        println!("{} warnings{label}:", stats.warning_count);
        for warning in &edl.warnings {
            println!("  {warning}");
        }
    }

    if let Some(out) = &args.out {
        EdlFile::new(edl)
            .save_to_file(out)
            .with_context(|| format!("writing {}", out.display()))?;
        info!(path = %out.display(), "EDL written");
    }

    Ok(())
}
