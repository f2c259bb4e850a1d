use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zonecount_rs::ZoneSpec;
use zonecount_rs::pipeline::{DiscardSink, RecordedTracker, ReplaySource};
use zonecount_rs::session::{CountingService, ServiceConfig, SessionOutcome};

/// Count zone crossings in recorded tracker output and print the per-zone totals.
#[derive(Parser, Debug)]
#[command(name = "zone-replay", version)]
struct Args {
    /// Zone definitions, a JSON array of {type, points, classes}
    #[arg(long, value_name = "PATH")]
    zones: PathBuf,
    /// Tracker output, one JSON frame per line
    #[arg(long, value_name = "PATH")]
    detections: PathBuf,
    /// Service configuration (class map, threading)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Do not yield the worker thread between frames
    #[arg(long)]
    no_yield: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zonecount_rs=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServiceConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServiceConfig::default(),
    };
    if args.no_yield {
        config.yield_between_frames = false;
    }

    let zones_json = fs::read_to_string(&args.zones)
        .with_context(|| format!("failed to read {}", args.zones.display()))?;
    let zones: Vec<ZoneSpec> =
        serde_json::from_str(&zones_json).context("invalid zone configuration")?;
    let source = ReplaySource::open(&args.detections)
        .with_context(|| format!("failed to open {}", args.detections.display()))?;

    let mut service = CountingService::new(config);
    let session = service.start_session(&zones, source, RecordedTracker, DiscardSink)?;
    info!(
        session = session.id,
        zones = session.zones,
        "replaying {}",
        args.detections.display()
    );

    let summary = service.wait().context("no session to wait for")?;
    match summary.outcome {
        SessionOutcome::Finished(run) => {
            info!(frames = run.frames, credits = run.credits, "replay complete")
        }
        SessionOutcome::Failed(e) => return Err(anyhow::Error::new(e).context("replay failed")),
        SessionOutcome::Panicked => bail!("frame loop panicked"),
    }

    let report = service.report().context("no session report")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
