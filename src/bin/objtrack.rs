//! `objtrack` binary: replays recorded detection frames through the tracker.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin objtrack -- --input frames.json --output tracking_log.json
//! cargo run --bin objtrack -- --input frames.json --claim --dwell 3 --reach 80
//! ```

use anyhow::Context;
use clap::Parser;
use objtrack::{ClaimOutcome, Config, Detection, ObjectTracker, TrackId, Trackable};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "objtrack",
    version,
    about = "Replay detection frames through the object tracker"
)]
struct Args {
    /// JSON file holding an array of frames, each an array of detections
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Tracking log output path
    #[arg(short, long, value_name = "FILE", default_value = "tracking_log.json")]
    output: PathBuf,

    /// Path to a JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the match distance tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Override the missed-frame eviction threshold
    #[arg(long)]
    max_missed: Option<u32>,

    /// Simulate an actuator that claims one object at a time
    #[arg(long, default_value_t = false)]
    claim: bool,

    /// Frames a claimed object is held before it counts as done
    #[arg(long, default_value_t = 1)]
    dwell: u32,

    /// Claimed objects farther than this from the origin are abandoned
    #[arg(long)]
    reach: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct TrackLog {
    track_id: TrackId,
    x: f64,
    y: f64,
    z: f64,
    size: f64,
    missed_frames: u32,
    claimed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FrameLog {
    frame_id: usize,
    detections: Vec<Detection>,
    tracks: Vec<TrackLog>,
    claimed: Option<TrackId>,
}

/// Stand-in for the downstream actuator: holds at most one claim and
/// settles it after `dwell` frames.
struct Actuator {
    dwell: u32,
    reach: Option<f64>,
    current: Option<(TrackId, u32)>,
}

impl Actuator {
    fn new(dwell: u32, reach: Option<f64>) -> Self {
        Self {
            dwell,
            reach,
            current: None,
        }
    }

    fn in_reach(&self, det: &Detection) -> bool {
        self.reach
            .map_or(true, |reach| det.position().coords.norm() <= reach)
    }

    fn step(&mut self, tracker: &mut ObjectTracker) -> anyhow::Result<Option<TrackId>> {
        if let Some((id, held)) = self.current.take() {
            match tracker.get(id) {
                None => warn!(track = %id, "claimed object was evicted"),
                Some(obj) if !self.in_reach(&obj.value) => {
                    tracker.complete(id, ClaimOutcome::Abandon)?;
                    info!(track = %id, "out of reach, abandoned");
                }
                Some(_) if held + 1 >= self.dwell => {
                    tracker.complete(id, ClaimOutcome::Success)?;
                }
                Some(_) => self.current = Some((id, held + 1)),
            }
        }

        if self.current.is_none() {
            if let Some(obj) = tracker.top() {
                info!(
                    track = %obj.id,
                    position = %obj.value.position(),
                    "claimed next object"
                );
                self.current = Some((obj.id, 0));
            }
        }

        Ok(self.current.map(|(id, _)| id))
    }
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(tolerance) = args.tolerance {
        config.distance_tolerance = tolerance;
    }
    if let Some(max_missed) = args.max_missed {
        config.max_missed_frames = max_missed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .init();

    let config = load_config(&args)?;
    info!(
        "Tracking with tolerance {} and max missed frames {}",
        config.distance_tolerance, config.max_missed_frames
    );

    let data = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let frames: Vec<Vec<Detection>> = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse frames from {}", args.input.display()))?;
    info!("Loaded {} frames from {}", frames.len(), args.input.display());

    let mut tracker: ObjectTracker = ObjectTracker::new(config)?;
    let mut actuator = args.claim.then(|| Actuator::new(args.dwell, args.reach));
    let mut tracking_log = Vec::with_capacity(frames.len());

    for (frame_id, detections) in frames.into_iter().enumerate() {
        let summary = tracker.update(&detections);

        let claimed = match actuator.as_mut() {
            Some(actuator) => actuator.step(&mut tracker)?,
            None => None,
        };

        let tracks = tracker
            .active_objects()
            .into_iter()
            .map(|obj| TrackLog {
                track_id: obj.id,
                x: obj.value.x,
                y: obj.value.y,
                z: obj.value.z,
                size: obj.value.size,
                missed_frames: obj.missed_frames,
                claimed: obj.claimed,
            })
            .collect();

        tracking_log.push(FrameLog {
            frame_id,
            detections,
            tracks,
            claimed,
        });

        if frame_id % 10 == 0 {
            info!(
                "Frame {}: {} tracked, {} new, {} evicted",
                frame_id,
                tracker.object_count(),
                summary.registered.len(),
                summary.evicted.len()
            );
        }
    }

    let json = serde_json::to_string_pretty(&tracking_log)?;
    let mut file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    file.write_all(json.as_bytes())?;
    info!("Tracking log saved to {}", args.output.display());

    Ok(())
}
