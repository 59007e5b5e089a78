// src/replay.rs
//
// Host side: replays recorded detector output through a SwingSession.
//
// Input: one JSON object per line, one line per processed frame:
//   {"frame": 812, "detections": [{"label": "sports ball", "confidence": 0.71,
//                                  "bbox": [0.41, 0.52, 0.43, 0.55]}]}
//
// Fast mode drives the session from a synthetic clock (frame / source_fps).
// Realtime mode paces frames on the tokio clock and sleeps on the session's
// quiet-period deadline between frames.

use crate::analysis::TrajectoryCurve;
use crate::coordinates::ViewTransform;
use crate::detection::{BallFilter, RawDetection};
use crate::pipeline::{MetricsSummary, SessionEvent};
use crate::swing_session::SwingSession;
use crate::types::{Config, SessionSummary, SwingResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame: u64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub file: String,
    pub generated_at: DateTime<Utc>,
    pub frames: usize,
    pub swings: Vec<SwingResult>,
    pub summary: SessionSummary,
    pub metrics: MetricsSummary,
    /// View-space curve of the last finalized swing.
    pub last_trajectory: Option<TrajectoryCurve>,
}

pub fn find_detection_logs(input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory {} does not exist", input_dir.display());
    }

    let mut logs: Vec<PathBuf> = WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
                .unwrap_or(false)
        })
        .collect();
    logs.sort();

    info!("Found {} detection logs", logs.len());
    Ok(logs)
}

pub fn parse_frames(contents: &str, source: &Path) -> Result<Vec<FrameRecord>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<FrameRecord>(line)
                .with_context(|| format!("{}:{}: malformed frame record", source.display(), i + 1))
        })
        .collect()
}

pub async fn load_frames(path: &Path) -> Result<Vec<FrameRecord>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_frames(&contents, path)
}

/// Replay on a synthetic clock: frame `n` happens at `n / source_fps` seconds.
pub fn replay_frames(config: &Config, frames: &[FrameRecord]) -> SwingSession {
    let filter = BallFilter::new(config.detection.clone());
    let fps = config.replay.source_fps;

    let mut session = SwingSession::new(config);
    session.start();

    for record in frames {
        let now = record.frame as f64 / fps;
        session.poll(now);

        if let Some(detection) = filter.select(record.frame, &record.detections) {
            session.process_frame(&detection, now);
        }
        log_events(session.drain_events());
    }

    session.stop();
    log_events(session.drain_events());
    session
}

/// Replay paced on the tokio clock. The quiet-period deadline is awaited
/// alongside the next frame so a timeout fires between frames.
pub async fn replay_frames_realtime(config: &Config, frames: &[FrameRecord]) -> SwingSession {
    let filter = BallFilter::new(config.detection.clone());
    let fps = config.replay.source_fps;

    let mut session = SwingSession::new(config);
    session.start();

    let start = Instant::now();
    let first_frame = frames.first().map(|r| r.frame).unwrap_or_default();
    let mut pending = frames.iter().peekable();

    while let Some(&record) = pending.peek() {
        let offset = record.frame.saturating_sub(first_frame) as f64 / fps;
        let frame_due = start + Duration::from_secs_f64(offset);

        match session.next_deadline() {
            Some(deadline) if start + Duration::from_secs_f64(deadline) < frame_due => {
                sleep_until(start + Duration::from_secs_f64(deadline)).await;
                let now = start.elapsed().as_secs_f64().max(deadline);
                session.poll(now);
            }
            _ => {
                sleep_until(frame_due).await;
                let now = start.elapsed().as_secs_f64().max(offset);
                if let Some(detection) = filter.select(record.frame, &record.detections) {
                    session.process_frame(&detection, now);
                }
                pending.next();
            }
        }
        log_events(session.drain_events());
    }

    if let Some(deadline) = session.next_deadline() {
        sleep_until(start + Duration::from_secs_f64(deadline)).await;
        session.poll(start.elapsed().as_secs_f64().max(deadline));
    }

    session.stop();
    log_events(session.drain_events());
    session
}

pub async fn process_log(config: &Config, path: &Path) -> Result<ReplayReport> {
    let frames = load_frames(path).await?;
    info!("Replaying {} frames from {}", frames.len(), path.display());

    let session = if config.replay.realtime {
        replay_frames_realtime(config, &frames).await
    } else {
        replay_frames(config, &frames)
    };

    let view = ViewTransform::new(config.replay.view_width, config.replay.view_height);
    Ok(ReplayReport {
        file: path.display().to_string(),
        generated_at: Utc::now(),
        frames: frames.len(),
        swings: session.history().to_vec(),
        summary: session.summary(),
        metrics: session.metrics(),
        last_trajectory: session.last_swing_curve(&view),
    })
}

pub async fn write_report(output_dir: impl AsRef<Path>, log_path: &Path, report: &ReplayReport) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let stem = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    let out_path = output_dir.join(format!("{}.summary.json", stem));

    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(&out_path, json)
        .await
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    info!("💾 Summary saved to {}", out_path.display());
    Ok(out_path)
}

fn log_events(events: Vec<SessionEvent>) {
    for event in events {
        match event {
            SessionEvent::ContactDetected { smash } => {
                debug!("Contact at frame {}", smash.frame_index)
            }
            SessionEvent::SwingFinalized(result) => info!(
                "Swing: {:.0} mph | {:.0}° | {:.0} ft{}",
                result.speed_mph,
                result.launch_angle_deg,
                result.distance_ft,
                if result.is_home_run { " | HOME RUN" } else { "" }
            ),
            SessionEvent::SwingDiscarded { reason } => debug!("Swing discarded: {}", reason),
            SessionEvent::SessionStopped(summary) => {
                if summary.total_swings == 0 {
                    warn!("Session ended without a measurable swing");
                }
            }
        }
    }
}
