// src/main.rs

use anyhow::Result;
use std::path::Path;
use swing_metrics::replay::{find_detection_logs, process_log, write_report};
use swing_metrics::Config;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    let config = if Path::new(&config_path).exists() {
        Some(Config::load(&config_path)?)
    } else {
        None
    };
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("swing_metrics={}", level))),
        )
        .init();

    info!("⚾ Swing Metrics Replay Starting");

    let config = match config {
        Some(config) => {
            info!("✓ Configuration loaded from {}", config_path);
            config
        }
        None => {
            warn!("{} not found, using defaults", config_path);
            Config::default()
        }
    };

    info!(
        "Home run distance: {} ft ({}), quiet period {:.1}s, {} fps source",
        config.session.home_run_distance.feet(),
        config.session.home_run_distance.as_str(),
        config.session.quiet_period_s,
        config.replay.source_fps
    );

    let logs = find_detection_logs(&config.replay.input_dir)?;
    if logs.is_empty() {
        error!("No detection logs found in {}", config.replay.input_dir);
        return Ok(());
    }

    for (idx, log) in logs.iter().enumerate() {
        info!("========================================");
        info!("Processing log {}/{}: {}", idx + 1, logs.len(), log.display());
        info!("========================================");

        match process_log(&config, log).await {
            Ok(report) => {
                let s = &report.summary;
                info!("✓ Replay complete ({} frames)", report.frames);
                info!("  Swings: {}", s.total_swings);
                info!("  🏆 Home runs: {}", s.total_home_runs);
                info!("  Longest: {:.0} ft", s.longest_distance_ft);
                info!("  Hardest: {:.0} mph", s.hardest_speed_mph);
                info!(
                    "  Average: {:.0} ft | {:.0} mph",
                    s.avg_distance_ft, s.avg_speed_mph
                );
                info!(
                    "  Duplicates dropped: {} ({:.1}%)",
                    report.metrics.duplicates_dropped,
                    report.metrics.duplicate_rate * 100.0
                );

                if let Err(e) = write_report(&config.replay.output_dir, log, &report).await {
                    error!("Failed to save summary: {:#}", e);
                }
            }
            Err(e) => {
                error!("Failed to replay {}: {:#}", log.display(), e);
            }
        }
    }

    Ok(())
}
