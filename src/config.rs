// src/config.rs

use crate::types::{Config, HomeRunDistance};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let det = &self.detection;
        if !(0.0..1.0).contains(&det.confidence_threshold) {
            bail!(
                "detection.confidence_threshold must be in [0, 1), got {}",
                det.confidence_threshold
            );
        }
        if det.ball_label.trim().is_empty() {
            bail!("detection.ball_label must not be empty");
        }

        let phys = &self.physics;
        for (name, value) in [
            ("physics.feet_per_unit", phys.feet_per_unit),
            ("physics.frame_rate", phys.frame_rate),
            ("physics.mph_per_ft_per_sec", phys.mph_per_ft_per_sec),
            ("physics.ft_per_sec_per_mph", phys.ft_per_sec_per_mph),
            ("physics.perspective_correction", phys.perspective_correction),
            ("physics.max_angle_jump_deg", phys.max_angle_jump_deg),
            ("physics.gravity_ft_s2", phys.gravity_ft_s2),
            ("physics.min_launch_angle_deg", phys.min_launch_angle_deg),
            ("session.quiet_period_s", self.session.quiet_period_s),
            ("replay.source_fps", self.replay.source_fps),
            ("replay.view_width", self.replay.view_width),
            ("replay.view_height", self.replay.view_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                bail!("{} must be a positive number, got {}", name, value);
            }
        }
        if !(phys.initial_height_ft.is_finite() && phys.initial_height_ft >= 0.0) {
            bail!(
                "physics.initial_height_ft must be non-negative, got {}",
                phys.initial_height_ft
            );
        }

        if self.session.samples_per_swing == 0 {
            bail!("session.samples_per_swing must be at least 1");
        }
        if self.session.min_speed_samples > self.session.samples_per_swing {
            bail!(
                "session.min_speed_samples ({}) cannot exceed session.samples_per_swing ({})",
                self.session.min_speed_samples,
                self.session.samples_per_swing
            );
        }

        Ok(())
    }
}

impl HomeRunDistance {
    pub const ALL: [HomeRunDistance; 4] = [
        HomeRunDistance::Pro,
        HomeRunDistance::Varsity,
        HomeRunDistance::LittleLeague,
        HomeRunDistance::Rookie,
    ];

    pub fn feet(&self) -> f64 {
        match self {
            Self::Rookie => 90.0,
            Self::LittleLeague => 180.0,
            Self::Varsity => 300.0,
            Self::Pro => 400.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rookie => "ROOKIE",
            Self::LittleLeague => "LITTLE LEAGUE",
            Self::Varsity => "VARSITY",
            Self::Pro => "PRO",
        }
    }

    /// Level whose threshold is exactly `feet`, if any.
    pub fn from_feet(feet: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.feet() as u32 == feet)
    }
}
