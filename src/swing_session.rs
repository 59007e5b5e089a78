// src/swing_session.rs
//
// Owns one batting session: segmentation, physics, the per-swing sample
// window, the quiet-period timer and the swing history.
//
// Per frame:
//   detection → segmenter → (swing motion?) → physics sample → window
// Per swing:
//   quiet period / explicit finalize → average first N samples → SwingResult
//   → history + SwingFinalized event → reset for the next swing

use crate::analysis::{first_speed_calc_point, trajectory_curve, PhysicsEstimator, TrajectoryCurve};
use crate::coordinates::ViewTransform;
use crate::detection::{SegmentOutcome, SegmenterState, TrajectorySegmenter};
use crate::pipeline::frame_result::speed_calc_points;
use crate::pipeline::{EventBus, FrameResult, MetricsSummary, SessionEvent, TrackingMetrics};
use crate::types::{
    Config, Detection, HomeRunDistance, SessionConfig, SessionSummary, SwingResult, TrackedPoint,
};
use tracing::{debug, info, warn};

const MAX_PENDING_EVENTS: usize = 64;

// ============================================================================
// QUIET-PERIOD TIMER
// ============================================================================

/// Single live deadline on the host's clock (seconds). Re-arming replaces
/// the previous deadline; firing consumes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietTimer {
    deadline: Option<f64>,
}

impl QuietTimer {
    pub fn arm(&mut self, now_s: f64, period_s: f64) {
        self.deadline = Some(now_s + period_s);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once when `now_s` reaches the deadline.
    pub fn fire(&mut self, now_s: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_s >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }
}

// ============================================================================
// SAMPLE WINDOW
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct SwingAverages {
    speed_mph: f64,
    launch_angle_deg: f64,
    distance_ft: f64,
}

#[derive(Debug, Clone, Default)]
struct SampleWindow {
    speeds: Vec<f64>,
    angles: Vec<f64>,
    distances: Vec<f64>,
}

impl SampleWindow {
    fn record_speed(&mut self, speed_mph: f64) {
        if !self.speeds.contains(&speed_mph) {
            self.speeds.push(speed_mph);
        }
    }

    fn is_empty(&self) -> bool {
        self.speeds.is_empty() && self.angles.is_empty() && self.distances.is_empty()
    }

    /// Mean of the first `window` valid samples of each kind.
    fn average(&self, window: usize, min_speed_samples: usize) -> Result<SwingAverages, String> {
        let speeds: Vec<f64> = self
            .speeds
            .iter()
            .copied()
            .filter(|s| s.is_finite() && *s > 0.0)
            .take(window)
            .collect();

        if speeds.is_empty() || speeds.len() < min_speed_samples {
            return Err(format!(
                "{} valid speed samples, need {}",
                speeds.len(),
                min_speed_samples.max(1)
            ));
        }
        if self.angles.is_empty() {
            return Err("no launch angle samples".to_string());
        }
        if self.distances.is_empty() {
            return Err("no distance samples".to_string());
        }

        Ok(SwingAverages {
            speed_mph: mean(&speeds),
            launch_angle_deg: mean(&self.angles[..self.angles.len().min(window)]),
            distance_ft: mean(&self.distances[..self.distances.len().min(window)]),
        })
    }

    fn clear(&mut self) {
        self.speeds.clear();
        self.angles.clear();
        self.distances.clear();
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Home run iff the averaged distance strictly exceeds the selected threshold.
pub fn classify_home_run(distance_ft: f64, threshold: HomeRunDistance) -> bool {
    distance_ft > threshold.feet()
}

// ============================================================================
// SESSION
// ============================================================================

pub struct SwingSession {
    config: SessionConfig,
    segmenter: TrajectorySegmenter,
    physics: PhysicsEstimator,
    window: SampleWindow,
    timer: QuietTimer,
    history: Vec<SwingResult>,
    events: EventBus,
    metrics: TrackingMetrics,
    active: bool,
    /// Set once the current swing has produced its result; cleared by the
    /// next accepted frame.
    finalized: bool,
    last_trajectory: Vec<TrackedPoint>,
    last_smash: Option<TrackedPoint>,
}

impl SwingSession {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.session.clone(),
            segmenter: TrajectorySegmenter::new(config.tracking.clone()),
            physics: PhysicsEstimator::new(config.physics.clone()),
            window: SampleWindow::default(),
            timer: QuietTimer::default(),
            history: Vec::new(),
            events: EventBus::new(MAX_PENDING_EVENTS),
            metrics: TrackingMetrics::new(),
            active: false,
            finalized: false,
            last_trajectory: Vec::new(),
            last_smash: None,
        }
    }

    /// Begin a fresh session: empty history, counters and buffers.
    pub fn start(&mut self) {
        self.reset_tracking();
        self.history.clear();
        self.events.drain();
        self.metrics = TrackingMetrics::new();
        self.finalized = false;
        self.last_trajectory.clear();
        self.last_smash = None;
        self.active = true;
        info!(
            "⚾ Session started (home run at {} ft, {})",
            self.config.home_run_distance.feet(),
            self.config.home_run_distance.as_str()
        );
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed one ball observation taken at `now_s` on the host's clock.
    pub fn process_frame(&mut self, detection: &Detection, now_s: f64) -> FrameResult {
        let frame_index = detection.frame_index;

        if !self.active {
            self.metrics.frames_ignored += 1;
            return FrameResult::ignored(frame_index, self.segmenter.state());
        }
        if !(detection.position.x.is_finite() && detection.position.y.is_finite()) {
            warn!("Frame {} has a non-finite position, ignoring", frame_index);
            self.metrics.frames_ignored += 1;
            return FrameResult::ignored(frame_index, self.segmenter.state());
        }

        let outcome = self.segmenter.push(TrackedPoint::from(*detection));
        if outcome == SegmentOutcome::OutOfOrder {
            self.metrics.frames_ignored += 1;
            return FrameResult::ignored(frame_index, self.segmenter.state());
        }

        self.metrics.frames_processed += 1;
        self.finalized = false;
        self.timer.arm(now_s, self.config.quiet_period_s);

        let mut sampled = false;
        match outcome {
            SegmentOutcome::ContactConfirmed { smash } => {
                self.metrics.contacts_detected += 1;
                self.events.publish(SessionEvent::ContactDetected { smash });
                sampled = self.sample_if_swinging();
            }
            SegmentOutcome::Tracked => {
                sampled = self.sample_if_swinging();
            }
            SegmentOutcome::DuplicateDropped => {
                self.metrics.duplicates_dropped += 1;
            }
            SegmentOutcome::Buffered | SegmentOutcome::OutOfOrder => {}
        }

        let tracked = self.segmenter.tracked();
        let reference =
            first_speed_calc_point(tracked, self.segmenter.config().speed_calc_max_further_left);

        FrameResult {
            frame_index,
            state: self.segmenter.state(),
            all_tracked_points: self.segmenter.all_tracked().to_vec(),
            tracked_points: tracked.to_vec(),
            smash_point: self.segmenter.smash_point(),
            speed_calc_points: speed_calc_points(tracked, reference),
            sampled,
            outcome: Some(outcome),
        }
    }

    /// Record physics samples for the newest tracked point when it counts as
    /// swing motion.
    fn sample_if_swinging(&mut self) -> bool {
        if !self.segmenter.is_swing_motion() {
            return false;
        }

        let tracked = self.segmenter.tracked();
        let Some(reference) =
            first_speed_calc_point(tracked, self.segmenter.config().speed_calc_max_further_left)
        else {
            return false;
        };

        let sample = self.physics.estimate(tracked, &reference);

        match sample.speed_mph {
            Some(speed) if speed > 0.0 => {
                self.window.record_speed(speed);
                self.metrics.speed_samples += 1;
            }
            _ => {
                self.metrics.speed_samples_rejected += 1;
                return false;
            }
        }

        if let Some(angle) = sample.launch_angle_deg {
            self.window.angles.push(angle);
            self.metrics.angle_samples += 1;
        } else if sample.angle_rejected {
            self.metrics.angle_samples_rejected += 1;
        }

        if let Some(distance) = sample.distance_ft {
            self.window.distances.push(distance);
            self.metrics.distance_samples += 1;
        }

        debug!(
            "Sample: speed={:.1} mph angle={:?} distance={:?}",
            sample.speed_mph.unwrap_or_default(),
            sample.launch_angle_deg.map(|a| (a * 10.0).round() / 10.0),
            sample.distance_ft.map(|d| d.round())
        );
        true
    }

    /// Fire the quiet-period timer if it is due. Returns the finalized swing,
    /// if the timeout produced one.
    pub fn poll(&mut self, now_s: f64) -> Option<SwingResult> {
        if !self.timer.fire(now_s) {
            return None;
        }
        debug!("⏳ Quiet period elapsed at {:.3}s", now_s);
        self.finalize_swing()
    }

    /// Deadline of the pending quiet-period timer, if armed.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timer.deadline()
    }

    /// Close the current swing: average, classify, record, reset.
    ///
    /// A second call before the next accepted frame is a no-op. Swings without
    /// enough valid samples are discarded and still reset the segmenter.
    pub fn finalize_swing(&mut self) -> Option<SwingResult> {
        self.timer.cancel();

        if self.finalized {
            debug!("Swing already finalized, ignoring");
            return None;
        }

        let averages = match self
            .window
            .average(self.config.samples_per_swing, self.config.min_speed_samples)
        {
            Ok(averages) => averages,
            Err(reason) => {
                let had_data =
                    !self.window.is_empty() || self.segmenter.state() != SegmenterState::Idle;
                if had_data {
                    let reason = if self.segmenter.smash_point().is_none() {
                        "no contact detected".to_string()
                    } else {
                        reason
                    };
                    info!("🚨 Swing discarded: {}", reason);
                    self.metrics.swings_discarded += 1;
                    self.events.publish(SessionEvent::SwingDiscarded { reason });
                }
                self.reset_tracking();
                return None;
            }
        };

        let contact_frame = self
            .segmenter
            .smash_point()
            .map(|s| s.frame_index)
            .unwrap_or_default();
        let result = SwingResult {
            speed_mph: averages.speed_mph,
            launch_angle_deg: averages.launch_angle_deg,
            distance_ft: averages.distance_ft,
            is_home_run: classify_home_run(averages.distance_ft, self.config.home_run_distance),
            contact_frame,
        };

        info!("📊 FINAL RESULTS:");
        info!("  Launch angles = {:?}", self.window.angles);
        info!("  Speeds = {:?}", self.window.speeds);
        info!(
            "  Speed {:.0} mph | Launch angle {:.0}° | Distance {:.0} ft",
            result.speed_mph, result.launch_angle_deg, result.distance_ft
        );
        if result.is_home_run {
            info!(
                "💥 DINGER! {:.0} ft clears {} ft",
                result.distance_ft,
                self.config.home_run_distance.feet()
            );
        }

        self.history.push(result);
        self.metrics.swings_finalized += 1;
        self.events.publish(SessionEvent::SwingFinalized(result));

        self.last_trajectory = self.segmenter.tracked().to_vec();
        self.last_smash = self.segmenter.smash_point();
        self.finalized = true;
        self.reset_tracking();

        Some(result)
    }

    /// End the session: cancel the timer, finalize or discard the swing in
    /// progress, and summarize the history. Safe in any state.
    pub fn stop(&mut self) -> SessionSummary {
        self.timer.cancel();
        if self.active {
            self.finalize_swing();
        }
        self.active = false;

        let summary = self.summary();
        info!(
            "🛑 Session stopped: {} swings, {} home runs, longest {:.0} ft, hardest {:.0} mph",
            summary.total_swings,
            summary.total_home_runs,
            summary.longest_distance_ft,
            summary.hardest_speed_mph
        );
        self.events.publish(SessionEvent::SessionStopped(summary));
        summary
    }

    fn reset_tracking(&mut self) {
        self.segmenter.reset();
        self.physics.reset();
        self.window.clear();
        self.timer.cancel();
    }

    pub fn set_home_run_distance(&mut self, distance: HomeRunDistance) {
        info!("Home run distance set to {} ft", distance.feet());
        self.config.home_run_distance = distance;
    }

    pub fn home_run_distance(&self) -> HomeRunDistance {
        self.config.home_run_distance
    }

    pub fn history(&self) -> &[SwingResult] {
        &self.history
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_results(&self.history)
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    pub fn state(&self) -> SegmenterState {
        self.segmenter.state()
    }

    /// Overlay curve for the swing in progress.
    pub fn trajectory_curve(&self, view: &ViewTransform) -> Option<TrajectoryCurve> {
        trajectory_curve(self.segmenter.tracked(), self.segmenter.smash_point(), view)
    }

    /// Overlay curve for the most recently finalized swing.
    pub fn last_swing_curve(&self, view: &ViewTransform) -> Option<TrajectoryCurve> {
        trajectory_curve(&self.last_trajectory, self.last_smash, view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point2;

    const FPS: f64 = 60.0;

    fn det(x: f64, y: f64, frame: u64) -> Detection {
        Detection {
            position: Point2::new(x, y),
            frame_index: frame,
            confidence: 0.9,
        }
    }

    /// Swing from the end-to-end scenario: pitch comes in from the right,
    /// contact at frame 26, ball driven up and right.
    fn scenario() -> Vec<Detection> {
        vec![
            det(0.10, 0.50, 25),
            det(0.08, 0.45, 26),
            det(0.09, 0.47, 27),
            det(0.12, 0.52, 28),
            det(0.15, 0.58, 29),
            det(0.20, 0.66, 30),
        ]
    }

    fn run(session: &mut SwingSession, detections: &[Detection]) -> Vec<FrameResult> {
        detections
            .iter()
            .map(|d| session.process_frame(d, d.frame_index as f64 / FPS))
            .collect()
    }

    fn started(config: &Config) -> SwingSession {
        let mut session = SwingSession::new(config);
        session.start();
        session
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut session = started(&Config::default());
        let frames = run(&mut session, &scenario());

        let last = frames.last().unwrap();
        let smash = last.smash_point.unwrap();
        assert_eq!(smash.frame_index, 26);
        assert_eq!(smash.position.x, 0.08);

        let tracked_frames: Vec<u64> = last.tracked_points.iter().map(|p| p.frame_index).collect();
        assert_eq!(tracked_frames, vec![26, 27, 28, 29, 30]);

        // Samples start once the ball is past x = 0.1
        let sampled: Vec<u64> = frames.iter().filter(|f| f.sampled).map(|f| f.frame_index).collect();
        assert_eq!(sampled, vec![28, 29, 30]);

        let deadline = session.next_deadline().unwrap();
        assert!(session.poll(deadline - 0.01).is_none());
        let result = session.poll(deadline).unwrap();

        assert!(result.speed_mph.is_finite() && result.speed_mph > 0.0);
        assert!(result.launch_angle_deg.is_finite() && result.launch_angle_deg > 0.0);
        assert!(result.distance_ft.is_finite() && result.distance_ft > 0.0);
        assert_eq!(result.contact_frame, 26);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.state(), SegmenterState::Idle);
    }

    #[test]
    fn test_threshold_classification() {
        assert!(classify_home_run(185.0, HomeRunDistance::LittleLeague));
        assert!(!classify_home_run(185.0, HomeRunDistance::Varsity));
        assert!(!classify_home_run(180.0, HomeRunDistance::LittleLeague));
    }

    #[test]
    fn test_threshold_read_at_classification_time() {
        // Scenario averages ~273 ft
        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        session.set_home_run_distance(HomeRunDistance::Varsity);
        let result = session.finalize_swing().unwrap();
        assert!(!result.is_home_run);

        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        let result = session.finalize_swing().unwrap();
        assert!(result.is_home_run);
    }

    #[test]
    fn test_averaging_window_uses_first_three() {
        let window = SampleWindow {
            speeds: vec![60.0, 70.0, 80.0, 500.0, 900.0],
            angles: vec![20.0, 30.0, 40.0, 89.0],
            distances: vec![100.0, 200.0, 300.0, 5000.0],
        };
        let avg = window.average(3, 3).unwrap();
        assert!((avg.speed_mph - 70.0).abs() < 1e-9);
        assert!((avg.launch_angle_deg - 30.0).abs() < 1e-9);
        assert!((avg.distance_ft - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_speeds_excluded_before_averaging() {
        let window = SampleWindow {
            speeds: vec![0.0, 60.0, 0.0, 70.0, 80.0],
            angles: vec![25.0],
            distances: vec![200.0],
        };
        let avg = window.average(3, 3).unwrap();
        assert!((avg.speed_mph - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_speed_samples() {
        let window = SampleWindow {
            speeds: vec![60.0, 70.0],
            angles: vec![25.0],
            distances: vec![200.0],
        };
        assert!(window.average(3, 3).is_err());

        let window = SampleWindow {
            speeds: vec![60.0, 70.0, 75.0],
            angles: vec![],
            distances: vec![200.0],
        };
        assert!(window.average(3, 3).is_err());
    }

    #[test]
    fn test_second_finalize_is_noop() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());

        assert!(session.finalize_swing().is_some());
        assert!(session.finalize_swing().is_none());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_pitch_after_finalized_swing_is_discarded() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        assert!(session.poll(10.0).is_some());
        session.drain_events();

        let pitch = [det(0.9, 0.5, 100), det(0.8, 0.5, 101), det(0.7, 0.5, 102)];
        for d in &pitch {
            session.process_frame(d, 20.0 + d.frame_index as f64 / FPS);
        }

        assert!(session.poll(300.0).is_none());
        assert_eq!(
            session.drain_events(),
            vec![SessionEvent::SwingDiscarded {
                reason: "no contact detected".to_string()
            }]
        );
        assert_eq!(session.metrics().swings_discarded, 1);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_timer_fires_once() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());

        assert!(session.poll(100.0).is_some());
        assert!(session.poll(200.0).is_none());
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_timer_rearmed_by_new_detection() {
        let mut session = started(&Config::default());
        session.process_frame(&det(0.5, 0.5, 1), 0.0);
        assert_eq!(session.next_deadline(), Some(1.0));
        session.process_frame(&det(0.4, 0.5, 2), 0.5);
        assert_eq!(session.next_deadline(), Some(1.5));
        // Old deadline no longer fires
        assert!(session.poll(1.2).is_none());
    }

    #[test]
    fn test_pitch_without_contact_is_discarded() {
        let mut session = started(&Config::default());
        let pitch = [det(0.9, 0.5, 1), det(0.8, 0.5, 2), det(0.7, 0.5, 3)];
        run(&mut session, &pitch);
        session.drain_events();

        assert!(session.poll(10.0).is_none());
        let events = session.drain_events();
        assert_eq!(
            events,
            vec![SessionEvent::SwingDiscarded {
                reason: "no contact detected".to_string()
            }]
        );
        assert_eq!(session.state(), SegmenterState::Idle);
    }

    #[test]
    fn test_successive_swings() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        assert!(session.poll(10.0).is_some());

        let second: Vec<Detection> = scenario()
            .iter()
            .map(|d| det(d.position.x, d.position.y, d.frame_index + 1000))
            .collect();
        for d in &second {
            session.process_frame(d, 20.0 + d.frame_index as f64 / FPS);
        }
        assert!(session.poll(100.0).is_some());
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_events_published() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        let result = session.finalize_swing().unwrap();

        let events = session.drain_events();
        assert!(matches!(events[0], SessionEvent::ContactDetected { .. }));
        assert_eq!(events.last(), Some(&SessionEvent::SwingFinalized(result)));
    }

    #[test]
    fn test_stop_finalizes_in_progress_swing() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());

        let summary = session.stop();
        assert_eq!(summary.total_swings, 1);
        assert_eq!(summary.total_home_runs, 1);
        assert!(summary.longest_distance_ft > 180.0);
        assert!(!session.is_active());
        assert!(session.next_deadline().is_none());

        // Frames after stop are ignored
        let frame = session.process_frame(&det(0.5, 0.5, 99), 50.0);
        assert!(frame.tracked_points.is_empty());
        assert_eq!(session.metrics().frames_ignored, 1);

        // Stopping twice is harmless
        assert_eq!(session.stop().total_swings, 1);
    }

    #[test]
    fn test_frames_before_start_ignored() {
        let mut session = SwingSession::new(&Config::default());
        let frame = session.process_frame(&det(0.5, 0.5, 1), 0.0);
        assert_eq!(frame.state, SegmenterState::Idle);
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_duplicates_counted() {
        let mut session = started(&Config::default());
        let mut detections = scenario();
        // Ball did not move between frames 28 and 29
        detections.insert(4, det(0.12, 0.52, 29));
        for d in detections.iter_mut().skip(5) {
            d.frame_index += 1;
        }
        run(&mut session, &detections);
        assert_eq!(session.metrics().duplicates_dropped, 1);
    }

    #[test]
    fn test_last_swing_curve_available_after_finalize() {
        let mut session = started(&Config::default());
        run(&mut session, &scenario());
        session.finalize_swing().unwrap();

        let view = ViewTransform::new(1920.0, 1080.0);
        assert!(session.trajectory_curve(&view).is_none());
        let curve = session.last_swing_curve(&view).unwrap();
        assert!(!curve.samples.is_empty());
    }
}
