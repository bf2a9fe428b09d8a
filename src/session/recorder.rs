//! Session recorder for snapshot and timed-sampling capture

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::classify::SafetyThresholds;
use crate::error::{GonioError, Result};

use super::types::{CaptureMode, CaptureOutcome, RecordingState, SampleRecord, SampleView};

/// Default timed-sampling window length in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 2000;

/// Default sampling period in milliseconds
pub const DEFAULT_PERIOD_MS: u64 = 10;

/// An in-flight timed-sampling window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveWindow {
    /// Wall-clock start, milliseconds since the Unix epoch
    started_ms: i64,
    /// Wall-clock time the next sample is due
    next_due_ms: i64,
}

/// Accumulates sample records in one of two capture modes
///
/// In timed mode the recorder owns no timer: collaborators feed it
/// [`tick`](SessionRecorder::tick) events with the current time, and the
/// recorder appends every sample that became due since the last tick. The
/// window cannot overlap itself because at most one [`ActiveWindow`]
/// exists, and a trigger while one is active is ignored.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    mode: CaptureMode,
    window_ms: u64,
    period_ms: u64,
    state: RecordingState,
    window: Option<ActiveWindow>,
    records: Vec<SampleRecord>,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(CaptureMode::default())
    }
}

impl SessionRecorder {
    /// Create a recorder with the default window and period
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            window_ms: DEFAULT_WINDOW_MS,
            period_ms: DEFAULT_PERIOD_MS,
            state: RecordingState::Idle,
            window: None,
            records: Vec::new(),
        }
    }

    /// Create a recorder with an explicit window and period (timed mode)
    pub fn with_window(mode: CaptureMode, window_ms: u64, period_ms: u64) -> Self {
        Self {
            window_ms,
            period_ms: period_ms.max(1),
            ..Self::new(mode)
        }
    }

    /// Configured capture mode
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Current recording state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Check if a timed window is active
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Accumulated records, in capture order
    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    /// Number of accumulated records
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Whether export has anything to serialize
    pub fn can_export(&self) -> bool {
        !self.records.is_empty()
    }

    /// Handle the start/record trigger action
    ///
    /// Snapshot mode captures one record (replacing any prior record),
    /// gated by tilt confirmation when the device is tilted beyond
    /// tolerance. Timed mode opens the sampling window; a second trigger
    /// while a window is active is ignored.
    pub fn trigger(
        &mut self,
        view: &SampleView<'_>,
        now_ms: i64,
        tilt_confirmed: bool,
        thresholds: &SafetyThresholds,
    ) -> CaptureOutcome {
        match self.mode {
            CaptureMode::SingleSnapshot => self.capture_snapshot(view, now_ms, tilt_confirmed, thresholds),
            CaptureMode::TimedSampling => self.start_window(view, now_ms),
        }
    }

    fn capture_snapshot(
        &mut self,
        view: &SampleView<'_>,
        now_ms: i64,
        tilt_confirmed: bool,
        thresholds: &SafetyThresholds,
    ) -> CaptureOutcome {
        if let Some(tilt) = view.tilt {
            if !tilt.is_within_tolerance() && !tilt_confirmed {
                tracing::info!(tilt_deg = tilt.degrees, "capture needs tilt confirmation");
                return CaptureOutcome::RequiresTiltConfirmation {
                    tilt_deg: tilt.degrees,
                };
            }
        }

        let record = SampleRecord::capture(view, now_ms, None);
        // The session holds at most one snapshot record at a time
        self.records.clear();
        self.records.push(record);
        self.state = RecordingState::Stopped;

        let exceeds_warning = thresholds.exceeds_warning(view.left_deg, view.right_deg);
        if exceeds_warning {
            tracing::warn!(
                left = view.left_deg,
                right = view.right_deg,
                "snapshot captured with abduction above the warning threshold"
            );
        } else {
            tracing::info!(left = view.left_deg, right = view.right_deg, "snapshot captured");
        }
        CaptureOutcome::Recorded { exceeds_warning }
    }

    fn start_window(&mut self, view: &SampleView<'_>, now_ms: i64) -> CaptureOutcome {
        if self.is_recording() {
            tracing::debug!("start request ignored, sampling window already active");
            return CaptureOutcome::Ignored;
        }

        self.records.clear();
        self.window = Some(ActiveWindow {
            started_ms: now_ms,
            next_due_ms: now_ms,
        });
        self.state = RecordingState::Recording;
        tracing::info!(
            window_ms = self.window_ms,
            period_ms = self.period_ms,
            "timed sampling window started"
        );

        // The first sample is due immediately
        self.tick(view, now_ms);
        CaptureOutcome::WindowStarted
    }

    /// Advance a timed-sampling window to `now_ms`
    ///
    /// Appends every sample that became due since the last tick (late ticks
    /// catch up, keeping elapsed times monotonically non-decreasing) and
    /// stops the window automatically once the duration has elapsed.
    /// No-op outside an active window.
    pub fn tick(&mut self, view: &SampleView<'_>, now_ms: i64) {
        let Some(window) = self.window.as_mut() else {
            return;
        };

        let end_ms = window.started_ms + self.window_ms as i64;
        while window.next_due_ms <= now_ms && window.next_due_ms < end_ms {
            let elapsed = window.next_due_ms - window.started_ms;
            self.records
                .push(SampleRecord::capture(view, window.next_due_ms, Some(elapsed)));
            window.next_due_ms += self.period_ms as i64;
        }

        if now_ms >= end_ms {
            self.window = None;
            self.state = RecordingState::Stopped;
            tracing::info!(records = self.records.len(), "timed sampling window complete");
        }
    }

    /// Recording progress as a fraction, clamped to `[0, 1]`
    pub fn progress(&self, now_ms: i64) -> f64 {
        match self.state {
            RecordingState::Idle => 0.0,
            RecordingState::Recording => {
                let Some(window) = self.window else { return 0.0 };
                if self.window_ms == 0 {
                    return 1.0;
                }
                let elapsed = (now_ms - window.started_ms) as f64;
                (elapsed / self.window_ms as f64).clamp(0.0, 1.0)
            }
            RecordingState::Stopped => 1.0,
        }
    }

    /// Serialize all records to pretty JSON, or `None` when empty
    pub fn export_json(&self) -> Option<String> {
        if self.records.is_empty() {
            return None;
        }
        // Serialization of these plain value types cannot fail
        serde_json::to_string_pretty(&self.records).ok()
    }

    /// Export file name for the given wall-clock time
    ///
    /// ISO timestamp with `:` replaced by `-` so the name is valid on
    /// every filesystem.
    pub fn export_file_name(&self, now: DateTime<Utc>) -> String {
        let stamp = now
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace(':', "-");
        let prefix = match self.mode {
            CaptureMode::SingleSnapshot => "pose_single",
            CaptureMode::TimedSampling => "pose_timed",
        };
        format!("{}_{}.json", prefix, stamp)
    }

    /// Write the export payload to a file
    ///
    /// Returns `Ok(false)` without touching the filesystem when there is
    /// nothing to export.
    pub fn export_to_file(&self, path: &Path) -> Result<bool> {
        let Some(json) = self.export_json() else {
            return Ok(false);
        };
        std::fs::write(path, json)
            .map_err(|e| GonioError::Export(format!("failed to write {}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), records = self.records.len(), "session exported");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{LandmarkStore, MidlineOffset};
    use crate::types::{Point, TiltReading};

    fn view(store: &LandmarkStore) -> SampleView<'static> {
        SampleView {
            left_deg: 36.0,
            right_deg: 38.0,
            tilt: None,
            offset: MidlineOffset::default(),
            midline_from: Point::new(0.5, 0.2),
            midline_to: Point::new(0.5, 0.55),
            landmarks: store.snapshot(),
            patient_code: None,
        }
    }

    #[test]
    fn test_snapshot_replaces_prior_record() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        let thresholds = SafetyThresholds::default();

        let out = recorder.trigger(&view(&store), 1_000, false, &thresholds);
        assert_eq!(out, CaptureOutcome::Recorded { exceeds_warning: false });
        assert_eq!(recorder.record_count(), 1);

        let out = recorder.trigger(&view(&store), 2_000, false, &thresholds);
        assert_eq!(out, CaptureOutcome::Recorded { exceeds_warning: false });
        assert_eq!(recorder.record_count(), 1);
        assert_eq!(recorder.records()[0].timestamp, 2_000);
    }

    #[test]
    fn test_snapshot_tilt_gate() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        let thresholds = SafetyThresholds::default();

        let mut tilted = view(&store);
        tilted.tilt = Some(TiltReading::new(-8.5));

        // Unconfirmed: aborted with no record written
        let out = recorder.trigger(&tilted, 1_000, false, &thresholds);
        assert_eq!(out, CaptureOutcome::RequiresTiltConfirmation { tilt_deg: -8.5 });
        assert_eq!(recorder.record_count(), 0);
        assert_eq!(recorder.state(), RecordingState::Idle);

        // Confirmed: capture proceeds
        let out = recorder.trigger(&tilted, 1_500, true, &thresholds);
        assert_eq!(out, CaptureOutcome::Recorded { exceeds_warning: false });
        assert_eq!(recorder.record_count(), 1);
        assert_eq!(recorder.records()[0].device.tilt_ok, Some(false));
    }

    #[test]
    fn test_snapshot_warning_advisory() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        let thresholds = SafetyThresholds::default();

        let mut wide = view(&store);
        wide.right_deg = 72.0;
        let out = recorder.trigger(&wide, 1_000, false, &thresholds);
        // Capture still succeeds, the advisory is surfaced alongside
        assert_eq!(out, CaptureOutcome::Recorded { exceeds_warning: true });
        assert_eq!(recorder.record_count(), 1);
    }

    #[test]
    fn test_timed_window_full_run() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::TimedSampling);
        let thresholds = SafetyThresholds::default();
        let v = view(&store);

        let t0 = 10_000;
        let out = recorder.trigger(&v, t0, false, &thresholds);
        assert_eq!(out, CaptureOutcome::WindowStarted);
        assert!(recorder.is_recording());

        for step in 1..=200 {
            recorder.tick(&v, t0 + step * 10);
        }

        assert!(!recorder.is_recording());
        assert_eq!(recorder.state(), RecordingState::Stopped);
        assert_eq!(recorder.record_count(), 200);

        let times: Vec<i64> = recorder.records().iter().map(|r| r.time.unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*times.first().unwrap(), 0);
        assert!(*times.last().unwrap() >= 1990);
    }

    #[test]
    fn test_timed_window_catch_up_on_late_ticks() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::TimedSampling);
        let v = view(&store);

        recorder.trigger(&v, 0, false, &SafetyThresholds::default());
        // One very late tick past the end of the window
        recorder.tick(&v, 5_000);

        assert_eq!(recorder.record_count(), 200);
        assert_eq!(recorder.state(), RecordingState::Stopped);
        let times: Vec<i64> = recorder.records().iter().map(|r| r.time.unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*times.last().unwrap(), 1990);
    }

    #[test]
    fn test_timed_restart_is_ignored_while_active() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::TimedSampling);
        let thresholds = SafetyThresholds::default();
        let v = view(&store);

        recorder.trigger(&v, 0, false, &thresholds);
        recorder.tick(&v, 500);
        let count = recorder.record_count();

        let out = recorder.trigger(&v, 600, false, &thresholds);
        assert_eq!(out, CaptureOutcome::Ignored);
        // The active window keeps its records
        assert!(recorder.record_count() >= count);
        assert!(recorder.is_recording());
    }

    #[test]
    fn test_progress() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::TimedSampling);
        let v = view(&store);

        assert_eq!(recorder.progress(0), 0.0);
        recorder.trigger(&v, 0, false, &SafetyThresholds::default());
        assert!((recorder.progress(500) - 0.25).abs() < 1e-9);
        assert!((recorder.progress(10_000) - 1.0).abs() < 1e-9);

        recorder.tick(&v, 2_500);
        assert_eq!(recorder.progress(2_500), 1.0);
    }

    #[test]
    fn test_export_empty_is_none() {
        let recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        assert!(!recorder.can_export());
        assert_eq!(recorder.export_json(), None);
    }

    #[test]
    fn test_export_to_file_empty_is_noop() {
        let recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let written = recorder.export_to_file(&path).unwrap();
        assert!(!written);
        assert!(!path.exists());
    }

    #[test]
    fn test_export_to_file_writes_records() {
        let store = LandmarkStore::new();
        let mut recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        recorder.trigger(&view(&store), 1_000, false, &SafetyThresholds::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        assert!(recorder.export_to_file(&path).unwrap());

        let parsed: Vec<SampleRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].timestamp, 1_000);
    }

    #[test]
    fn test_export_file_name() {
        let recorder = SessionRecorder::new(CaptureMode::SingleSnapshot);
        let now = DateTime::parse_from_rfc3339("2026-08-07T12:34:56.789Z")
            .unwrap()
            .with_timezone(&Utc);
        let name = recorder.export_file_name(now);
        assert_eq!(name, "pose_single_2026-08-07T12-34-56.789Z.json");
        assert!(!name.contains(':'));

        let timed = SessionRecorder::new(CaptureMode::TimedSampling);
        assert!(timed.export_file_name(now).starts_with("pose_timed_"));
    }
}
