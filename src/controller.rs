//! The measurement session controller
//!
//! [`MeasurementSession`] is the explicit session object that owns all
//! mutable engine state: landmark store, midline offset, visibility flags,
//! tilt reading, patient code and the session recorder. Every external
//! event (pointer input, sensor update, trigger action, timer tick) enters
//! through one synchronous method, so collaborators of any kind (UI event
//! loop, tests, headless drivers) can drive the engine the same way.
//!
//! Collaborators read back through the view queries: the current angles
//! and classification for the panel, the status line, and the
//! [`OverlayFrame`] describing everything the renderer should draw.

use chrono::Utc;

use crate::classify::{status_for, SafetyBand, StatusReport};
use crate::config::AppConfig;
use crate::error::{GonioError, Result};
use crate::geometry::{abduction_angles, average_deg, midline_anchors, midline_direction};
use crate::interaction::{DragState, InteractionEffect, InteractionStateMachine};
use crate::landmarks::{LandmarkStore, MidlineOffset, VisibilityFlags};
use crate::session::{CaptureOutcome, SampleView, SessionRecorder};
use crate::types::{LandmarkId, Point, TiltReading};

/// White, used for the midline and the landmark dots
pub const COLOR_NEUTRAL: [u8; 4] = [255, 255, 255, 255];

/// Maximum patient/examination code length in digits
pub const PATIENT_CODE_MAX_LEN: usize = 10;

/// A colored line segment for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySegment {
    pub from: Point,
    pub to: Point,
    pub color: [u8; 4],
}

/// A landmark dot for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPoint {
    pub id: LandmarkId,
    pub position: Point,
    /// Short label drawn next to the dot
    pub label: &'static str,
}

/// An angle annotation anchored at a hip
#[derive(Debug, Clone, PartialEq)]
pub struct AngleLabel {
    pub anchor: Point,
    pub text: String,
    pub color: [u8; 4],
}

/// Everything the external renderer is told to draw for one frame
///
/// Purely presentational: built on demand from current state, honoring the
/// visibility flags. Empty/`None` members mean "draw nothing".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayFrame {
    /// Offset midline segment, shoulder midpoint to hip midpoint
    pub midline: Option<OverlaySegment>,
    /// Midline drag handle at the offset hip midpoint
    pub midline_handle: Option<Point>,
    /// Hip-to-knee segments, colored by each leg's safety band
    pub thighs: Vec<OverlaySegment>,
    /// Visible landmark dots in draw order
    pub points: Vec<OverlayPoint>,
    /// Per-leg angle annotations
    pub angle_labels: Vec<AngleLabel>,
}

/// Owns the engine state and routes every event through one place
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    config: AppConfig,
    store: LandmarkStore,
    offset: MidlineOffset,
    visibility: VisibilityFlags,
    tilt: Option<TiltReading>,
    patient_code: Option<String>,
    interaction: InteractionStateMachine,
    recorder: SessionRecorder,
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl MeasurementSession {
    /// Create a session from a deployment configuration
    pub fn new(config: AppConfig) -> Self {
        let recorder = SessionRecorder::with_window(
            config.capture.mode,
            config.capture.window_ms,
            config.capture.period_ms,
        );
        Self {
            config,
            store: LandmarkStore::new(),
            offset: MidlineOffset::default(),
            visibility: VisibilityFlags::default(),
            tilt: None,
            patient_code: None,
            interaction: InteractionStateMachine::new(),
            recorder,
        }
    }

    // ==================== State access ====================

    /// Deployment configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current landmark positions
    pub fn landmarks(&self) -> &LandmarkStore {
        &self.store
    }

    /// Current midline offset
    pub fn offset(&self) -> MidlineOffset {
        self.offset
    }

    /// Visibility flags, read-only
    pub fn visibility(&self) -> &VisibilityFlags {
        &self.visibility
    }

    /// Visibility flags, for the UI toggles
    pub fn visibility_mut(&mut self) -> &mut VisibilityFlags {
        &mut self.visibility
    }

    /// Latest tilt reading, if a sensor feed is attached
    pub fn tilt(&self) -> Option<TiltReading> {
        self.tilt
    }

    /// Patient/examination code, if one was supplied
    pub fn patient_code(&self) -> Option<&str> {
        self.patient_code.as_deref()
    }

    /// Current drag state
    pub fn drag_state(&self) -> DragState {
        self.interaction.state()
    }

    /// The session recorder
    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    // ==================== Input events ====================

    /// Set the patient/examination code (1 to 10 ASCII digits)
    pub fn set_patient_code(&mut self, code: &str) -> Result<()> {
        let valid = !code.is_empty()
            && code.len() <= PATIENT_CODE_MAX_LEN
            && code.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(GonioError::PatientCode(format!(
                "code must be 1-{} digits, got {:?}",
                PATIENT_CODE_MAX_LEN, code
            )));
        }
        self.patient_code = Some(code.to_string());
        tracing::debug!(code, "patient code set");
        Ok(())
    }

    /// Feed a device-tilt sensor update in degrees
    pub fn tilt_update(&mut self, degrees: f64) {
        self.tilt = Some(TiltReading::new(degrees));
    }

    /// Handle pointer-down in normalized coordinates
    pub fn pointer_down(&mut self, pointer: Point) -> DragState {
        let handle = self
            .visibility
            .midline_handle
            .then(|| self.handle_position());
        let state =
            self.interaction
                .pointer_down(pointer, &self.store, handle, self.config.hit_tolerance);
        if state.is_dragging() {
            tracing::debug!(?state, "drag started");
        }
        state
    }

    /// Handle pointer-move in normalized coordinates
    pub fn pointer_move(&mut self, pointer: Point) {
        let (_, hip_mid) = midline_anchors(&self.store);
        match self.interaction.pointer_move(pointer, hip_mid) {
            Some(InteractionEffect::MoveLandmark { id, to }) => self.store.set_point(id, to),
            Some(InteractionEffect::SetMidlineOffset(offset)) => self.offset = offset,
            None => {}
        }
    }

    /// Handle pointer-up
    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    // ==================== Derived geometry ====================

    /// Both abduction angles (left, right) in degrees
    pub fn angles(&self) -> (f64, f64) {
        abduction_angles(&self.store, self.config.strategy)
    }

    /// Mean of the two abduction angles in degrees
    pub fn average_angle(&self) -> f64 {
        let (left, right) = self.angles();
        average_deg(left, right)
    }

    /// Unit midline direction for the configured strategy
    pub fn midline_direction(&self) -> Point {
        midline_direction(&self.store, self.config.strategy)
    }

    /// Midline handle position: hip midpoint plus the operator offset
    pub fn handle_position(&self) -> Point {
        let (_, hip_mid) = midline_anchors(&self.store);
        self.offset.apply(hip_mid)
    }

    /// Safety band of one angle under the configured thresholds
    pub fn band_for(&self, angle_deg: f64) -> SafetyBand {
        self.config.thresholds.band_for(angle_deg)
    }

    /// Current status line, including the tilt override
    pub fn status(&self) -> StatusReport {
        let (left, right) = self.angles();
        status_for(left, right, self.tilt, &self.config.thresholds)
    }

    // ==================== Recording ====================

    /// Build the capture view from disjoint pieces of session state, so
    /// the recorder can be borrowed mutably alongside it
    fn build_view<'a>(
        store: &LandmarkStore,
        config: &AppConfig,
        offset: MidlineOffset,
        tilt: Option<TiltReading>,
        patient_code: Option<&'a str>,
    ) -> SampleView<'a> {
        let (left, right) = abduction_angles(store, config.strategy);
        let (shoulder_mid, hip_mid) = midline_anchors(store);
        SampleView {
            left_deg: left,
            right_deg: right,
            tilt,
            offset,
            midline_from: offset.apply(shoulder_mid),
            midline_to: offset.apply(hip_mid),
            landmarks: store.snapshot(),
            patient_code,
        }
    }

    /// Handle the start/record trigger at an explicit time
    ///
    /// `tilt_confirmed` carries the operator's answer to a previous
    /// [`CaptureOutcome::RequiresTiltConfirmation`] round-trip.
    pub fn start_recording_at(&mut self, now_ms: i64, tilt_confirmed: bool) -> CaptureOutcome {
        let view = Self::build_view(
            &self.store,
            &self.config,
            self.offset,
            self.tilt,
            self.patient_code.as_deref(),
        );
        self.recorder
            .trigger(&view, now_ms, tilt_confirmed, &self.config.thresholds)
    }

    /// Handle the start/record trigger at the current wall-clock time
    pub fn start_recording(&mut self, tilt_confirmed: bool) -> CaptureOutcome {
        self.start_recording_at(Utc::now().timestamp_millis(), tilt_confirmed)
    }

    /// Advance an active timed-sampling window to an explicit time
    pub fn tick_at(&mut self, now_ms: i64) {
        let view = Self::build_view(
            &self.store,
            &self.config,
            self.offset,
            self.tilt,
            self.patient_code.as_deref(),
        );
        self.recorder.tick(&view, now_ms);
    }

    /// Advance an active timed-sampling window to the wall clock
    pub fn tick(&mut self) {
        self.tick_at(Utc::now().timestamp_millis());
    }

    /// Recording progress as a fraction in `[0, 1]`
    pub fn progress_at(&self, now_ms: i64) -> f64 {
        self.recorder.progress(now_ms)
    }

    /// Serialize the session records to pretty JSON, or `None` when empty
    pub fn export_json(&self) -> Option<String> {
        self.recorder.export_json()
    }

    // ==================== Render view model ====================

    /// Build the draw list for the external renderer
    pub fn overlay(&self) -> OverlayFrame {
        let (left, right) = self.angles();
        let (shoulder_mid, hip_mid) = midline_anchors(&self.store);
        let mut frame = OverlayFrame::default();

        if self.visibility.midline {
            frame.midline = Some(OverlaySegment {
                from: self.offset.apply(shoulder_mid),
                to: self.offset.apply(hip_mid),
                color: COLOR_NEUTRAL,
            });
            if self.visibility.midline_handle {
                frame.midline_handle = Some(self.offset.apply(hip_mid));
            }
        }

        if self.visibility.lines {
            frame.thighs.push(OverlaySegment {
                from: self.store.get(LandmarkId::LeftHip),
                to: self.store.get(LandmarkId::LeftKnee),
                color: self.band_for(left).color(),
            });
            frame.thighs.push(OverlaySegment {
                from: self.store.get(LandmarkId::RightHip),
                to: self.store.get(LandmarkId::RightKnee),
                color: self.band_for(right).color(),
            });
        }

        for id in LandmarkId::ALL {
            if self.visibility.group_visible(id.group()) {
                frame.points.push(OverlayPoint {
                    id,
                    position: self.store.get(id),
                    label: id.label(),
                });
            }
        }

        if self.visibility.labels {
            frame.angle_labels.push(AngleLabel {
                anchor: self.store.get(LandmarkId::LeftHip),
                text: format!("{:.0}\u{b0}", left),
                color: self.band_for(left).color(),
            });
            frame.angle_labels.push(AngleLabel {
                anchor: self.store.get(LandmarkId::RightHip),
                text: format!("{:.0}\u{b0}", right),
                color: self.band_for(right).color(),
            });
        }

        frame
    }
}
