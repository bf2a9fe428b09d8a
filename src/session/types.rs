//! Session data types and the export record schema

use serde::{Deserialize, Serialize};

use crate::landmarks::{LandmarkSnapshot, MidlineOffset};
use crate::types::{round_dp, Point, TiltReading};

/// How a session captures records, fixed per deployment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// One trigger captures exactly one record, replacing any prior record
    #[default]
    SingleSnapshot,
    /// One trigger opens a fixed-duration window of periodic samples
    TimedSampling,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::SingleSnapshot => write!(f, "single-snapshot"),
            CaptureMode::TimedSampling => write!(f, "timed-sampling"),
        }
    }
}

/// State of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No records captured yet
    #[default]
    Idle,
    /// A timed-sampling window is active
    Recording,
    /// At least one record exists and no window is active
    Stopped,
}

impl RecordingState {
    /// Check if a timed window is active
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordingState::Idle => "Idle",
            RecordingState::Recording => "Recording",
            RecordingState::Stopped => "Stopped",
        }
    }
}

/// Result of a start/record trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// Tilt is out of tolerance; the operator must confirm intent before
    /// the capture proceeds. No state changed.
    RequiresTiltConfirmation {
        /// The offending tilt in degrees
        tilt_deg: f64,
    },
    /// A snapshot was captured
    Recorded {
        /// Advisory: either angle exceeded the warning threshold
        /// (the capture still succeeded)
        exceeds_warning: bool,
    },
    /// A timed-sampling window was started
    WindowStarted,
    /// The trigger was ignored (a window is already active)
    Ignored,
}

/// Everything the recorder samples from the live session at capture time
///
/// Built by the session controller per trigger/tick, so the recorder never
/// reaches back into live state and every record is a self-contained copy.
#[derive(Debug, Clone, Copy)]
pub struct SampleView<'a> {
    /// Left abduction angle in degrees
    pub left_deg: f64,
    /// Right abduction angle in degrees
    pub right_deg: f64,
    /// Current tilt reading, if a sensor feed is attached
    pub tilt: Option<TiltReading>,
    /// Current midline offset
    pub offset: MidlineOffset,
    /// Offset-applied midline segment start (shoulder midpoint)
    pub midline_from: Point,
    /// Offset-applied midline segment end (hip midpoint)
    pub midline_to: Point,
    /// Deep copy of all six landmark positions
    pub landmarks: LandmarkSnapshot,
    /// Patient/examination code, if one was supplied
    pub patient_code: Option<&'a str>,
}

/// Recorded abduction angles in degrees (2 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAngles {
    pub abduction_left: f64,
    pub abduction_right: f64,
    pub abduction_avg: f64,
}

/// Recorded device tilt state; both fields are null without a sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedDevice {
    #[serde(rename = "tiltDeg")]
    pub tilt_deg: Option<f64>,
    #[serde(rename = "tiltOK")]
    pub tilt_ok: Option<bool>,
}

/// Recorded midline segment with the operator offset applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedMidline {
    pub from: Point,
    pub to: Point,
}

/// One immutable capture of angles, tilt and landmark positions
///
/// A record is a value snapshot: later landmark mutation never changes an
/// already-recorded sample. Field precision follows the export contract
/// (angles 2 dp, coordinates and offsets 4 dp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    /// Wall-clock capture time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Elapsed milliseconds since recording start (timed mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Patient/examination code, null when never supplied
    pub patient_code: Option<String>,
    pub angles: RecordedAngles,
    pub device: RecordedDevice,
    pub midline: RecordedMidline,
    pub midline_offset: MidlineOffset,
    pub landmarks: LandmarkSnapshot,
}

impl SampleRecord {
    /// Build a record from the live view, applying export rounding
    pub fn capture(view: &SampleView<'_>, timestamp_ms: i64, elapsed_ms: Option<i64>) -> Self {
        Self {
            timestamp: timestamp_ms,
            time: elapsed_ms,
            patient_code: view.patient_code.map(str::to_string),
            angles: RecordedAngles {
                abduction_left: round_dp(view.left_deg, 2),
                abduction_right: round_dp(view.right_deg, 2),
                abduction_avg: round_dp((view.left_deg + view.right_deg) / 2.0, 2),
            },
            device: RecordedDevice {
                tilt_deg: view.tilt.map(|t| round_dp(t.degrees, 2)),
                tilt_ok: view.tilt.map(|t| t.is_within_tolerance()),
            },
            midline: RecordedMidline {
                from: view.midline_from.rounded4(),
                to: view.midline_to.rounded4(),
            },
            midline_offset: view.offset.rounded4(),
            landmarks: view.landmarks.rounded4(),
        }
    }
}
