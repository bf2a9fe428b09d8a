//! # goniovis-rs: Hip-Abduction Goniometry Engine
//!
//! A landmark geometry and session recording engine for clinical
//! hip-abduction measurement. An operator marks six anatomical landmarks
//! (shoulders, hips, knees) on a body-pose image; the engine derives the
//! body midline, computes each leg's abduction angle against it,
//! classifies the angles into safety bands and records immutable
//! angle/landmark snapshots for export.
//!
//! ## Architecture
//!
//! - **Landmark store**: six named positions in normalized `[0,1]x[0,1]`
//!   coordinates, clamped on every mutation
//! - **Geometry**: pure midline/abduction math with two selectable midline
//!   strategies (pelvis basis, shoulder-hip)
//! - **Classifier**: four safety bands plus the combined status line with
//!   a device-tilt override
//! - **Interaction**: a pointer-driven drag state machine that emits
//!   effects for the controller to apply
//! - **Session**: single-snapshot or timed-sampling capture with a
//!   deterministic JSON export payload
//!
//! The engine is single-threaded and event-driven: camera acquisition,
//! rendering and raw sensor access are collaborator concerns, and every
//! event enters through one synchronous method on
//! [`MeasurementSession`](controller::MeasurementSession).
//!
//! ## Example
//!
//! ```
//! use goniovis_rs::{AppConfig, MeasurementSession, Point};
//!
//! let mut session = MeasurementSession::new(AppConfig::default());
//!
//! // Drag the left knee outward
//! let knee = session.landmarks().get(goniovis_rs::LandmarkId::LeftKnee);
//! session.pointer_down(knee);
//! session.pointer_move(Point::new(knee.x - 0.05, knee.y));
//! session.pointer_up();
//!
//! // Capture a snapshot and export it
//! session.start_recording_at(1_700_000_000_000, false);
//! let json = session.export_json().expect("one record captured");
//! assert!(json.contains("abductionLeft"));
//! ```

pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod landmarks;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use classify::{SafetyBand, SafetyThresholds, StatusReport};
pub use config::AppConfig;
pub use controller::{MeasurementSession, OverlayFrame};
pub use error::{GonioError, Result};
pub use geometry::MidlineStrategy;
pub use interaction::DragState;
pub use landmarks::{LandmarkStore, MidlineOffset, VisibilityFlags};
pub use session::{CaptureMode, CaptureOutcome, SampleRecord, SessionRecorder};
pub use types::{LandmarkId, Point, TiltReading};
