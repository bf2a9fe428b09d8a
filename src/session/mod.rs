//! Session recording and export module
//!
//! This module provides the sampled recording protocol: capturing immutable
//! angle/landmark snapshots in one of two capture modes and serializing the
//! accumulated records for export.
//!
//! # Features
//!
//! - Single-snapshot capture with device-tilt confirmation gating
//! - Fixed-duration periodic sampling driven by external tick events
//! - Deterministic, ordered export payload (pretty JSON)
//! - Export file naming compatible with the clinical workflow

pub mod recorder;
pub mod types;

pub use recorder::SessionRecorder;
pub use types::{CaptureMode, CaptureOutcome, RecordingState, SampleRecord, SampleView};
