//! Headless capture simulator
//!
//! Drives the goniometry engine without camera, renderer or sensor
//! collaborators: loads the deployment config, plays back a short scripted
//! measurement (landmark drag, tilt update, capture trigger) and writes
//! the export payload next to the working directory. Useful as a smoke
//! path for the full engine pipeline.

use anyhow::Context;
use chrono::Utc;
use goniovis_rs::{
    config, AppConfig, CaptureMode, CaptureOutcome, LandmarkId, MeasurementSession, Point,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,goniovis_rs=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting goniovis headless capture simulator");

    let config = match config::config_path() {
        Some(path) => AppConfig::load_or_default(path),
        None => AppConfig::default(),
    };
    tracing::info!(strategy = %config.strategy, mode = %config.capture.mode, "config loaded");

    let mut session = MeasurementSession::new(config);
    session.set_patient_code("0001")?;

    // Scripted operator input: widen the left leg a little
    let knee = session.landmarks().get(LandmarkId::LeftKnee);
    session.pointer_down(knee);
    session.pointer_move(Point::new(knee.x - 0.06, knee.y));
    session.pointer_up();

    // A near-level device
    session.tilt_update(1.8);

    let (left, right) = session.angles();
    let status = session.status();
    tracing::info!(left, right, status = %status.message, "pre-capture state");

    match session.start_recording(false) {
        CaptureOutcome::RequiresTiltConfirmation { tilt_deg } => {
            // Headless run: confirm and retry, as an operator would
            tracing::warn!(tilt_deg, "device tilted, confirming capture");
            session.start_recording(true);
        }
        CaptureOutcome::Recorded { exceeds_warning } if exceeds_warning => {
            tracing::warn!("abduction above the warning threshold, check positioning");
        }
        outcome => tracing::debug!(?outcome, "trigger handled"),
    }

    // Timed mode keeps sampling until the window expires
    if session.config().capture.mode == CaptureMode::TimedSampling {
        let period = session.config().capture.period_ms;
        while session.recorder().is_recording() {
            std::thread::sleep(std::time::Duration::from_millis(period));
            session.tick();
        }
    }

    let now = Utc::now();
    let file_name = session.recorder().export_file_name(now);
    let written = session
        .recorder()
        .export_to_file(std::path::Path::new(&file_name))
        .with_context(|| format!("exporting session to {}", file_name))?;

    if written {
        tracing::info!(
            file = %file_name,
            records = session.recorder().record_count(),
            "done"
        );
    } else {
        tracing::warn!("nothing captured, no export written");
    }

    Ok(())
}
