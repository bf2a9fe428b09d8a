//! Configuration for the goniometry engine
//!
//! Deployment-level settings: which midline strategy to use, the safety
//! thresholds, the capture mode and its timing, and the hit-test tolerance.
//! Configs persist as TOML in the platform-appropriate data directory.
//!
//! # App Data Location
//!
//! - **Linux**: `~/.local/share/dev.goniovis.goniovis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.goniovis.goniovis-rs/`
//! - **Windows**: `%APPDATA%\dev.goniovis.goniovis-rs\`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::SafetyThresholds;
use crate::error::{GonioError, Result};
use crate::geometry::MidlineStrategy;
use crate::session::recorder::{DEFAULT_PERIOD_MS, DEFAULT_WINDOW_MS};
use crate::session::CaptureMode;
use crate::types::HIT_TOLERANCE;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.goniovis.goniovis-rs";

/// Config filename inside the app data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir()
        .ok_or_else(|| GonioError::Config("Could not determine app data directory".to_string()))?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            GonioError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Timing of the capture trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture mode, fixed per deployment
    pub mode: CaptureMode,
    /// Timed-sampling window length in milliseconds
    pub window_ms: u64,
    /// Timed-sampling period in milliseconds
    pub period_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::default(),
            window_ms: DEFAULT_WINDOW_MS,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Midline derivation strategy
    pub strategy: MidlineStrategy,
    /// Safety band thresholds
    pub thresholds: SafetyThresholds,
    /// Capture mode and timing
    pub capture: CaptureConfig,
    /// Hit-test tolerance radius in normalized units
    pub hit_tolerance: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strategy: MidlineStrategy::default(),
            thresholds: SafetyThresholds::default(),
            capture: CaptureConfig::default(),
            hit_tolerance: HIT_TOLERANCE,
        }
    }
}

impl AppConfig {
    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GonioError::Config(format!("Failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| GonioError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load a config, falling back to defaults if missing or corrupt
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Save the config as pretty TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GonioError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| GonioError::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }
}
