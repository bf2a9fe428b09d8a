//! Test data builders for creating configured sessions

use goniovis_rs::{AppConfig, CaptureMode, MeasurementSession, MidlineStrategy};

/// Builder for creating test MeasurementSessions
pub struct SessionBuilder {
    strategy: MidlineStrategy,
    mode: CaptureMode,
    window_ms: u64,
    period_ms: u64,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        let defaults = AppConfig::default();
        Self {
            strategy: defaults.strategy,
            mode: defaults.capture.mode,
            window_ms: defaults.capture.window_ms,
            period_ms: defaults.capture.period_ms,
        }
    }

    pub fn strategy(mut self, strategy: MidlineStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn window(mut self, window_ms: u64, period_ms: u64) -> Self {
        self.window_ms = window_ms;
        self.period_ms = period_ms;
        self
    }

    pub fn build(self) -> MeasurementSession {
        let mut config = AppConfig::default();
        config.strategy = self.strategy;
        config.capture.mode = self.mode;
        config.capture.window_ms = self.window_ms;
        config.capture.period_ms = self.period_ms;
        MeasurementSession::new(config)
    }
}
