//! Tuning constants for the gauge and the daily target.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const WORD_TARGET: usize = 300;

pub const GAUGE_START: f64 = 50.0;
/// Gauge points gained per character typed.
pub const GAUGE_PER_CHAR: f64 = 0.8;
/// Seconds without a keystroke before decay starts.
pub const GAUGE_GRACE_DELAY_SECS: f64 = 1.5;
/// Points per second lost outside flow.
pub const GAUGE_DECAY: f64 = 12.0;
/// Points per second lost in flow.
pub const GAUGE_DECAY_FLOW: f64 = 6.0;
pub const GAUGE_MAX: f64 = 100.0;
pub const GAUGE_MIN: f64 = 0.0;

/// Seconds at a full gauge before flow activates.
pub const FLOW_THRESHOLD_SECS: f64 = 5.0;

pub const TICK_PERIOD_MS: u64 = 100;

/// Everything the engine needs to grow, drain and judge a sitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeParams {
    pub word_target: usize,
    pub start: f64,
    pub per_char: f64,
    pub grace_delay_secs: f64,
    pub decay_per_sec: f64,
    pub flow_decay_per_sec: f64,
    pub flow_threshold_secs: f64,
    pub tick_ms: u64,
}

impl Default for GaugeParams {
    fn default() -> Self {
        Self {
            word_target: WORD_TARGET,
            start: GAUGE_START,
            per_char: GAUGE_PER_CHAR,
            grace_delay_secs: GAUGE_GRACE_DELAY_SECS,
            decay_per_sec: GAUGE_DECAY,
            flow_decay_per_sec: GAUGE_DECAY_FLOW,
            flow_threshold_secs: FLOW_THRESHOLD_SECS,
            tick_ms: TICK_PERIOD_MS,
        }
    }
}

impl GaugeParams {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Points removed by one tick at the given rate.
    pub fn decay_per_tick(&self, in_flow: bool) -> f64 {
        let rate = if in_flow {
            self.flow_decay_per_sec
        } else {
            self.decay_per_sec
        };
        rate * self.tick_ms as f64 / 1000.0
    }

    /// Clamp values so the gauge invariants hold for any user-supplied config.
    pub fn sanitized(mut self) -> Self {
        self.start = self.start.clamp(GAUGE_MIN, GAUGE_MAX);
        self.per_char = self.per_char.max(0.0);
        self.grace_delay_secs = self.grace_delay_secs.max(0.0);
        self.decay_per_sec = self.decay_per_sec.max(0.0);
        self.flow_decay_per_sec = self.flow_decay_per_sec.max(0.0);
        self.flow_threshold_secs = self.flow_threshold_secs.max(0.0);
        self.tick_ms = self.tick_ms.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tick_decay() {
        let params = GaugeParams::default();
        assert!((params.decay_per_tick(false) - 1.2).abs() < 1e-9);
        assert!((params.decay_per_tick(true) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn sanitized_clamps_start() {
        let params = GaugeParams {
            start: 250.0,
            tick_ms: 0,
            ..GaugeParams::default()
        }
        .sanitized();
        assert_eq!(params.start, GAUGE_MAX);
        assert_eq!(params.tick_ms, 1);
    }
}
