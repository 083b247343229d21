//! Type-state builder for `WalkSession`.
//!
//! `build()` only exists once a provider, a timer and a display have been
//! supplied; each is slotted in as the builder's type parameter in place of
//! the `Missing` marker. Thresholds are validated on `build()`.

use std::sync::Arc;

use walk_traits::{Clock, LocationProvider, MonotonicClock, RecheckTimer};

use crate::config::WalkCfg;
use crate::error::{BuildError, Result};
use crate::event::DisplaySink;
use crate::session::WalkSession;

// ── Type-state marker ────────────────────────────────────────────────────────

/// Placeholder for a collaborator that has not been supplied yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct Missing;

pub struct WalkSessionBuilder<P, T, D> {
    provider: P,
    timer: T,
    display: D,
    cfg: Option<WalkCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
}

impl Default for WalkSessionBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            provider: Missing,
            timer: Missing,
            display: Missing,
            cfg: None,
            clock: None,
        }
    }
}

impl WalkSessionBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

// Optional settings, available in every state
impl<P, T, D> WalkSessionBuilder<P, T, D> {
    pub fn with_config(mut self, cfg: WalkCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Inject a custom clock (e.g. `ManualClock` for replay and tests).
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<T, D> WalkSessionBuilder<Missing, T, D> {
    pub fn with_provider<P: LocationProvider>(self, provider: P) -> WalkSessionBuilder<P, T, D> {
        WalkSessionBuilder {
            provider,
            timer: self.timer,
            display: self.display,
            cfg: self.cfg,
            clock: self.clock,
        }
    }
}

impl<P, D> WalkSessionBuilder<P, Missing, D> {
    pub fn with_timer<T: RecheckTimer>(self, timer: T) -> WalkSessionBuilder<P, T, D> {
        WalkSessionBuilder {
            provider: self.provider,
            timer,
            display: self.display,
            cfg: self.cfg,
            clock: self.clock,
        }
    }
}

impl<P, T> WalkSessionBuilder<P, T, Missing> {
    pub fn with_display<D: DisplaySink>(self, display: D) -> WalkSessionBuilder<P, T, D> {
        WalkSessionBuilder {
            provider: self.provider,
            timer: self.timer,
            display,
            cfg: self.cfg,
            clock: self.clock,
        }
    }
}

impl<P, T, D> WalkSessionBuilder<P, T, D>
where
    P: LocationProvider,
    T: RecheckTimer,
    D: DisplaySink,
{
    /// Validate the configuration and build the session (starts Idle).
    pub fn build(self) -> Result<WalkSession<P, T, D>> {
        let cfg = self.cfg.unwrap_or_default();
        validate(&cfg)?;
        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => Arc::from(c),
            None => Arc::new(MonotonicClock::new()),
        };
        Ok(WalkSession::from_parts(
            self.provider,
            self.timer,
            self.display,
            cfg,
            clock,
        ))
    }
}

fn validate(cfg: &WalkCfg) -> Result<()> {
    let invalid =
        |msg: &'static str| -> Result<()> { Err(eyre::Report::new(BuildError::InvalidConfig(msg))) };

    if cfg.buffer_capacity < 1 {
        return invalid("buffer_capacity must be >= 1");
    }
    if !(cfg.required_accuracy_m.is_finite() && cfg.required_accuracy_m > 0.0) {
        return invalid("required_accuracy_m must be finite and > 0");
    }
    if cfg.valid_time_interval.is_zero() {
        return invalid("valid_time_interval must be > 0");
    }
    if !(cfg.valid_distance_m.is_finite() && cfg.valid_distance_m >= 0.0) {
        return invalid("valid_distance_m must be finite and >= 0");
    }
    if !(cfg.holding_speed_mps.is_finite() && cfg.holding_speed_mps > 0.0) {
        return invalid("holding_speed_mps must be finite and > 0");
    }
    if cfg.sample_request_interval.is_zero() {
        return invalid("sample_request_interval must be > 0");
    }
    if cfg.recheck_interval.is_zero() {
        return invalid("recheck_interval must be > 0");
    }
    if !(cfg.continuous_min_distance_m.is_finite() && cfg.continuous_min_distance_m >= 0.0) {
        return invalid("continuous_min_distance_m must be finite and >= 0");
    }
    Ok(())
}
