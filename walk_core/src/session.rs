//! The walking-session state machine.
//!
//! `WalkSession` owns the sample buffer and the three collaborators. It is
//! driven by `start`, `stop`, `on_tick` and `on_sample`; every call runs to
//! completion and never blocks. Hosting it on a thread is the job of
//! `actor::WalkActor` (live) or `runner::replay` (deterministic).

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use walk_traits::{Clock, Coordinate, LocationProvider, PositionSample, RecheckTimer};

use crate::buffer::SampleBuffer;
use crate::collab_error::{Collaborator, map_collaborator_error};
use crate::config::WalkCfg;
use crate::error::WalkError;
use crate::event::{DisplaySink, RouteOverlay, WalkEvent};
use crate::status::{RejectReason, SampleOutcome, WalkState};

/// Per-walk counters, reset by `start()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Fixes that passed the filters (the bootstrap fix is not counted).
    pub accepted: u64,
    pub rejected: u64,
    pub holds: u64,
    pub resumes: u64,
}

/// Point-in-time view of a session for hosts and status output.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: WalkState,
    pub total_m: f64,
    pub generation: u64,
    pub stats: SessionStats,
    pub origin: Option<Coordinate>,
    pub current: Option<Coordinate>,
    pub last_error: Option<WalkError>,
}

pub struct WalkSession<P, T, D> {
    provider: P,
    timer: T,
    display: D,
    cfg: WalkCfg,
    clock: Arc<dyn Clock + Send + Sync>,

    state: WalkState,
    start_time: Option<Instant>,
    origin: Option<PositionSample>,
    last_recorded: Option<PositionSample>,
    total_distance_m: f64,
    buffer: SampleBuffer,
    generation: u64,
    stats: SessionStats,
    last_collaborator_error: Option<WalkError>,
}

impl<P, T, D> core::fmt::Debug for WalkSession<P, T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WalkSession")
            .field("state", &self.state)
            .field("total_distance_m", &self.total_distance_m)
            .field("generation", &self.generation)
            .field("buffered", &self.buffer.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<P, T, D> WalkSession<P, T, D>
where
    P: LocationProvider,
    T: RecheckTimer,
    D: DisplaySink,
{
    /// Assemble a session from validated parts; see `WalkSessionBuilder`.
    ///
    /// The timer is left untouched: keepalive ticks start with the first `start()`.
    pub(crate) fn from_parts(
        provider: P,
        timer: T,
        display: D,
        cfg: WalkCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let buffer = SampleBuffer::new(cfg.buffer_capacity);
        Self {
            provider,
            timer,
            display,
            cfg,
            clock,
            state: WalkState::Idle,
            start_time: None,
            origin: None,
            last_recorded: None,
            total_distance_m: 0.0,
            buffer,
            generation: 0,
            stats: SessionStats::default(),
            last_collaborator_error: None,
        }
    }

    /// Begin a new walk from any state. Previous totals are discarded.
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.state = WalkState::Walking;
        self.start_time = Some(now);
        self.total_distance_m = 0.0;
        self.origin = None;
        self.last_recorded = None;
        self.buffer.clear();
        self.stats = SessionStats::default();
        self.generation = self.generation.wrapping_add(1);
        tracing::info!(generation = self.generation, "walk started");

        let res = self.provider.start_continuous_sampling(
            self.cfg.continuous_min_distance_m,
            self.cfg.continuous_min_interval,
        );
        self.note(Collaborator::Provider, "start continuous sampling", res);
        let res = self.timer.schedule(self.cfg.sample_request_interval);
        self.note(Collaborator::Timer, "schedule keepalive", res);
    }

    /// End the walk. Safe in any state; totals stay readable until the next `start()`.
    ///
    /// Bumps the generation so route lookups still in flight are discarded.
    pub fn stop(&mut self) {
        let was = self.state;
        self.state = WalkState::Idle;
        self.start_time = None;
        self.generation = self.generation.wrapping_add(1);

        let res = self.provider.stop_continuous_sampling();
        self.note(Collaborator::Provider, "stop continuous sampling", res);
        if was == WalkState::Holding {
            // back from the re-check cadence to the plain keepalive
            let res = self.timer.schedule(self.cfg.sample_request_interval);
            self.note(Collaborator::Timer, "schedule keepalive", res);
        }
        tracing::info!(
            total_m = self.total_distance_m,
            previous = ?was,
            "walk stopped"
        );
    }

    /// The host is going away: end any walk and cancel the timer cadence.
    ///
    /// Totals stay readable; a later `start()` schedules the cadence again.
    pub fn close(&mut self) {
        if self.state != WalkState::Idle {
            self.stop();
        }
        let res = self.timer.cancel();
        self.note(Collaborator::Timer, "cancel timer", res);
        tracing::debug!("session closed");
    }

    /// Timer tick: ask the provider for one fresh fix.
    pub fn on_tick(&mut self) {
        tracing::trace!(state = ?self.state, "tick");
        let res = self.provider.request_single_sample();
        self.note(Collaborator::Provider, "request single sample", res);
    }

    /// Process one fix delivered by the provider.
    pub fn on_sample(&mut self, raw: PositionSample) -> SampleOutcome {
        if self.state == WalkState::Idle {
            tracing::trace!("fix ignored while idle");
            return SampleOutcome::Ignored;
        }
        if !raw.coordinate.is_finite() {
            return self.reject(RejectReason::InvalidCoordinate);
        }
        if self.buffer.is_empty() {
            self.buffer.append(raw);
            tracing::debug!(accuracy_m = raw.horizontal_accuracy_m, "bootstrap fix buffered");
            return SampleOutcome::Bootstrapped;
        }
        if let Some(reason) = self.rejection(&raw) {
            return self.reject(reason);
        }

        self.buffer.append(raw);
        self.stats.accepted += 1;

        if self.origin.is_none() {
            self.origin = Some(raw);
            tracing::debug!(lat = raw.coordinate.latitude, lon = raw.coordinate.longitude, "origin established");
            self.emit(WalkEvent::OriginEstablished {
                origin: raw.coordinate,
            });
        }

        let now = self.clock.now();
        if self.state == WalkState::Holding {
            self.resume();
        } else if let Some(last) = self.last_recorded
            && self.is_idle_candidate(&last, &raw, now)
        {
            if self
                .cfg
                .holding_rule
                .is_at_rest(self.buffer.iter(), self.cfg.holding_speed_mps)
            {
                self.enter_holding(now);
                return SampleOutcome::Holding;
            }
            tracing::trace!("no displacement but still moving");
            return SampleOutcome::Stationary;
        }

        self.advance(raw, now)
    }

    /// Hand a resolved route to the display if it belongs to the current walk.
    ///
    /// Returns whether the route was forwarded.
    pub fn deliver_route(&mut self, route: &RouteOverlay) -> bool {
        if !self.is_current(route.generation) {
            tracing::debug!(
                route_generation = route.generation,
                generation = self.generation,
                "stale route discarded"
            );
            return false;
        }
        let res = self.display.on_route(route);
        self.note(Collaborator::Display, "draw route", res);
        true
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    pub fn origin(&self) -> Option<&PositionSample> {
        self.origin.as_ref()
    }

    pub fn last_recorded(&self) -> Option<&PositionSample> {
        self.last_recorded.as_ref()
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `generation` names the walk in progress.
    pub fn is_current(&self, generation: u64) -> bool {
        self.state != WalkState::Idle && generation == self.generation
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &WalkCfg {
        &self.cfg
    }

    /// Most recent collaborator failure, if any.
    pub fn last_collaborator_error(&self) -> Option<&WalkError> {
        self.last_collaborator_error.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            total_m: self.total_distance_m,
            generation: self.generation,
            stats: self.stats,
            origin: self.origin.map(|s| s.coordinate),
            current: self.last_recorded.map(|s| s.coordinate),
            last_error: self.last_collaborator_error.clone(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn rejection(&self, raw: &PositionSample) -> Option<RejectReason> {
        let Some(start) = self.start_time else {
            return Some(RejectReason::NoSession);
        };
        if raw.timestamp <= start {
            return Some(RejectReason::BeforeSessionStart);
        }
        if !raw.has_valid_accuracy() {
            return Some(RejectReason::UnknownAccuracy);
        }
        if raw.horizontal_accuracy_m > self.cfg.required_accuracy_m {
            return Some(RejectReason::Inaccurate);
        }
        None
    }

    fn reject(&mut self, reason: RejectReason) -> SampleOutcome {
        self.stats.rejected += 1;
        tracing::trace!(?reason, "fix rejected");
        SampleOutcome::Rejected(reason)
    }

    /// Barely moved and has been at it for longer than the allowed wait.
    fn is_idle_candidate(&self, last: &PositionSample, raw: &PositionSample, now: Instant) -> bool {
        let Some(start) = self.start_time else {
            return false;
        };
        last.distance_to(raw) <= self.cfg.valid_distance_m
            && now.saturating_duration_since(start) > self.cfg.max_wait_to_move
    }

    fn enter_holding(&mut self, now: Instant) {
        self.state = WalkState::Holding;
        self.start_time = Some(now);
        self.stats.holds += 1;
        tracing::info!(total_m = self.total_distance_m, "no movement, holding");

        let res = self.provider.stop_continuous_sampling();
        self.note(Collaborator::Provider, "stop continuous sampling", res);
        let res = self.timer.schedule(self.cfg.recheck_interval);
        self.note(Collaborator::Timer, "schedule re-check", res);
        let res = self.provider.request_single_sample();
        self.note(Collaborator::Provider, "request single sample", res);
    }

    fn resume(&mut self) {
        self.state = WalkState::Walking;
        self.stats.resumes += 1;
        tracing::info!("movement resumed");

        let res = self.provider.start_continuous_sampling(
            self.cfg.continuous_min_distance_m,
            self.cfg.continuous_min_interval,
        );
        self.note(Collaborator::Provider, "start continuous sampling", res);
        let res = self.timer.schedule(self.cfg.sample_request_interval);
        self.note(Collaborator::Timer, "schedule keepalive", res);
    }

    fn advance(&mut self, raw: PositionSample, now: Instant) -> SampleOutcome {
        let last = match self.last_recorded {
            Some(s) => s,
            None => self.buffer.oldest().copied().unwrap_or(raw),
        };
        let candidate = self
            .buffer
            .best_candidate(
                Some(&last),
                self.cfg.valid_time_interval,
                self.cfg.required_accuracy_m,
                now,
            )
            .unwrap_or(raw);

        let delta_m = last.distance_to(&candidate);
        let delta_m = if delta_m.is_finite() { delta_m.max(0.0) } else { 0.0 };
        self.total_distance_m += delta_m;
        self.last_recorded = Some(candidate);
        tracing::debug!(delta_m, total_m = self.total_distance_m, "distance advanced");

        self.emit(WalkEvent::DistanceUpdated {
            total_m: self.total_distance_m,
            recenter: last.coordinate,
        });
        if let Some(origin) = self.origin {
            self.emit(WalkEvent::Waypoint {
                generation: self.generation,
                origin: origin.coordinate,
                current: candidate.coordinate,
            });
        }
        SampleOutcome::Advanced {
            delta_m,
            total_m: self.total_distance_m,
        }
    }

    fn emit(&mut self, event: WalkEvent) {
        let res = self.display.on_event(&event);
        self.note(Collaborator::Display, "deliver event", res);
    }

    /// Record a collaborator failure without touching session state.
    fn note(
        &mut self,
        who: Collaborator,
        op: &'static str,
        res: Result<(), Box<dyn Error + Send + Sync>>,
    ) {
        if let Err(e) = res {
            let err = map_collaborator_error(who, &*e);
            tracing::warn!(error = %err, op, "collaborator call failed");
            self.last_collaborator_error = Some(err);
        }
    }
}
