//! Recording collaborators for tests, benches and demos.
//!
//! Clones share their logs, so keep a clone before handing one to the session.

use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use walk_traits::{LocationProvider, RecheckTimer};

use crate::event::{DisplaySink, RouteOverlay, WalkEvent};

type CallResult = Result<(), Box<dyn Error + Send + Sync>>;

fn push<T>(log: &Mutex<Vec<T>>, item: T) {
    if let Ok(mut v) = log.lock() {
        v.push(item);
    }
}

fn read<T: Clone>(log: &Mutex<Vec<T>>) -> Vec<T> {
    log.lock().map(|v| v.clone()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Single,
    StartContinuous {
        min_distance_m: f64,
        min_interval: Duration,
    },
    StopContinuous,
}

/// Provider that records every request; optionally fails them all.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        read(&self.calls)
    }

    /// Make every later call fail as if location permission had been revoked.
    pub fn set_failing(&self, on: bool) {
        self.failing.store(on, Ordering::Relaxed);
    }

    fn record(&self, call: ProviderCall) -> CallResult {
        push(&self.calls, call);
        if self.failing.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("location permission revoked")));
        }
        Ok(())
    }
}

impl LocationProvider for RecordingProvider {
    fn request_single_sample(&mut self) -> CallResult {
        self.record(ProviderCall::Single)
    }

    fn start_continuous_sampling(&mut self, min_distance_m: f64, min_interval: Duration) -> CallResult {
        self.record(ProviderCall::StartContinuous {
            min_distance_m,
            min_interval,
        })
    }

    fn stop_continuous_sampling(&mut self) -> CallResult {
        self.record(ProviderCall::StopContinuous)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerCall {
    Schedule(Duration),
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingTimer {
    calls: Arc<Mutex<Vec<TimerCall>>>,
}

impl RecordingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TimerCall> {
        read(&self.calls)
    }

    /// The period set by the most recent `schedule`, `None` if cancelled or never set.
    pub fn current_period(&self) -> Option<Duration> {
        match self.calls().last() {
            Some(TimerCall::Schedule(d)) => Some(*d),
            _ => None,
        }
    }
}

impl RecheckTimer for RecordingTimer {
    fn schedule(&mut self, every: Duration) -> CallResult {
        push(&self.calls, TimerCall::Schedule(every));
        Ok(())
    }

    fn cancel(&mut self) -> CallResult {
        push(&self.calls, TimerCall::Cancel);
        Ok(())
    }
}

/// Display that records events and routes; optionally fails every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    events: Arc<Mutex<Vec<WalkEvent>>>,
    routes: Arc<Mutex<Vec<RouteOverlay>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WalkEvent> {
        read(&self.events)
    }

    pub fn routes(&self) -> Vec<RouteOverlay> {
        read(&self.routes)
    }

    pub fn set_failing(&self, on: bool) {
        self.failing.store(on, Ordering::Relaxed);
    }

    fn outcome(&self) -> CallResult {
        if self.failing.load(Ordering::Relaxed) {
            return Err(Box::new(std::io::Error::other("map view unavailable")));
        }
        Ok(())
    }
}

impl DisplaySink for RecordingDisplay {
    fn on_event(&mut self, event: &WalkEvent) -> CallResult {
        push(&self.events, event.clone());
        self.outcome()
    }

    fn on_route(&mut self, route: &RouteOverlay) -> CallResult {
        push(&self.routes, route.clone());
        self.outcome()
    }
}
