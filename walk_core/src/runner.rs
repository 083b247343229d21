//! Deterministic replay of recorded fixes through a `WalkSession`.
//!
//! Time is driven by a `ManualClock`: before each fix the clock is moved to
//! the fix timestamp, firing any cadence ticks that fall due on the way. An
//! admission gate decides whether the provider, in its current request mode,
//! would have delivered the fix at all.

use std::sync::atomic::{AtomicBool, Ordering};

use walk_traits::{Clock, LocationProvider, ManualClock, PositionSample, RecheckTimer};

use crate::event::DisplaySink;
use crate::session::WalkSession;
use crate::status::SampleOutcome;
use crate::timer::{CadenceHandle, TickSchedule};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    /// Recorded fixes looked at.
    pub fixes: u64,
    /// Fixes the provider delivered to the session.
    pub delivered: u64,
    pub ticks: u64,
    pub advanced: u64,
    pub rejected: u64,
    pub holds: u64,
    pub total_m: f64,
    /// Stopped early by the caller.
    pub interrupted: bool,
}

impl ReplaySummary {
    fn tally(&mut self, outcome: SampleOutcome) {
        if outcome.is_rejected() {
            self.rejected += 1;
            return;
        }
        match outcome {
            SampleOutcome::Advanced { .. } => self.advanced += 1,
            SampleOutcome::Holding => self.holds += 1,
            _ => {}
        }
    }
}

/// Replay `samples` (ordered by timestamp) as one walk.
///
/// The session must have been built with `clock` (or a clone) and with the
/// `CadenceTimer` paired to `cadence`. The walk starts at the clock's current
/// instant and is stopped after the last fix or as soon as `stop` is set.
pub fn replay<P, T, D, I, F>(
    session: &mut WalkSession<P, T, D>,
    clock: &ManualClock,
    cadence: CadenceHandle,
    samples: I,
    mut admit: F,
    stop: Option<&AtomicBool>,
) -> ReplaySummary
where
    P: LocationProvider,
    T: RecheckTimer,
    D: DisplaySink,
    I: IntoIterator<Item = PositionSample>,
    F: FnMut(&PositionSample) -> bool,
{
    let mut summary = ReplaySummary::default();
    let mut ticks = TickSchedule::new(cadence);

    session.start();
    ticks.sync(clock.now());

    for sample in samples {
        if stop.is_some_and(|s| s.load(Ordering::Relaxed)) {
            tracing::info!("replay interrupted");
            summary.interrupted = true;
            break;
        }

        while let Some(due) = ticks.take_due(sample.timestamp) {
            clock.advance_to(due);
            session.on_tick();
            summary.ticks += 1;
            ticks.sync(clock.now());
        }
        clock.advance_to(sample.timestamp);
        summary.fixes += 1;

        if !admit(&sample) {
            tracing::trace!("fix not delivered by provider");
            continue;
        }
        summary.delivered += 1;
        let outcome = session.on_sample(sample);
        summary.tally(outcome);
        ticks.sync(clock.now());
    }

    summary.total_m = session.total_distance_m();
    session.stop();
    summary
}
