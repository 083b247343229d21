//! Single-threaded host for a live `WalkSession`.
//!
//! One thread owns the session. Commands, fixes and resolved routes arrive
//! over a bounded channel and each is fully processed before the next one is
//! taken; keepalive/re-check ticks are generated inside the same loop from the
//! cadence the session sets on its `CadenceTimer`.
//!
//! Safety: the thread is shut down and joined when the `WalkActor` is dropped.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use walk_traits::{LocationProvider, PositionSample, RecheckTimer};

use crate::error::{Result, WalkError};
use crate::event::{DisplaySink, RouteOverlay};
use crate::session::{SessionSnapshot, WalkSession};
use crate::timer::{CadenceHandle, TickSchedule};

/// Upper bound on how long the loop waits before re-checking shutdown and ticks.
const IDLE_POLL: Duration = Duration::from_millis(50);
const QUEUE_DEPTH: usize = 64;

/// Everything the actor reacts to.
#[derive(Debug)]
pub enum Input {
    Start,
    Stop,
    Sample(PositionSample),
    Tick,
    RouteResolved(RouteOverlay),
    Snapshot(xch::Sender<SessionSnapshot>),
    Shutdown,
}

/// Cloneable sender side for the provider callback, the UI and route lookups.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    tx: xch::Sender<Input>,
}

impl ActorHandle {
    pub fn send(&self, input: Input) -> Result<()> {
        self.tx
            .send(input)
            .map_err(|_| eyre::Report::new(WalkError::ActorGone))
    }

    pub fn start(&self) -> Result<()> {
        self.send(Input::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Input::Stop)
    }

    pub fn sample(&self, sample: PositionSample) -> Result<()> {
        self.send(Input::Sample(sample))
    }

    pub fn tick(&self) -> Result<()> {
        self.send(Input::Tick)
    }

    pub fn route_resolved(&self, route: RouteOverlay) -> Result<()> {
        self.send(Input::RouteResolved(route))
    }

    /// Ask for a snapshot; answered after everything queued before it.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply_tx, reply_rx) = xch::bounded(1);
        self.send(Input::Snapshot(reply_tx))?;
        reply_rx
            .recv()
            .map_err(|_| eyre::Report::new(WalkError::ActorGone))
    }
}

pub struct WalkActor<P, T, D> {
    handle: ActorHandle,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<WalkSession<P, T, D>>>,
}

impl<P, T, D> WalkActor<P, T, D>
where
    P: LocationProvider + Send + 'static,
    T: RecheckTimer + Send + 'static,
    D: DisplaySink + Send + 'static,
{
    /// Move `session` onto its own thread. `cadence` must be the handle paired
    /// with the session's `CadenceTimer` (otherwise no ticks are generated).
    pub fn spawn(session: WalkSession<P, T, D>, cadence: CadenceHandle) -> Self {
        let (tx, rx) = xch::bounded(QUEUE_DEPTH);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let join_handle = std::thread::spawn(move || run_loop(session, &rx, cadence, &shutdown_clone));
        Self {
            handle: ActorHandle { tx },
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl<P, T, D> WalkActor<P, T, D> {
    pub fn handle(&self) -> ActorHandle {
        self.handle.clone()
    }

    /// Process everything already queued, stop the thread and hand the session back.
    pub fn join(mut self) -> Result<WalkSession<P, T, D>> {
        let _ = self.handle.send(Input::Shutdown);
        let Some(handle) = self.join_handle.take() else {
            return Err(eyre::Report::new(WalkError::ActorGone));
        };
        handle
            .join()
            .map_err(|_| eyre::Report::new(WalkError::State("walk actor thread panicked".into())))
    }
}

impl<P, T, D> Drop for WalkActor<P, T, D> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(_) => tracing::trace!("walk actor thread joined"),
                Err(e) => tracing::warn!(?e, "walk actor thread panicked during shutdown"),
            }
        }
    }
}

fn run_loop<P, T, D>(
    mut session: WalkSession<P, T, D>,
    rx: &xch::Receiver<Input>,
    cadence: CadenceHandle,
    shutdown: &AtomicBool,
) -> WalkSession<P, T, D>
where
    P: LocationProvider,
    T: RecheckTimer,
    D: DisplaySink,
{
    let mut ticks = TickSchedule::new(cadence);
    ticks.sync(session.now());
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("walk actor received shutdown signal");
            break;
        }

        let now = session.now();
        if ticks.take_due(now).is_some() {
            session.on_tick();
            ticks.sync(session.now());
            continue;
        }

        let wait = ticks
            .next_due()
            .map_or(IDLE_POLL, |due| due.saturating_duration_since(now))
            .min(IDLE_POLL);
        match rx.recv_timeout(wait) {
            Ok(Input::Shutdown) => break,
            Ok(input) => {
                handle_input(&mut session, input);
                ticks.sync(session.now());
            }
            Err(xch::RecvTimeoutError::Timeout) => {}
            Err(xch::RecvTimeoutError::Disconnected) => {
                tracing::debug!("all actor handles dropped, exiting");
                break;
            }
        }
    }
    session.close();
    tracing::trace!("walk actor thread exiting cleanly");
    session
}

fn handle_input<P, T, D>(session: &mut WalkSession<P, T, D>, input: Input)
where
    P: LocationProvider,
    T: RecheckTimer,
    D: DisplaySink,
{
    match input {
        Input::Start => session.start(),
        Input::Stop => session.stop(),
        Input::Sample(sample) => {
            let outcome = session.on_sample(sample);
            tracing::trace!(?outcome, "fix processed");
        }
        Input::Tick => session.on_tick(),
        Input::RouteResolved(route) => {
            let _ = session.deliver_route(&route);
        }
        Input::Snapshot(reply) => {
            // requester may have given up; nothing to do then
            let _ = reply.send(session.snapshot());
        }
        Input::Shutdown => {}
    }
}
