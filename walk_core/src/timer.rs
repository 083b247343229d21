//! In-process `RecheckTimer` for hosts that generate ticks themselves.
//!
//! The session owns `CadenceTimer` and reschedules it on state changes; the
//! host keeps the `CadenceHandle` and turns the current cadence into ticks via
//! `TickSchedule`. The two halves share lock-free atomics.

use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use walk_traits::RecheckTimer;

#[derive(Debug, Default)]
struct Cadence {
    /// Tick period in milliseconds; 0 = cancelled.
    period_ms: AtomicU64,
    /// Bumped on every schedule/cancel so the host restarts its countdown.
    epoch: AtomicU64,
}

/// Session-facing half.
#[derive(Debug)]
pub struct CadenceTimer {
    shared: Arc<Cadence>,
}

/// Host-facing half.
#[derive(Debug, Clone)]
pub struct CadenceHandle {
    shared: Arc<Cadence>,
}

/// Create a connected timer/handle pair. The cadence starts cancelled.
pub fn cadence_timer() -> (CadenceTimer, CadenceHandle) {
    let shared = Arc::new(Cadence::default());
    (
        CadenceTimer {
            shared: shared.clone(),
        },
        CadenceHandle { shared },
    )
}

impl RecheckTimer for CadenceTimer {
    fn schedule(&mut self, every: Duration) -> Result<(), Box<dyn Error + Send + Sync>> {
        let ms = u64::try_from(every.as_millis()).unwrap_or(u64::MAX).max(1);
        self.shared.period_ms.store(ms, Ordering::Relaxed);
        self.shared.epoch.fetch_add(1, Ordering::Release);
        tracing::trace!(period_ms = ms, "cadence scheduled");
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.shared.period_ms.store(0, Ordering::Relaxed);
        self.shared.epoch.fetch_add(1, Ordering::Release);
        Ok(())
    }
}

impl CadenceHandle {
    /// Current tick period, `None` when cancelled.
    pub fn period(&self) -> Option<Duration> {
        match self.shared.period_ms.load(Ordering::Relaxed) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    fn epoch(&self) -> u64 {
        self.shared.epoch.load(Ordering::Acquire)
    }
}

/// Turns a cadence into concrete tick instants.
#[derive(Debug)]
pub struct TickSchedule {
    handle: CadenceHandle,
    seen_epoch: Option<u64>,
    next_due: Option<Instant>,
}

impl TickSchedule {
    pub fn new(handle: CadenceHandle) -> Self {
        Self {
            handle,
            seen_epoch: None,
            next_due: None,
        }
    }

    /// Pick up a reschedule; the countdown restarts at `now`.
    pub fn sync(&mut self, now: Instant) {
        let epoch = self.handle.epoch();
        if self.seen_epoch != Some(epoch) {
            self.seen_epoch = Some(epoch);
            self.next_due = self.handle.period().map(|p| now + p);
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Consume the tick due at or before `now`, if any, and return its instant.
    pub fn take_due(&mut self, now: Instant) -> Option<Instant> {
        let due = self.next_due?;
        if due > now {
            return None;
        }
        self.next_due = self.handle.period().map(|p| due + p);
        Some(due)
    }
}
