#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Trace-backed location provider.
//!
//! Plays the role a platform location service plays on a device: the session
//! tells it when to stream fixes continuously and when to hand out a single
//! fix, and the driver side (`ProviderLink`) decides from that mode whether a
//! recorded fix is actually delivered.
pub mod error;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use walk_config::TraceRow;
use walk_traits::{Coordinate, LocationProvider, PositionSample};

use crate::error::{ProviderError, Result};

#[derive(Debug, Clone, Copy)]
struct ContinuousMode {
    min_distance_m: f64,
    min_interval: Duration,
}

#[derive(Debug, Default)]
struct LinkState {
    continuous: Option<ContinuousMode>,
    pending_single: bool,
    last_delivered: Option<PositionSample>,
    revoked: bool,
    single_requests: u64,
    delivered: u64,
}

/// Counters describing what the provider was asked for and what it delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub single_requests: u64,
    pub delivered: u64,
    pub continuous: bool,
}

/// Session-facing half: implements `LocationProvider`.
#[derive(Debug)]
pub struct TraceProvider {
    state: Arc<Mutex<LinkState>>,
}

/// Driver-facing half: gates recorded fixes by the current request mode.
#[derive(Debug, Clone)]
pub struct ProviderLink {
    state: Arc<Mutex<LinkState>>,
}

/// Create a connected provider/link pair.
pub fn trace_provider() -> (TraceProvider, ProviderLink) {
    let state = Arc::new(Mutex::new(LinkState::default()));
    (
        TraceProvider {
            state: state.clone(),
        },
        ProviderLink { state },
    )
}

impl TraceProvider {
    fn lock(&self) -> Result<MutexGuard<'_, LinkState>> {
        // Only the provider itself is left: nobody is feeding fixes any more.
        if Arc::strong_count(&self.state) < 2 {
            return Err(ProviderError::Disconnected);
        }
        self.state.lock().map_err(|_| ProviderError::Disconnected)
    }

    fn lock_authorized(&self) -> Result<MutexGuard<'_, LinkState>> {
        let st = self.lock()?;
        if st.revoked {
            return Err(ProviderError::PermissionDenied);
        }
        Ok(st)
    }
}

impl LocationProvider for TraceProvider {
    fn request_single_sample(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.lock_authorized()?;
        st.pending_single = true;
        st.single_requests = st.single_requests.saturating_add(1);
        tracing::trace!(requests = st.single_requests, "single fix requested");
        Ok(())
    }

    fn start_continuous_sampling(
        &mut self,
        min_distance_m: f64,
        min_interval: Duration,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.lock_authorized()?;
        st.continuous = Some(ContinuousMode {
            min_distance_m: min_distance_m.max(0.0),
            min_interval,
        });
        tracing::debug!(min_distance_m, ?min_interval, "continuous sampling on");
        Ok(())
    }

    fn stop_continuous_sampling(&mut self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut st = self.lock()?;
        st.continuous = None;
        tracing::debug!("continuous sampling off");
        Ok(())
    }
}

impl ProviderLink {
    /// Decide whether a recorded fix is delivered under the current mode.
    ///
    /// Continuous mode delivers fixes that clear the min distance / min
    /// interval gates relative to the last delivered fix. Otherwise a pending
    /// single-shot request is answered (and consumed) by this fix.
    pub fn admit(&self, sample: &PositionSample) -> bool {
        let Ok(mut st) = self.state.lock() else {
            return false;
        };
        if st.revoked {
            return false;
        }
        let continuous_ok = match (st.continuous, st.last_delivered) {
            (Some(_), None) => true,
            (Some(mode), Some(last)) => {
                last.distance_to(sample) >= mode.min_distance_m
                    && sample.timestamp.saturating_duration_since(last.timestamp)
                        >= mode.min_interval
            }
            (None, _) => false,
        };
        let admitted = continuous_ok || st.pending_single;
        if admitted {
            st.pending_single = false;
            st.last_delivered = Some(*sample);
            st.delivered = st.delivered.saturating_add(1);
        }
        admitted
    }

    /// Simulate the user revoking location permission.
    pub fn revoke(&self) {
        if let Ok(mut st) = self.state.lock() {
            st.revoked = true;
            st.continuous = None;
            st.pending_single = false;
        }
        tracing::warn!("location permission revoked");
    }

    pub fn stats(&self) -> LinkStats {
        self.state
            .lock()
            .map(|st| LinkStats {
                single_requests: st.single_requests,
                delivered: st.delivered,
                continuous: st.continuous.is_some(),
            })
            .unwrap_or_default()
    }
}

/// Convert recorded rows into samples anchored at `epoch`.
///
/// Fails on the first row whose offset cannot be represented as an `Instant`
/// after `epoch` (`index` is zero-based).
pub fn samples_from_rows(rows: &[TraceRow], epoch: Instant) -> Result<Vec<PositionSample>> {
    rows.iter()
        .enumerate()
        .map(|(index, r)| {
            let timestamp = Duration::try_from_secs_f64(r.t_s)
                .ok()
                .and_then(|offset| epoch.checked_add(offset))
                .ok_or(ProviderError::TimestampOutOfRange { index, t_s: r.t_s })?;
            Ok(PositionSample::new(
                Coordinate::new(r.lat, r.lon),
                r.accuracy_m,
                timestamp,
                r.speed_mps.unwrap_or(-1.0),
            ))
        })
        .collect()
}
