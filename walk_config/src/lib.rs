#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and recorded-trace parsing for walkmeter.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The trace CSV loader enforces headers and row ordering so a replay never
//!   sees time running backwards.
use serde::Deserialize;

/// Recorded trace CSV schema.
///
/// Expected headers:
/// t_s,lat,lon,accuracy_m,speed_mps
///
/// `t_s` is seconds since the start of the recording. `speed_mps` may be left
/// empty when the receiver did not report a speed.
///
/// Example:
/// t_s,lat,lon,accuracy_m,speed_mps
/// 1.0,52.3700,4.8900,5.0,1.4
/// 5.0,52.3704,4.8900,6.0,
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub t_s: f64,
    pub lat: f64,
    pub lon: f64,
    pub accuracy_m: f64,
    #[serde(default)]
    pub speed_mps: Option<f64>,
}

/// How the "every buffered sample is slow" decision is evaluated.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HoldingRuleCfg {
    /// All buffered samples must be slow.
    #[default]
    EveryBuffered,
    /// Only the most recently buffered sample decides.
    LastBuffered,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Number of recent accepted fixes kept for candidate selection
    pub buffer_capacity: usize,
    /// Fixes with a worse horizontal accuracy are dropped
    pub required_accuracy_m: f64,
    /// Maximum age of a buffered fix to be considered as the next point
    pub valid_time_interval_s: f64,
    /// Movement under this distance counts as standing still
    pub valid_distance_m: f64,
    /// Standing still for longer than this may switch to holding
    pub max_wait_to_move_s: u64,
    /// Reported speeds below this count as "not moving"
    pub holding_speed_mps: f64,
    pub holding_rule: HoldingRuleCfg,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            buffer_capacity: 5,
            required_accuracy_m: 20.0,
            valid_time_interval_s: 3.0,
            valid_distance_m: 3.0,
            max_wait_to_move_s: 60,
            holding_speed_mps: 1.0,
            holding_rule: HoldingRuleCfg::EveryBuffered,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Keepalive single-shot request cadence (seconds)
    pub request_interval_s: f64,
    /// Re-check cadence while holding (seconds)
    pub recheck_interval_s: f64,
    /// Continuous mode: minimum displacement between delivered fixes
    pub continuous_min_distance_m: f64,
    /// Continuous mode: minimum time between delivered fixes
    pub continuous_min_interval_s: f64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            request_interval_s: 10.0,
            recheck_interval_s: 10.0,
            continuous_min_distance_m: 0.0,
            continuous_min_interval_s: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Longest recording accepted by `load_trace_csv` (seven days, in seconds).
pub const MAX_TRACE_S: f64 = 7.0 * 24.0 * 60.0 * 60.0;

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["t_s", "lat", "lon", "accuracy_m", "speed_mps"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 't_s,lat,lon,accuracy_m,speed_mps', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<TraceRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let row = match rec {
            Ok(row) => row,
            Err(e) => eyre::bail!("invalid CSV row {}: {}", idx + 2, e),
        };
        if !row.t_s.is_finite() || row.t_s < 0.0 || row.t_s > MAX_TRACE_S {
            eyre::bail!(
                "invalid CSV row {}: t_s must be a finite value between 0 and {MAX_TRACE_S}",
                idx + 2
            );
        }
        if let Some(prev) = rows.last()
            && row.t_s < prev.t_s
        {
            eyre::bail!(
                "trace rows must be ordered by t_s (row {} goes back to {}s)",
                idx + 2,
                row.t_s
            );
        }
        rows.push(row);
    }

    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} has no rows", path);
    }
    Ok(rows)
}

/// Largest interval accepted for any cadence or window (one day).
const MAX_INTERVAL_S: f64 = 24.0 * 60.0 * 60.0;

fn check_interval(name: &str, v: f64) -> eyre::Result<()> {
    if !(v.is_finite() && v > 0.0) {
        eyre::bail!("{name} must be > 0");
    }
    if v > MAX_INTERVAL_S {
        eyre::bail!("{name} is unreasonably large (>24h)");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Session
        let s = &self.session;
        if s.buffer_capacity == 0 {
            eyre::bail!("session.buffer_capacity must be >= 1");
        }
        if s.buffer_capacity > 1000 {
            eyre::bail!("session.buffer_capacity is unreasonably large (>1000)");
        }
        if !(s.required_accuracy_m.is_finite() && s.required_accuracy_m > 0.0) {
            eyre::bail!("session.required_accuracy_m must be > 0");
        }
        check_interval("session.valid_time_interval_s", s.valid_time_interval_s)?;
        if !(s.valid_distance_m.is_finite() && s.valid_distance_m >= 0.0) {
            eyre::bail!("session.valid_distance_m must be >= 0");
        }
        if s.max_wait_to_move_s as f64 > MAX_INTERVAL_S {
            eyre::bail!("session.max_wait_to_move_s is unreasonably large (>24h)");
        }
        if !(s.holding_speed_mps.is_finite() && s.holding_speed_mps > 0.0) {
            eyre::bail!("session.holding_speed_mps must be > 0");
        }

        // Sampling
        let p = &self.sampling;
        check_interval("sampling.request_interval_s", p.request_interval_s)?;
        check_interval("sampling.recheck_interval_s", p.recheck_interval_s)?;
        if !(p.continuous_min_distance_m.is_finite() && p.continuous_min_distance_m >= 0.0) {
            eyre::bail!("sampling.continuous_min_distance_m must be >= 0");
        }
        if !(p.continuous_min_interval_s.is_finite() && p.continuous_min_interval_s >= 0.0) {
            eyre::bail!("sampling.continuous_min_interval_s must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        Ok(())
    }
}
