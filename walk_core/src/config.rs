//! Runtime configuration for the walk session.
//!
//! These are the types `WalkSession` runs on. They are separate from the
//! TOML-deserialized config in `walk_config`; see `conversions`.

use std::time::Duration;

use walk_traits::PositionSample;

/// Rule deciding whether buffered samples say the walker has come to rest.
///
/// Unavailable speed (negative or non-finite) always counts as slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldingRule {
    /// Every buffered sample reports a speed below the threshold.
    #[default]
    EveryBuffered,
    /// Only the most recently buffered sample is consulted.
    LastBuffered,
}

/// The rule used unless configured otherwise.
pub const DEFAULT_HOLDING_RULE: HoldingRule = HoldingRule::EveryBuffered;

impl HoldingRule {
    /// Apply the rule to buffered samples, oldest first.
    pub fn is_at_rest<'a, I>(self, samples: I, slow_below_mps: f64) -> bool
    where
        I: DoubleEndedIterator<Item = &'a PositionSample>,
    {
        let is_slow = |s: &PositionSample| !s.has_speed() || s.speed_mps < slow_below_mps;
        match self {
            HoldingRule::EveryBuffered => {
                let mut samples = samples.peekable();
                samples.peek().is_some() && samples.all(is_slow)
            }
            HoldingRule::LastBuffered => samples.last().is_some_and(is_slow),
        }
    }
}

/// Session thresholds and cadences, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkCfg {
    /// Number of accepted fixes kept for candidate selection.
    pub buffer_capacity: usize,
    /// Fixes with a worse (larger) horizontal accuracy are rejected.
    pub required_accuracy_m: f64,
    /// Maximum age of a buffered fix to be picked as the next point.
    pub valid_time_interval: Duration,
    /// Displacement at or under this counts as not having moved.
    pub valid_distance_m: f64,
    /// Standing still for longer than this may switch to holding.
    pub max_wait_to_move: Duration,
    /// Keepalive single-shot request cadence.
    pub sample_request_interval: Duration,
    /// Re-check cadence while holding.
    pub recheck_interval: Duration,
    /// Speeds below this are "not moving".
    pub holding_speed_mps: f64,
    pub holding_rule: HoldingRule,
    /// Passed to the provider when continuous sampling starts.
    pub continuous_min_distance_m: f64,
    pub continuous_min_interval: Duration,
}

impl Default for WalkCfg {
    fn default() -> Self {
        Self {
            buffer_capacity: 5,
            required_accuracy_m: 20.0,
            valid_time_interval: Duration::from_secs(3),
            valid_distance_m: 3.0,
            max_wait_to_move: Duration::from_secs(60),
            sample_request_interval: Duration::from_secs(10),
            recheck_interval: Duration::from_secs(10),
            holding_speed_mps: 1.0,
            holding_rule: DEFAULT_HOLDING_RULE,
            continuous_min_distance_m: 0.0,
            continuous_min_interval: Duration::ZERO,
        }
    }
}
