//! `From` implementations bridging `walk_config` types to `walk_core` types.

use std::time::Duration;

use crate::config::{HoldingRule, WalkCfg};

/// Seconds from a validated config field; negative or non-finite input maps to zero.
fn secs(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}

// ── HoldingRule ──────────────────────────────────────────────────────────────

impl From<walk_config::HoldingRuleCfg> for HoldingRule {
    fn from(c: walk_config::HoldingRuleCfg) -> Self {
        match c {
            walk_config::HoldingRuleCfg::EveryBuffered => HoldingRule::EveryBuffered,
            walk_config::HoldingRuleCfg::LastBuffered => HoldingRule::LastBuffered,
        }
    }
}

// ── WalkCfg ──────────────────────────────────────────────────────────────────

impl From<&walk_config::Config> for WalkCfg {
    fn from(c: &walk_config::Config) -> Self {
        let s = &c.session;
        let p = &c.sampling;
        Self {
            buffer_capacity: s.buffer_capacity,
            required_accuracy_m: s.required_accuracy_m,
            valid_time_interval: secs(s.valid_time_interval_s),
            valid_distance_m: s.valid_distance_m,
            max_wait_to_move: Duration::from_secs(s.max_wait_to_move_s),
            sample_request_interval: secs(p.request_interval_s),
            recheck_interval: secs(p.recheck_interval_s),
            holding_speed_mps: s.holding_speed_mps,
            holding_rule: s.holding_rule.into(),
            continuous_min_distance_m: p.continuous_min_distance_m,
            continuous_min_interval: secs(p.continuous_min_interval_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_line_up() {
        let cfg = WalkCfg::from(&walk_config::Config::default());
        assert_eq!(cfg, WalkCfg::default());
    }

    #[test]
    fn toml_sections_map_to_runtime_cfg() {
        let toml = r#"
            [session]
            buffer_capacity = 8
            valid_time_interval_s = 1.5
            max_wait_to_move_s = 90
            holding_rule = "last_buffered"

            [sampling]
            recheck_interval_s = 30
            continuous_min_interval_s = 0.25
        "#;
        let c = walk_config::load_toml(toml).expect("parse");
        let cfg = WalkCfg::from(&c);
        assert_eq!(cfg.buffer_capacity, 8);
        assert_eq!(cfg.valid_time_interval, Duration::from_millis(1500));
        assert_eq!(cfg.max_wait_to_move, Duration::from_secs(90));
        assert_eq!(cfg.holding_rule, HoldingRule::LastBuffered);
        assert_eq!(cfg.recheck_interval, Duration::from_secs(30));
        assert_eq!(cfg.continuous_min_interval, Duration::from_millis(250));
    }
}
