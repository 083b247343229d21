//! `check` command: print the effective session settings.

use walk_core::WalkCfg;

pub fn render(cfg: &WalkCfg, json: bool) -> String {
    if json {
        serde_json::json!({
            "event": "config",
            "buffer_capacity": cfg.buffer_capacity,
            "required_accuracy_m": cfg.required_accuracy_m,
            "valid_time_interval_s": cfg.valid_time_interval.as_secs_f64(),
            "valid_distance_m": cfg.valid_distance_m,
            "max_wait_to_move_s": cfg.max_wait_to_move.as_secs_f64(),
            "sample_request_interval_s": cfg.sample_request_interval.as_secs_f64(),
            "recheck_interval_s": cfg.recheck_interval.as_secs_f64(),
            "holding_speed_mps": cfg.holding_speed_mps,
            "holding_rule": format!("{:?}", cfg.holding_rule),
            "continuous_min_distance_m": cfg.continuous_min_distance_m,
            "continuous_min_interval_s": cfg.continuous_min_interval.as_secs_f64(),
        })
        .to_string()
    } else {
        format!(
            "config OK\n  buffer: {} fixes, accuracy <= {} m, max age {:?}\n  still below {} m, holding after {:?} under {} m/s ({:?})\n  keepalive every {:?}, recheck every {:?}",
            cfg.buffer_capacity,
            cfg.required_accuracy_m,
            cfg.valid_time_interval,
            cfg.valid_distance_m,
            cfg.max_wait_to_move,
            cfg.holding_speed_mps,
            cfg.holding_rule,
            cfg.sample_request_interval,
            cfg.recheck_interval,
        )
    }
}
