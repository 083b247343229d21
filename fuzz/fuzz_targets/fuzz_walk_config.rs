#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are both fine; panics are not.
    if let Ok(cfg) = walk_config::load_toml(data)
        && cfg.validate().is_ok()
    {
        let _session_cfg: walk_core::WalkCfg = (&cfg).into();
    }
});
