use clap::Parser;
use eyre::WrapErr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

mod check;
mod cli;
mod display;
mod error_fmt;
mod logging;
mod replay;

use cli::{Cli, Commands, DEFAULT_CONFIG, JSON_MODE, json_mode};
use error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if json_mode() {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    // Pretty panic reports; errors are rendered by humanize() above.
    let _ = color_eyre::install();

    let cfg = load_config(cli.config.as_deref())?;
    logging::init(cli.log_level.as_deref(), cli.json, &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "could not install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Replay { trace, live } => {
            let report = replay::run_replay(&cfg, &trace, live, cli.json, shutdown)?;
            println!("{}", report.render(cli.json));
        }
        Commands::Check => {
            let walk_cfg: walk_core::WalkCfg = (&cfg).into();
            println!("{}", check::render(&walk_cfg, cli.json));
        }
    }
    Ok(())
}

/// `--config` wins; otherwise the default path when it exists; otherwise built-in defaults.
fn load_config(explicit: Option<&Path>) -> eyre::Result<walk_config::Config> {
    let path: Option<PathBuf> = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.exists()),
    };

    let cfg = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("read config {}", path.display()))?;
            walk_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", path.display()))?
        }
        None => walk_config::Config::default(),
    };
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}
