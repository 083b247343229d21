//! `replay` command: feed a recorded trace through a walk session.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use eyre::WrapErr;
use walk_core::actor::WalkActor;
use walk_core::error::Result as CoreResult;
use walk_core::runner::replay;
use walk_core::timer::cadence_timer;
use walk_core::{WalkCfg, WalkSessionBuilder};
use walk_provider::{samples_from_rows, trace_provider};
use walk_traits::{Clock, ManualClock, MonotonicClock};

use crate::display::{ConsoleDisplay, RunReport};

pub fn run_replay(
    cfg: &walk_config::Config,
    trace: &Path,
    live: bool,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunReport> {
    let rows = walk_config::load_trace_csv(trace)
        .wrap_err_with(|| format!("load trace {}", trace.display()))?;
    let walk_cfg: WalkCfg = cfg.into();
    tracing::info!(fixes = rows.len(), live, "replaying trace");

    if live {
        run_live(&rows, walk_cfg, json, &shutdown)
    } else {
        run_simulated(&rows, walk_cfg, json, &shutdown)
    }
}

/// Simulated clock: runs as fast as the CPU allows, same result every time.
fn run_simulated(
    rows: &[walk_config::TraceRow],
    walk_cfg: WalkCfg,
    json: bool,
    shutdown: &AtomicBool,
) -> CoreResult<RunReport> {
    let clock = ManualClock::new();
    let samples = samples_from_rows(rows, clock.origin()).wrap_err("load trace samples")?;
    let (provider, link) = trace_provider();
    let (timer, cadence) = cadence_timer();
    let mut session = WalkSessionBuilder::new()
        .with_provider(provider)
        .with_timer(timer)
        .with_display(ConsoleDisplay::new(json))
        .with_config(walk_cfg)
        .with_clock(Box::new(clock.clone()))
        .build()?;

    let summary = replay(
        &mut session,
        &clock,
        cadence,
        samples,
        |s| link.admit(s),
        Some(shutdown),
    );
    if let Some(err) = session.last_collaborator_error() {
        tracing::warn!(error = %err, "collaborator reported a failure during replay");
    }
    let stats = session.stats();
    Ok(RunReport {
        mode: "simulated",
        fixes: summary.fixes,
        delivered: summary.delivered,
        accepted: stats.accepted,
        rejected: stats.rejected,
        holds: stats.holds,
        resumes: stats.resumes,
        total_m: summary.total_m,
        interrupted: summary.interrupted,
    })
}

/// Wall clock: fixes are released at their recorded offsets through the actor.
fn run_live(
    rows: &[walk_config::TraceRow],
    walk_cfg: WalkCfg,
    json: bool,
    shutdown: &AtomicBool,
) -> CoreResult<RunReport> {
    let clock = MonotonicClock::new();
    let (provider, link) = trace_provider();
    let (timer, cadence) = cadence_timer();
    let session = WalkSessionBuilder::new()
        .with_provider(provider)
        .with_timer(timer)
        .with_display(ConsoleDisplay::new(json))
        .with_config(walk_cfg)
        .with_clock(Box::new(clock))
        .build()?;

    let actor = WalkActor::spawn(session, cadence);
    let handle = actor.handle();
    handle.start()?;
    // the walk has started once the snapshot comes back
    handle.snapshot()?;
    let epoch: Instant = clock.now();
    let samples = samples_from_rows(rows, epoch).wrap_err("load trace samples")?;

    let mut report = RunReport {
        mode: "live",
        ..RunReport::default()
    };
    for sample in samples {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("replay interrupted");
            report.interrupted = true;
            break;
        }
        clock.sleep(sample.timestamp.saturating_duration_since(clock.now()));
        report.fixes += 1;
        if link.admit(&sample) {
            report.delivered += 1;
            handle.sample(sample)?;
        }
    }
    handle.stop()?;

    let snap = handle.snapshot()?;
    let session = actor.join()?;
    report.accepted = snap.stats.accepted;
    report.rejected = snap.stats.rejected;
    report.holds = snap.stats.holds;
    report.resumes = snap.stats.resumes;
    report.total_m = session.total_distance_m();
    if let Some(err) = snap.last_error {
        tracing::warn!(error = %err, "collaborator reported a failure during replay");
    }
    Ok(report)
}
