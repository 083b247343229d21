//! Drive a session by hand with recording collaborators and a manual clock.
//!
//! Run with: cargo run -p walk_core --example quick_start

use std::time::Duration;

use walk_core::mocks::{RecordingDisplay, RecordingProvider, RecordingTimer};
use walk_core::{WalkCfg, WalkSessionBuilder};
use walk_traits::{Coordinate, ManualClock, PositionSample};

fn main() -> eyre::Result<()> {
    let clock = ManualClock::new();
    let display = RecordingDisplay::new();
    let mut session = WalkSessionBuilder::new()
        .with_provider(RecordingProvider::new())
        .with_timer(RecordingTimer::new())
        .with_display(display.clone())
        .with_config(WalkCfg::default())
        .with_clock(Box::new(clock.clone()))
        .build()?;

    session.start();
    let start = Coordinate::new(52.3700, 4.8900);
    for i in 1..=10u32 {
        let ts = clock.origin() + Duration::from_secs(u64::from(i) * 2);
        clock.advance_to(ts);
        let fix = PositionSample::new(
            start.offset_by_meters(2.8 * f64::from(i), 0.0),
            6.0,
            ts,
            1.4,
        );
        let outcome = session.on_sample(fix);
        println!("t={:>2}s {:?}", i * 2, outcome);
    }
    session.stop();

    println!("events: {}", display.events().len());
    println!("walked {:.1} m", session.total_distance_m());
    Ok(())
}
