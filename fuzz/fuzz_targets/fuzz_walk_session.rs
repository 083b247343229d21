#![no_main]
use std::time::Duration;

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use walk_core::WalkSessionBuilder;
use walk_core::mocks::{RecordingDisplay, RecordingProvider, RecordingTimer};
use walk_traits::{Clock, Coordinate, ManualClock, PositionSample};

#[derive(Debug, Arbitrary)]
enum Op {
    Start,
    Stop,
    Tick,
    Fix {
        dt_ms: u16,
        lat: f64,
        lon: f64,
        accuracy_m: f64,
        speed_mps: f64,
    },
}

fuzz_target!(|ops: Vec<Op>| {
    let clock = ManualClock::new();
    let Ok(mut session) = WalkSessionBuilder::new()
        .with_provider(RecordingProvider::new())
        .with_timer(RecordingTimer::new())
        .with_display(RecordingDisplay::new())
        .with_clock(Box::new(clock.clone()))
        .build()
    else {
        return;
    };

    for op in ops {
        match op {
            Op::Start => session.start(),
            Op::Stop => session.stop(),
            Op::Tick => session.on_tick(),
            Op::Fix {
                dt_ms,
                lat,
                lon,
                accuracy_m,
                speed_mps,
            } => {
                clock.advance(Duration::from_millis(u64::from(dt_ms)));
                let fix =
                    PositionSample::new(Coordinate::new(lat, lon), accuracy_m, clock.now(), speed_mps);
                let before = session.total_distance_m();
                session.on_sample(fix);
                assert!(session.total_distance_m() >= before);
            }
        }
    }
});
