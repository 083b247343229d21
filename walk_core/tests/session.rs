use std::time::{Duration, Instant};

use rstest::rstest;
use walk_core::error::{BuildError, WalkError};
use walk_core::mocks::{
    ProviderCall, RecordingDisplay, RecordingProvider, RecordingTimer, TimerCall,
};
use walk_core::{
    HoldingRule, RejectReason, RouteOverlay, SampleOutcome, SessionStats, WalkCfg, WalkEvent,
    WalkSession, WalkSessionBuilder, WalkState,
};
use walk_traits::{Coordinate, ManualClock, PositionSample};

const BASE: Coordinate = Coordinate::new(52.37, 4.89);

type Session = WalkSession<RecordingProvider, RecordingTimer, RecordingDisplay>;

struct Rig {
    session: Session,
    provider: RecordingProvider,
    timer: RecordingTimer,
    display: RecordingDisplay,
    clock: ManualClock,
}

impl Rig {
    fn new(cfg: WalkCfg) -> Self {
        let provider = RecordingProvider::new();
        let timer = RecordingTimer::new();
        let display = RecordingDisplay::new();
        let clock = ManualClock::new();
        let session = WalkSessionBuilder::new()
            .with_provider(provider.clone())
            .with_timer(timer.clone())
            .with_display(display.clone())
            .with_config(cfg)
            .with_clock(Box::new(clock.clone()))
            .build()
            .expect("valid session");
        Self {
            session,
            provider,
            timer,
            display,
            clock,
        }
    }

    fn at(&self, t_s: f64) -> Instant {
        self.clock.origin() + Duration::from_secs_f64(t_s)
    }

    /// A fix `north_m` north of BASE, recorded at `t_s` and delivered right then.
    fn feed(&mut self, t_s: f64, north_m: f64, accuracy_m: f64, speed_mps: f64) -> SampleOutcome {
        let ts = self.at(t_s);
        self.clock.advance_to(ts);
        let s = PositionSample::new(BASE.offset_by_meters(north_m, 0.0), accuracy_m, ts, speed_mps);
        self.session.on_sample(s)
    }

    fn origin_events(&self) -> usize {
        self.display
            .events()
            .iter()
            .filter(|e| matches!(e, WalkEvent::OriginEstablished { .. }))
            .count()
    }
}

fn started(cfg: WalkCfg) -> Rig {
    let mut rig = Rig::new(cfg);
    rig.session.start();
    rig
}

#[test]
fn fixes_are_ignored_before_start() {
    let mut rig = Rig::new(WalkCfg::default());
    assert_eq!(rig.session.state(), WalkState::Idle);
    assert_eq!(rig.feed(1.0, 0.0, 5.0, 1.0), SampleOutcome::Ignored);
    assert_eq!(rig.session.buffered_len(), 0);
    assert!(rig.display.events().is_empty());
}

#[test]
fn start_requests_continuous_sampling_and_keepalive() {
    let rig = started(WalkCfg::default());
    assert_eq!(rig.session.state(), WalkState::Walking);
    assert_eq!(
        rig.provider.calls(),
        vec![ProviderCall::StartContinuous {
            min_distance_m: 0.0,
            min_interval: Duration::ZERO
        }]
    );
    assert_eq!(rig.timer.current_period(), Some(Duration::from_secs(10)));
}

#[test]
fn walk_of_fifty_meters_end_to_end() {
    let mut rig = started(WalkCfg::default());
    assert_eq!(rig.feed(1.0, 0.0, 5.0, 1.2), SampleOutcome::Bootstrapped);
    assert!(rig.display.events().is_empty());

    let outcome = rig.feed(5.0, 50.0, 5.0, 1.2);
    let SampleOutcome::Advanced { delta_m, total_m } = outcome else {
        panic!("expected advance, got {outcome:?}");
    };
    assert!((delta_m - 50.0).abs() < 0.05, "delta {delta_m}");
    assert!((total_m - 50.0).abs() < 0.05, "total {total_m}");

    let b = BASE.offset_by_meters(50.0, 0.0);
    let events = rig.display.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], WalkEvent::OriginEstablished { origin: b });
    match events[1] {
        WalkEvent::DistanceUpdated { total_m, recenter } => {
            assert!((total_m - 50.0).abs() < 0.05);
            assert_eq!(recenter, BASE);
        }
        ref other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        events[2],
        WalkEvent::Waypoint {
            generation: rig.session.generation(),
            origin: b,
            current: b
        }
    );

    rig.session.stop();
    assert_eq!(rig.session.state(), WalkState::Idle);
    assert!(rig.session.start_time().is_none());
    assert!((rig.session.total_distance_m() - 50.0).abs() < 0.05);
    assert_eq!(rig.provider.calls().last(), Some(&ProviderCall::StopContinuous));
}

#[rstest]
#[case(25.0, RejectReason::Inaccurate)]
#[case(20.5, RejectReason::Inaccurate)]
#[case(-1.0, RejectReason::UnknownAccuracy)]
#[case(f64::NAN, RejectReason::UnknownAccuracy)]
fn poor_accuracy_is_rejected(#[case] accuracy_m: f64, #[case] reason: RejectReason) {
    let mut rig = started(WalkCfg::default());
    rig.feed(1.0, 0.0, 5.0, 1.0);
    assert_eq!(
        rig.feed(5.0, 50.0, accuracy_m, 1.0),
        SampleOutcome::Rejected(reason)
    );
    assert_eq!(rig.session.buffered_len(), 1);
    assert_eq!(rig.session.total_distance_m(), 0.0);
    assert!(rig.session.origin().is_none());
    assert!(rig.display.events().is_empty());
    assert_eq!(rig.session.stats().rejected, 1);
}

#[test]
fn accuracy_at_threshold_is_accepted() {
    let mut rig = started(WalkCfg::default());
    rig.feed(1.0, 0.0, 5.0, 1.0);
    assert!(matches!(
        rig.feed(5.0, 10.0, 20.0, 1.0),
        SampleOutcome::Advanced { .. }
    ));
}

#[test]
fn fix_from_before_start_is_rejected() {
    let mut rig = Rig::new(WalkCfg::default());
    rig.clock.advance(Duration::from_secs(10));
    rig.session.start();
    let early = rig.at(9.0);
    let fix = |north_m| PositionSample::new(BASE.offset_by_meters(north_m, 0.0), 5.0, early, 1.0);
    assert_eq!(rig.session.on_sample(fix(0.0)), SampleOutcome::Bootstrapped);
    assert_eq!(
        rig.session.on_sample(fix(30.0)),
        SampleOutcome::Rejected(RejectReason::BeforeSessionStart)
    );
}

#[test]
fn non_finite_coordinates_are_rejected() {
    let mut rig = started(WalkCfg::default());
    let ts = rig.at(1.0);
    let bad = PositionSample::new(Coordinate::new(f64::NAN, 4.89), 5.0, ts, 1.0);
    assert_eq!(
        rig.session.on_sample(bad),
        SampleOutcome::Rejected(RejectReason::InvalidCoordinate)
    );
    assert_eq!(rig.session.buffered_len(), 0);
}

#[test]
fn origin_is_established_once_per_walk() {
    let mut rig = started(WalkCfg::default());
    rig.feed(1.0, 0.0, 5.0, 1.2);
    for i in 1..6u32 {
        rig.feed(1.0 + 2.0 * f64::from(i), 10.0 * f64::from(i), 5.0, 1.2);
    }
    assert_eq!(rig.origin_events(), 1);
    let total = rig.session.total_distance_m();
    assert!((total - 50.0).abs() < 0.1, "total {total}");
    assert_eq!(rig.session.buffered_len(), 5);
}

#[test]
fn stop_then_start_resets_the_walk() {
    let mut rig = started(WalkCfg::default());
    rig.feed(1.0, 0.0, 5.0, 1.2);
    rig.feed(5.0, 50.0, 5.0, 1.2);
    let first_generation = rig.session.generation();
    rig.session.stop();
    rig.session.start();

    assert_eq!(rig.session.state(), WalkState::Walking);
    assert_eq!(rig.session.total_distance_m(), 0.0);
    assert_eq!(rig.session.buffered_len(), 0);
    assert!(rig.session.origin().is_none());
    assert!(rig.session.last_recorded().is_none());
    assert_eq!(rig.session.stats(), SessionStats::default());
    assert!(rig.session.generation() > first_generation);
    assert_eq!(rig.feed(6.0, 60.0, 5.0, 1.2), SampleOutcome::Bootstrapped);
}

#[test]
fn stop_is_safe_in_any_state() {
    let mut rig = Rig::new(WalkCfg::default());
    rig.session.stop();
    rig.session.stop();
    assert_eq!(rig.session.state(), WalkState::Idle);
    assert_eq!(rig.session.total_distance_m(), 0.0);
}

/// Walks 10 m, then stands still until past the allowed wait.
fn stand_still(rig: &mut Rig, speeds: [f64; 3]) -> SampleOutcome {
    rig.feed(1.0, 0.0, 5.0, speeds[0]);
    rig.feed(2.0, 10.0, 5.0, speeds[1]);
    rig.feed(62.0, 11.0, 5.0, speeds[2])
}

#[test]
fn standing_still_switches_to_holding() {
    let cfg = WalkCfg {
        recheck_interval: Duration::from_secs(30),
        ..WalkCfg::default()
    };
    let mut rig = started(cfg);
    assert_eq!(stand_still(&mut rig, [0.5, 0.5, 0.3]), SampleOutcome::Holding);

    assert_eq!(rig.session.state(), WalkState::Holding);
    assert!((rig.session.total_distance_m() - 10.0).abs() < 0.05);
    assert_eq!(rig.session.start_time(), Some(rig.at(62.0)));
    assert_eq!(rig.timer.current_period(), Some(Duration::from_secs(30)));
    let calls = rig.provider.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[ProviderCall::StopContinuous, ProviderCall::Single]
    );
    assert_eq!(rig.session.stats().holds, 1);
}

#[test]
fn not_long_enough_keeps_walking() {
    let mut rig = started(WalkCfg::default());
    rig.feed(1.0, 0.0, 5.0, 0.2);
    rig.feed(2.0, 10.0, 5.0, 0.2);
    // within 3 m but only 40 s into the walk
    assert!(matches!(
        rig.feed(40.0, 11.0, 5.0, 0.2),
        SampleOutcome::Advanced { .. }
    ));
    assert_eq!(rig.session.state(), WalkState::Walking);
}

#[rstest]
#[case(HoldingRule::EveryBuffered, [2.0, 0.5, 0.3], SampleOutcome::Stationary)]
#[case(HoldingRule::LastBuffered, [2.0, 0.5, 0.3], SampleOutcome::Holding)]
#[case(HoldingRule::EveryBuffered, [0.5, 0.5, 1.4], SampleOutcome::Stationary)]
#[case(HoldingRule::LastBuffered, [0.5, 0.5, 1.4], SampleOutcome::Stationary)]
#[case(HoldingRule::EveryBuffered, [-1.0, -1.0, -1.0], SampleOutcome::Holding)]
fn holding_rule_decides_on_speed(
    #[case] rule: HoldingRule,
    #[case] speeds: [f64; 3],
    #[case] expected: SampleOutcome,
) {
    let cfg = WalkCfg {
        holding_rule: rule,
        ..WalkCfg::default()
    };
    let mut rig = started(cfg);
    assert_eq!(stand_still(&mut rig, speeds), expected);
    if expected == SampleOutcome::Stationary {
        assert_eq!(rig.session.state(), WalkState::Walking);
        assert!((rig.session.total_distance_m() - 10.0).abs() < 0.05);
    }
}

#[test]
fn accepted_fix_while_holding_resumes_walk() {
    let cfg = WalkCfg {
        recheck_interval: Duration::from_secs(30),
        ..WalkCfg::default()
    };
    let mut rig = started(cfg);
    stand_still(&mut rig, [0.5, 0.5, 0.3]);
    assert_eq!(rig.session.state(), WalkState::Holding);

    // older than the hold start
    let stale = PositionSample::new(BASE, 5.0, rig.at(61.0), 0.2);
    assert_eq!(
        rig.session.on_sample(stale),
        SampleOutcome::Rejected(RejectReason::BeforeSessionStart)
    );
    assert_eq!(rig.session.state(), WalkState::Holding);

    let outcome = rig.feed(70.0, 31.0, 5.0, 1.3);
    let SampleOutcome::Advanced { delta_m, total_m } = outcome else {
        panic!("expected advance, got {outcome:?}");
    };
    assert!((delta_m - 21.0).abs() < 0.05, "delta {delta_m}");
    assert!((total_m - 31.0).abs() < 0.1, "total {total_m}");
    assert_eq!(rig.session.state(), WalkState::Walking);
    assert_eq!(rig.session.stats().resumes, 1);
    assert_eq!(rig.timer.current_period(), Some(Duration::from_secs(10)));
    assert!(matches!(
        rig.provider.calls().last(),
        Some(ProviderCall::StartContinuous { .. })
    ));
}

#[test]
fn stop_while_holding_restores_keepalive() {
    let cfg = WalkCfg {
        recheck_interval: Duration::from_secs(30),
        ..WalkCfg::default()
    };
    let mut rig = started(cfg);
    stand_still(&mut rig, [0.5, 0.5, 0.3]);
    rig.session.stop();
    assert_eq!(rig.session.state(), WalkState::Idle);
    assert_eq!(rig.timer.current_period(), Some(Duration::from_secs(10)));
}

#[test]
fn no_cadence_until_first_start() {
    let mut rig = Rig::new(WalkCfg::default());
    assert!(rig.timer.calls().is_empty());
    rig.session.start();
    assert_eq!(rig.timer.calls(), vec![TimerCall::Schedule(Duration::from_secs(10))]);
}

#[rstest]
#[case(false)]
#[case(true)]
fn close_ends_walk_and_cancels_cadence(#[case] holding: bool) {
    let mut rig = started(WalkCfg::default());
    if holding {
        stand_still(&mut rig, [0.5, 0.5, 0.3]);
        assert_eq!(rig.session.state(), WalkState::Holding);
    } else {
        rig.feed(1.0, 0.0, 5.0, 1.4);
        rig.feed(3.0, 4.0, 5.0, 1.4);
        rig.feed(5.0, 8.0, 5.0, 1.4);
    }
    let total = rig.session.total_distance_m();

    rig.session.close();
    assert_eq!(rig.session.state(), WalkState::Idle);
    assert_eq!(rig.session.total_distance_m(), total);
    assert_eq!(rig.timer.calls().last(), Some(&TimerCall::Cancel));
    assert_eq!(rig.timer.current_period(), None);
    assert!(matches!(
        rig.provider.calls().last(),
        Some(ProviderCall::StopContinuous)
    ));
}

#[test]
fn tick_requests_a_single_fix_in_every_state() {
    let mut rig = Rig::new(WalkCfg::default());
    rig.session.on_tick();
    rig.session.start();
    rig.session.on_tick();
    assert_eq!(
        rig.provider
            .calls()
            .iter()
            .filter(|c| **c == ProviderCall::Single)
            .count(),
        2
    );
}

#[test]
fn provider_failure_does_not_touch_totals() {
    let mut rig = Rig::new(WalkCfg::default());
    rig.provider.set_failing(true);
    rig.session.start();
    assert_eq!(
        rig.session.last_collaborator_error(),
        Some(&WalkError::PermissionDenied)
    );
    rig.feed(1.0, 0.0, 5.0, 1.2);
    rig.feed(5.0, 50.0, 5.0, 1.2);
    assert!((rig.session.total_distance_m() - 50.0).abs() < 0.05);
    assert_eq!(rig.session.state(), WalkState::Walking);
}

#[test]
fn display_failure_does_not_touch_totals() {
    let mut rig = started(WalkCfg::default());
    rig.display.set_failing(true);
    rig.feed(1.0, 0.0, 5.0, 1.2);
    rig.feed(5.0, 50.0, 5.0, 1.2);
    assert!((rig.session.total_distance_m() - 50.0).abs() < 0.05);
    assert_eq!(rig.display.events().len(), 3);
    assert_eq!(
        rig.session.last_collaborator_error(),
        Some(&WalkError::Display("map view unavailable".into()))
    );
}

#[test]
fn routes_from_previous_walks_are_discarded() {
    let mut rig = started(WalkCfg::default());
    let generation = rig.session.generation();
    let route = RouteOverlay {
        generation,
        path: vec![BASE, BASE.offset_by_meters(50.0, 0.0)],
    };
    assert!(rig.session.deliver_route(&route));
    rig.session.stop();
    assert!(!rig.session.deliver_route(&route));
    rig.session.start();
    assert!(!rig.session.deliver_route(&route));
    assert_eq!(rig.display.routes(), vec![route]);
}

#[rstest]
#[case(WalkCfg { buffer_capacity: 0, ..WalkCfg::default() })]
#[case(WalkCfg { required_accuracy_m: 0.0, ..WalkCfg::default() })]
#[case(WalkCfg { valid_time_interval: Duration::ZERO, ..WalkCfg::default() })]
#[case(WalkCfg { valid_distance_m: f64::NAN, ..WalkCfg::default() })]
#[case(WalkCfg { holding_speed_mps: -1.0, ..WalkCfg::default() })]
#[case(WalkCfg { recheck_interval: Duration::ZERO, ..WalkCfg::default() })]
fn invalid_config_is_a_typed_build_error(#[case] cfg: WalkCfg) {
    let err = WalkSessionBuilder::new()
        .with_provider(RecordingProvider::new())
        .with_timer(RecordingTimer::new())
        .with_display(RecordingDisplay::new())
        .with_config(cfg)
        .build()
        .expect_err("invalid config");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}
