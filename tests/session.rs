// Native tests for the heartbeat session state machine. Timer cadences are
// simulated by calling the tick methods on their real schedule (rise every
// 500 ms, sync one-shot at 5000 ms, decay every 300 ms).

use lovebeat::emotion::EmotionalState;
use lovebeat::session::{
    FixedStep, HeartbeatSession, MAX_BPM, Phase, REST_BPM, RISE_STEP_MAX, RISE_STEP_MIN,
    StepSource,
};

fn session_with_step(step: f64) -> HeartbeatSession {
    HeartbeatSession::new(Box::new(FixedStep(step)))
}

// Drive a full hold of `ms` milliseconds: rise ticks every 500 ms and the
// sync one-shot at 5000 ms if the hold lasts that long.
fn hold_for(s: &mut HeartbeatSession, ms: f64) {
    s.start(0.0);
    let mut t = 0.0;
    while t + 500.0 <= ms {
        t += 500.0;
        if t >= 5000.0 && !s.is_synced() && (t - 500.0) < 5000.0 {
            s.sync_fire();
        }
        s.rise_tick(t);
    }
    if ms >= 5000.0 && !s.is_synced() {
        s.sync_fire();
    }
}

#[test]
fn starts_idle_at_resting_rate() {
    let s = session_with_step(4.0);
    let v = s.view();
    assert_eq!(s.phase(), Phase::Idle);
    assert_eq!(v.bpm, REST_BPM);
    assert!(!v.is_active);
    assert!(!v.is_synced);
    assert_eq!(v.touch_duration_s, 0.0);
    assert_eq!(v.emotional_state, EmotionalState::Calm);
    assert_eq!(v.beat_interval_ms, 1000.0);
}

#[test]
fn short_hold_never_synchronizes() {
    // Any hold under five seconds stays unsynchronized, through release too.
    for ms in [0.0, 900.0, 2500.0, 4500.0] {
        let mut s = session_with_step(5.0);
        hold_for(&mut s, ms);
        assert!(!s.is_synced(), "synced after {ms} ms hold");
        s.stop();
        assert!(!s.is_synced(), "synced after releasing a {ms} ms hold");
    }
}

#[test]
fn sustained_hold_synchronizes_once() {
    let mut s = session_with_step(5.0);
    hold_for(&mut s, 6000.0);
    assert!(s.is_synced());
    assert_eq!(s.phase(), Phase::Synced);
    // A second fire (stale timer) changes nothing.
    s.sync_fire();
    assert!(s.is_synced());
    assert_eq!(s.phase(), Phase::Synced);
}

#[test]
fn sync_fire_after_release_is_ignored() {
    // Release at 4.5 s; a one-shot that slipped past cancellation must not
    // mark a decaying session as synced.
    let mut s = session_with_step(5.0);
    hold_for(&mut s, 4500.0);
    s.stop();
    s.sync_fire();
    assert!(!s.is_synced());
    assert_eq!(s.phase(), Phase::Decaying);
}

#[test]
fn bpm_never_exceeds_ceiling() {
    // Even at the maximum step, a long hold pins at the ceiling.
    let mut s = session_with_step(RISE_STEP_MAX);
    s.start(0.0);
    for i in 1..=200 {
        s.rise_tick(i as f64 * 500.0);
        assert!(s.bpm() <= MAX_BPM, "bpm {} above ceiling", s.bpm());
    }
    assert_eq!(s.bpm(), MAX_BPM);
}

#[test]
fn bpm_never_drops_below_resting_floor() {
    let mut s = session_with_step(3.0);
    hold_for(&mut s, 2000.0);
    assert!(s.stop());
    loop {
        let done = s.decay_tick();
        assert!(s.bpm() >= REST_BPM, "bpm {} below floor mid-decay", s.bpm());
        if done {
            break;
        }
    }
    assert_eq!(s.bpm(), REST_BPM);
}

#[test]
fn decay_is_monotone_and_terminates_at_rest() {
    let mut s = session_with_step(RISE_STEP_MAX);
    hold_for(&mut s, 10_000.0);
    assert_eq!(s.bpm(), MAX_BPM);
    assert!(s.stop());
    assert_eq!(s.phase(), Phase::Decaying);
    assert!(!s.is_active());

    let mut prev = s.bpm();
    let mut ticks = 0;
    while !s.decay_tick() {
        assert!(s.bpm() < prev, "decay not monotone");
        prev = s.bpm();
        ticks += 1;
        assert!(ticks < 100, "decay never terminated");
    }
    assert_eq!(s.bpm(), REST_BPM);
    assert_eq!(s.phase(), Phase::Idle);
    assert!(!s.is_active());
    assert!(!s.is_synced());

    // Ticks after reaching idle mutate nothing and keep reporting done.
    assert!(s.decay_tick());
    assert_eq!(s.bpm(), REST_BPM);
    assert_eq!(s.phase(), Phase::Idle);
}

#[test]
fn synced_flag_clears_when_decay_completes() {
    let mut s = session_with_step(5.0);
    hold_for(&mut s, 6000.0);
    assert!(s.is_synced());
    s.stop();
    // Synced survives into the decay and clears on reaching rest.
    assert!(s.is_synced());
    while !s.decay_tick() {}
    assert!(!s.is_synced());
}

#[test]
fn stop_is_idempotent() {
    let mut s = session_with_step(5.0);
    hold_for(&mut s, 2000.0);
    assert!(s.stop());
    // The second release must not request a second decay loop.
    assert!(!s.stop());
    let bpm_after_one_tick = {
        s.decay_tick();
        s.bpm()
    };
    // Four rise ticks reached 80; exactly one decrement per tick: 80 - 5.
    assert_eq!(bpm_after_one_tick, 75.0);
}

#[test]
fn stop_when_idle_is_a_no_op() {
    let mut s = session_with_step(4.0);
    assert!(!s.stop());
    assert_eq!(s.phase(), Phase::Idle);
    assert_eq!(s.bpm(), REST_BPM);
}

#[test]
fn rise_tick_when_idle_is_a_no_op() {
    let mut s = session_with_step(RISE_STEP_MAX);
    s.rise_tick(500.0);
    assert_eq!(s.bpm(), REST_BPM);
    assert_eq!(s.view().touch_duration_s, 0.0);
}

#[test]
fn touch_duration_tracks_the_hold() {
    let mut s = session_with_step(3.0);
    s.start(1000.0);
    s.rise_tick(1500.0);
    assert_eq!(s.view().touch_duration_s, 0.5);
    s.rise_tick(4000.0);
    assert_eq!(s.view().touch_duration_s, 3.0);
}

#[test]
fn restart_while_active_begins_a_fresh_cycle() {
    let mut s = session_with_step(6.0);
    hold_for(&mut s, 6000.0);
    assert!(s.is_synced());
    assert!(s.bpm() > REST_BPM);

    s.start(20_000.0);
    let v = s.view();
    assert_eq!(s.phase(), Phase::Rising);
    assert_eq!(v.bpm, REST_BPM);
    assert!(!v.is_synced);
    assert_eq!(v.touch_duration_s, 0.0);
}

#[test]
fn reset_returns_to_defaults_from_any_phase() {
    let checks: [&dyn Fn(&mut HeartbeatSession); 3] = [
        &|s| hold_for(s, 2000.0),
        &|s| hold_for(s, 6000.0),
        &|s| {
            hold_for(s, 6000.0);
            s.stop();
            s.decay_tick();
        },
    ];
    for arrange in checks {
        let mut s = session_with_step(5.0);
        arrange(&mut s);
        s.reset();
        let v = s.view();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(v.bpm, REST_BPM);
        assert!(!v.is_active);
        assert!(!v.is_synced);
        assert_eq!(v.touch_duration_s, 0.0);
        assert_eq!(v.emotional_state, EmotionalState::Calm);
        // Queued callbacks that fire after the reset must not move anything.
        s.rise_tick(99_000.0);
        s.sync_fire();
        assert!(s.decay_tick());
        assert_eq!(s.view(), v);
    }
}

#[test]
fn rise_step_is_clamped_to_its_bounds() {
    struct WildStep(f64);
    impl StepSource for WildStep {
        fn next_step(&mut self) -> f64 {
            self.0
        }
    }

    let mut low = HeartbeatSession::new(Box::new(WildStep(-50.0)));
    low.start(0.0);
    low.rise_tick(500.0);
    assert_eq!(low.bpm(), REST_BPM + RISE_STEP_MIN);

    let mut high = HeartbeatSession::new(Box::new(WildStep(1000.0)));
    high.start(0.0);
    high.rise_tick(500.0);
    assert_eq!(high.bpm(), REST_BPM + RISE_STEP_MAX);
}

#[test]
fn beat_interval_is_derived_from_bpm() {
    let mut s = session_with_step(5.0);
    s.start(0.0);
    for i in 1..=4 {
        s.rise_tick(i as f64 * 500.0);
    }
    // 60 + 4 * 5 = 80 bpm -> 750 ms between beats.
    assert_eq!(s.bpm(), 80.0);
    assert_eq!(s.view().beat_interval_ms, 750.0);
}
