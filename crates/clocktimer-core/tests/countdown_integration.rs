//! Integration tests for the countdown controller and its channel fan-out.

mod common;

use std::time::{Duration, Instant};

use clocktimer_core::sync::{IDLE_TITLE, TITLE_SUFFIX};
use clocktimer_core::{
    CountdownThreshold, Event, PersistenceBridge, Theme, TimerApp, TimerDuration,
};
use common::{is_alarm, is_cue, Call, Recorder};

fn load(recorder: &Recorder) -> (TimerApp, Instant) {
    let now = Instant::now();
    let app = TimerApp::load(PersistenceBridge::in_memory(), recorder.channels(), now);
    (app, now)
}

/// Drive the app one second at a time until it stops or `limit` runs out.
fn run_seconds(app: &mut TimerApp, start: Instant, limit: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for s in 1..=limit {
        events.extend(app.on_timer(start + Duration::from_secs(s)));
    }
    events
}

#[test]
fn one_hour_countdown_fires_alarm_once() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_remaining(TimerDuration::new(1, 0, 0), now);
    app.start(now);
    recorder.clear();

    let events = run_seconds(&mut app, now, 3605);

    assert_eq!(events.len(), 3600);
    assert_eq!(app.engine().remaining(), TimerDuration::ZERO);
    assert!(!app.engine().is_running());
    assert_eq!(recorder.count(is_alarm), 1);
    assert_eq!(recorder.count(is_cue), 0);
    assert_eq!(recorder.last_title().as_deref(), Some(IDLE_TITLE));
}

#[test]
fn repeat_cycles_without_drift() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_remaining(TimerDuration::new(0, 0, 5), now);
    app.set_repeat(true, now);
    app.start(now);

    let events = run_seconds(&mut app, now, 20);
    let remaining: Vec<u32> = events
        .iter()
        .map(|e| match e {
            Event::TimerTicked { remaining, .. } | Event::TimerCompleted { remaining, .. } => {
                remaining.total_secs()
            }
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    assert_eq!(
        remaining,
        [4, 3, 2, 1, 5, 4, 3, 2, 1, 5, 4, 3, 2, 1, 5, 4, 3, 2, 1, 5]
    );
    assert!(app.engine().is_running());
    assert_eq!(recorder.count(is_alarm), 4);
}

#[test]
fn threshold_cues_then_single_alarm() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_countdown_threshold(CountdownThreshold::Seconds(10));
    app.set_remaining(TimerDuration::new(0, 0, 12), now);
    app.start(now);
    recorder.clear();

    run_seconds(&mut app, now, 15);

    let audio: Vec<Call> = recorder
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Tone(_) | Call::Sound(_)))
        .collect();
    // Ticks starting at 10..=1 cue; the tick starting at 1 also completes.
    let mut expected = vec![Call::Tone(600); 10];
    expected.push(Call::Tone(800));
    assert_eq!(audio, expected);
}

#[test]
fn threshold_covers_final_second() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_countdown_threshold(CountdownThreshold::Seconds(3));
    app.set_remaining(TimerDuration::new(0, 0, 3), now);
    app.start(now);
    recorder.clear();

    run_seconds(&mut app, now, 5);

    assert_eq!(recorder.count(is_cue), 3);
    assert_eq!(recorder.count(is_alarm), 1);
}

#[test]
fn stall_catch_up_plays_one_alarm() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_countdown_threshold(CountdownThreshold::Seconds(5));
    app.set_remaining(TimerDuration::new(0, 0, 5), now);
    app.set_repeat(true, now);
    app.start(now);
    recorder.clear();

    let events = app.on_timer(now + Duration::from_secs(3600));

    assert_eq!(events.len(), 3600);
    assert_eq!(events.iter().filter(|e| e.is_completion()).count(), 720);
    assert_eq!(recorder.count(is_alarm), 1);
    assert_eq!(recorder.count(is_cue), 1);
    assert_eq!(recorder.count(|c| matches!(c, Call::Title(_))), 1);
    assert_eq!(app.engine().remaining(), TimerDuration::new(0, 0, 5));
    assert!(app.engine().is_running());
}

#[test]
fn stall_mid_countdown_cues_once() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_countdown_threshold(CountdownThreshold::Seconds(30));
    app.set_remaining(TimerDuration::new(0, 1, 0), now);
    app.start(now);
    recorder.clear();

    // Ticks starting at 60..=41 are silent, so the batch ends outside the
    // threshold window.
    assert_eq!(app.on_timer(now + Duration::from_secs(20)).len(), 20);
    assert_eq!(recorder.count(is_cue), 0);

    // Ticks starting at 40..=21 end inside it: one cue for the batch.
    assert_eq!(app.on_timer(now + Duration::from_secs(40)).len(), 20);
    assert_eq!(recorder.count(is_cue), 1);
    assert_eq!(recorder.count(is_alarm), 0);
}

#[test]
fn selected_alarm_sound_is_played() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_alarm_sound("chirp").unwrap();
    app.set_remaining(TimerDuration::new(0, 0, 1), now);
    app.start(now);
    run_seconds(&mut app, now, 2);
    assert_eq!(recorder.count(|c| *c == Call::Sound("chirp".into())), 1);
    assert_eq!(recorder.count(|c| *c == Call::Tone(800)), 0);
}

#[test]
fn title_tracks_running_state() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    assert_eq!(recorder.last_title().as_deref(), Some(IDLE_TITLE));

    app.start(now);
    assert_eq!(
        recorder.last_title(),
        Some(format!("15:00{TITLE_SUFFIX}"))
    );
    app.on_timer(now + Duration::from_secs(1));
    assert_eq!(
        recorder.last_title(),
        Some(format!("14:59{TITLE_SUFFIX}"))
    );
    app.pause(now + Duration::from_secs(1));
    assert_eq!(recorder.last_title().as_deref(), Some(IDLE_TITLE));
}

#[test]
fn failing_title_never_stops_the_countdown() {
    let recorder = Recorder::default();
    recorder.fail_title(true);
    let (mut app, now) = load(&recorder);
    app.set_remaining(TimerDuration::new(0, 0, 3), now);
    app.start(now);
    run_seconds(&mut app, now, 3);
    assert!(app.engine().remaining().is_zero());
    assert_eq!(recorder.count(is_alarm), 1);
    assert_eq!(recorder.count(|c| matches!(c, Call::Title(_))), 0);
}

#[test]
fn floating_window_gets_text_per_tick_and_content_on_toggle() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    assert!(app.open_floating());
    app.start(now);
    app.on_timer(now + Duration::from_secs(1));
    app.on_timer(now + Duration::from_secs(2));
    app.pause(now + Duration::from_secs(2));

    let window: Vec<Call> = recorder
        .calls()
        .into_iter()
        .filter(|c| {
            matches!(
                c,
                Call::WindowOpen(_) | Call::WindowText(_) | Call::WindowContent(_)
            )
        })
        .collect();

    assert_eq!(window.len(), 5);
    assert!(matches!(&window[0], Call::WindowOpen(c) if !c.running && c.time == "15:00"));
    assert!(matches!(&window[1], Call::WindowContent(c) if c.running));
    assert_eq!(window[2], Call::WindowText("14:59".into()));
    assert_eq!(window[3], Call::WindowText("14:58".into()));
    assert!(matches!(&window[4], Call::WindowContent(c) if !c.running));
}

#[test]
fn floating_window_close_is_idempotent_and_external_close_is_tolerated() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.open_floating();
    app.close_floating();
    app.close_floating();
    assert_eq!(recorder.count(|c| *c == Call::WindowClose), 1);

    assert!(app.toggle_floating());
    recorder.close_window_externally();
    recorder.clear();
    app.start(now);
    app.on_timer(now + Duration::from_secs(1));
    assert_eq!(
        recorder.count(|c| matches!(c, Call::WindowText(_) | Call::WindowContent(_))),
        0
    );
    app.close_floating();
    assert_eq!(recorder.count(|c| *c == Call::WindowClose), 0);
}

#[test]
fn floating_window_failure_is_isolated() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.open_floating();
    recorder.fail_window(true);
    app.start(now);
    app.on_timer(now + Duration::from_secs(1));
    assert_eq!(
        recorder.last_title(),
        Some(format!("14:59{TITLE_SUFFIX}"))
    );
}

#[test]
fn favicon_starts_neutral_then_fades_to_theme() {
    let recorder = Recorder::default();
    let (mut app, _) = load(&recorder);
    app.set_theme(Theme::Purple);
    app.finish_favicon_fade();
    app.finish_favicon_fade();
    app.set_theme(Theme::Yellow);

    let favicon: Vec<Call> = recorder
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Favicon(_)))
        .collect();
    assert_eq!(
        favicon,
        [
            Call::Favicon("#ffffff".into()),
            Call::Favicon("#a855f7".into()),
            Call::Favicon("#ffd700".into()),
        ]
    );
}

#[test]
fn wake_lock_follows_running_and_reacquires_on_visibility() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.start(now);
    assert!(app.is_wake_lock_held());
    app.on_visibility_change(false);
    app.on_visibility_change(true);
    app.pause(now);
    assert!(!app.is_wake_lock_held());
    app.on_visibility_change(true);

    let wake: Vec<Call> = recorder
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::WakeAcquire | Call::WakeRelease))
        .collect();
    assert_eq!(
        wake,
        [Call::WakeAcquire, Call::WakeAcquire, Call::WakeRelease]
    );
}

#[test]
fn edits_are_rejected_while_running_but_controls_remain() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.start(now);
    assert!(app.quick_add(now).is_none());
    assert!(app.edit_remaining("1", "0", "0", now).is_none());
    assert!(app.pause(now).is_some());
    assert!(app.quick_add(now).is_some());
    assert_eq!(app.engine().remaining(), TimerDuration::new(0, 20, 0));
    assert!(app.reset(now).is_some());
    assert_eq!(app.engine().remaining(), TimerDuration::new(0, 15, 0));
}

#[test]
fn reset_after_ticks_restores_initial() {
    let recorder = Recorder::default();
    let (mut app, now) = load(&recorder);
    app.set_remaining(TimerDuration::new(0, 2, 0), now);
    app.start(now);
    run_seconds(&mut app, now, 77);
    app.reset(now + Duration::from_secs(77));
    assert_eq!(app.engine().remaining(), TimerDuration::new(0, 2, 0));
    assert!(!app.engine().is_running());
    assert!(app.on_timer(now + Duration::from_secs(90)).is_empty());
}
