//! Timer controller.
//!
//! `TimerApp` owns the engine and drives everything around it. Every user
//! command and every scheduler callback follows the same path: mutate the
//! engine, then run the fan-out, persist, and settle the scheduler and the
//! wake lock. Hosts never touch the engine directly.

use std::time::Instant;

use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::events::Event;
use crate::settings::{CountdownThreshold, Settings};
use crate::storage::PersistenceBridge;
use crate::sync::{Channels, SyncFanout, WakeLock};
use crate::theme::Theme;
use crate::timer::{CountdownEngine, Field, TickScheduler, TimerDuration};

/// Minutes added or removed by the quick-adjust buttons.
pub const QUICK_ADJUST_MINUTES: i32 = 5;

pub struct TimerApp {
    engine: CountdownEngine,
    fanout: SyncFanout,
    bridge: PersistenceBridge,
    settings: Settings,
    scheduler: TickScheduler,
    wake_lock: Box<dyn WakeLock>,
    wake_lock_enabled: bool,
    wake_lock_held: bool,
}

impl TimerApp {
    /// Restore state from the bridge and push it to every channel.
    ///
    /// A restored running countdown resumes ticking from `now`.
    pub fn load(bridge: PersistenceBridge, channels: Channels, now: Instant) -> Self {
        let Channels {
            title,
            favicon,
            window,
            audio,
            wake_lock,
        } = channels;

        let engine = bridge.load_engine();
        let settings = bridge.load_settings();
        let theme = bridge.load_theme();
        let mut fanout = SyncFanout::new(title, favicon, window, audio);
        fanout.set_theme(theme, &engine);

        debug!(
            remaining = %engine.remaining(),
            running = engine.is_running(),
            theme = %theme,
            "timer loaded"
        );

        let mut app = Self {
            engine,
            fanout,
            bridge,
            settings,
            scheduler: TickScheduler::new(),
            wake_lock,
            wake_lock_enabled: true,
            wake_lock_held: false,
        };
        app.fanout.sync(&app.engine, None, &app.settings);
        app.settle(now);
        app
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn theme(&self) -> Theme {
        self.fanout.theme()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    pub fn is_wake_lock_held(&self) -> bool {
        self.wake_lock_held
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_armed()
    }

    // ── Engine commands ──────────────────────────────────────────────

    /// Toggle running (start while running pauses).
    pub fn start(&mut self, now: Instant) -> Option<Event> {
        let event = self.engine.start();
        self.after_mutation(event, now)
    }

    pub fn pause(&mut self, now: Instant) -> Option<Event> {
        let event = self.engine.pause();
        self.after_mutation(event, now)
    }

    pub fn reset(&mut self, now: Instant) -> Option<Event> {
        let event = self.engine.reset();
        self.after_mutation(event, now)
    }

    pub fn set_remaining(&mut self, duration: TimerDuration, now: Instant) -> Option<Event> {
        let event = self.engine.set_remaining(duration);
        self.after_mutation(event, now)
    }

    /// Manual entry. Non-numeric fields become zero before clamping.
    pub fn edit_remaining(
        &mut self,
        hours: &str,
        minutes: &str,
        seconds: &str,
        now: Instant,
    ) -> Option<Event> {
        self.set_remaining(TimerDuration::from_input(hours, minutes, seconds), now)
    }

    /// Single-field ±1 edit while stopped.
    pub fn nudge(&mut self, field: Field, delta: i32, now: Instant) -> Option<Event> {
        let nudged = self.engine.remaining().nudge(field, delta);
        self.set_remaining(nudged, now)
    }

    pub fn quick_adjust(&mut self, delta_minutes: i32, now: Instant) -> Option<Event> {
        let event = self.engine.quick_adjust(delta_minutes);
        self.after_mutation(event, now)
    }

    pub fn quick_add(&mut self, now: Instant) -> Option<Event> {
        self.quick_adjust(QUICK_ADJUST_MINUTES, now)
    }

    pub fn quick_subtract(&mut self, now: Instant) -> Option<Event> {
        self.quick_adjust(-QUICK_ADJUST_MINUTES, now)
    }

    pub fn set_repeat(&mut self, repeat: bool, now: Instant) -> Option<Event> {
        let event = self.engine.set_repeat(repeat);
        self.after_mutation(event, now)
    }

    /// Scheduler callback. Applies every tick that came due since the last
    /// call, stopping as soon as the countdown stops. A late batch reaches
    /// the channels once, with a single audible event.
    pub fn on_timer(&mut self, now: Instant) -> Vec<Event> {
        let due = self.scheduler.due(now);
        if due > 1 {
            debug!(due, "catching up on delayed ticks");
        }
        let mut events = Vec::new();
        for _ in 0..due {
            let Some(event) = self.engine.tick() else {
                break;
            };
            events.push(event);
        }
        if !events.is_empty() {
            self.fanout.sync_batch(&self.engine, &events, &self.settings);
            self.bridge.save_engine(&self.engine);
            self.settle(now);
        }
        events
    }

    fn after_mutation(&mut self, event: Option<Event>, now: Instant) -> Option<Event> {
        let event = event?;
        debug!(?event, "engine changed");
        self.fanout.sync(&self.engine, Some(&event), &self.settings);
        self.bridge.save_engine(&self.engine);
        if event.toggles_running() {
            self.scheduler.disarm();
        }
        self.settle(now);
        Some(event)
    }

    /// Bring scheduler and wake lock in line with the running flag.
    fn settle(&mut self, now: Instant) {
        if self.engine.is_running() {
            if !self.scheduler.is_armed() {
                self.scheduler.arm(now);
            }
            self.hold_wake_lock();
        } else {
            self.scheduler.disarm();
            self.drop_wake_lock();
        }
    }

    // ── Wake lock ────────────────────────────────────────────────────

    pub fn set_wake_lock_enabled(&mut self, enabled: bool) {
        self.wake_lock_enabled = enabled;
        if enabled && self.engine.is_running() {
            self.hold_wake_lock();
        } else if !enabled {
            self.drop_wake_lock();
        }
    }

    /// Hosts call this when the surface becomes visible again; a lock that
    /// should be held is reacquired since hosts may drop it while hidden.
    pub fn on_visibility_change(&mut self, visible: bool) {
        if visible && self.wake_lock_held {
            self.wake_lock_held = false;
            self.hold_wake_lock();
        }
    }

    fn hold_wake_lock(&mut self) {
        if !self.wake_lock_enabled || self.wake_lock_held {
            return;
        }
        match self.wake_lock.acquire() {
            Ok(()) => {
                debug!("wake lock acquired");
                self.wake_lock_held = true;
            }
            Err(e) => debug!(channel = "wake_lock", "acquire failed: {e}"),
        }
    }

    fn drop_wake_lock(&mut self) {
        if !self.wake_lock_held {
            return;
        }
        self.wake_lock_held = false;
        if let Err(e) = self.wake_lock.release() {
            warn!(channel = "wake_lock", "release failed: {e}");
        }
    }

    // ── Settings and theme ───────────────────────────────────────────

    pub fn set_theme(&mut self, theme: Theme) {
        self.fanout.set_theme(theme, &self.engine);
        self.bridge.save_theme(theme);
    }

    /// End the neutral favicon phase; call once, `FAVICON_FADE_DELAY` after
    /// load.
    pub fn finish_favicon_fade(&mut self) {
        self.fanout.finish_fade(&self.engine);
    }

    pub fn set_countdown_threshold(&mut self, threshold: CountdownThreshold) {
        self.settings.countdown_threshold = threshold;
        self.bridge.save_settings(&self.settings);
    }

    pub fn submit_custom_threshold(&mut self, input: &str) -> Result<u32, ValidationError> {
        let secs = self.settings.submit_custom_threshold(input)?;
        self.bridge.save_settings(&self.settings);
        Ok(secs)
    }

    pub fn set_alarm_sound(&mut self, id: &str) -> Result<(), ValidationError> {
        self.settings.set_alarm_sound(id)?;
        self.bridge.save_settings(&self.settings);
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.fanout.set_volume(volume);
    }

    /// Preview the selected alarm.
    pub fn test_alarm(&mut self) {
        self.fanout.play_alarm(&self.settings);
    }

    // ── Floating window ──────────────────────────────────────────────

    pub fn floating_supported(&self) -> bool {
        self.fanout.window_supported()
    }

    pub fn open_floating(&mut self) -> bool {
        self.fanout.open_window(&self.engine)
    }

    pub fn close_floating(&mut self) {
        self.fanout.close_window();
    }

    /// Returns whether the window is open afterwards.
    pub fn toggle_floating(&mut self) -> bool {
        if self.fanout.is_window_open() {
            self.fanout.close_window();
            false
        } else {
            self.fanout.open_window(&self.engine)
        }
    }

    /// Release everything the host lent us.
    pub fn shutdown(&mut self) {
        self.close_floating();
        self.drop_wake_lock();
        self.bridge.save_engine(&self.engine);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn app() -> (TimerApp, Instant) {
        let now = Instant::now();
        let app = TimerApp::load(PersistenceBridge::in_memory(), Channels::headless(), now);
        (app, now)
    }

    #[test]
    fn start_arms_and_pause_disarms() {
        let (mut app, now) = app();
        assert!(!app.is_ticking());
        app.start(now);
        assert!(app.is_ticking());
        app.pause(now);
        assert!(!app.is_ticking());
        assert!(app.on_timer(now + Duration::from_secs(3)).is_empty());
        assert_eq!(app.engine().remaining(), TimerDuration::new(0, 15, 0));
    }

    #[test]
    fn scheduler_drives_ticks_and_catches_up() {
        let (mut app, now) = app();
        app.start(now);
        assert_eq!(app.on_timer(now + Duration::from_millis(1100)).len(), 1);
        assert_eq!(app.on_timer(now + Duration::from_millis(4200)).len(), 3);
        assert_eq!(app.engine().remaining(), TimerDuration::new(0, 14, 56));
    }

    #[test]
    fn catch_up_stops_at_completion() {
        let (mut app, now) = app();
        app.set_remaining(TimerDuration::new(0, 0, 3), now);
        app.start(now);
        let events = app.on_timer(now + Duration::from_secs(10));
        assert_eq!(events.len(), 3);
        assert!(events[2].is_completion());
        assert!(!app.engine().is_running());
        assert!(!app.is_ticking());
    }

    #[test]
    fn restart_resets_tick_phase() {
        let (mut app, now) = app();
        app.start(now);
        app.pause(now + Duration::from_millis(700));
        app.start(now + Duration::from_millis(900));
        assert!(app.on_timer(now + Duration::from_millis(1500)).is_empty());
        assert_eq!(app.on_timer(now + Duration::from_millis(1900)).len(), 1);
    }

    #[test]
    fn edit_coerces_garbage() {
        let (mut app, now) = app();
        app.edit_remaining("x", "7", "", now);
        assert_eq!(app.engine().remaining(), TimerDuration::new(0, 7, 0));
        app.nudge(Field::Seconds, -1, now);
        assert_eq!(app.engine().remaining(), TimerDuration::new(0, 7, 0));
        app.nudge(Field::Hours, 1, now);
        assert_eq!(app.engine().remaining(), TimerDuration::new(1, 7, 0));
    }
}
