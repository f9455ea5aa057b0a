use std::time::Duration;

use tracing::{debug, warn};

use super::{AudioPlayer, FaviconSink, FloatingContent, FloatingWindow, TitleSink, WindowHandle};
use crate::events::Event;
use crate::settings::Settings;
use crate::sound::{Tone, DEFAULT_SOUND_ID};
use crate::theme::{Theme, NEUTRAL_COLOR, NEUTRAL_DARK_COLOR};
use crate::timer::CountdownEngine;

/// Appended to the remaining time while running.
pub const TITLE_SUFFIX: &str = " - ClockTimer";
/// Shown while stopped.
pub const IDLE_TITLE: &str = "Countdown Timer | ClockTimer";
/// How long the favicon stays neutral after load before fading in.
pub const FAVICON_FADE_DELAY: Duration = Duration::from_millis(100);

/// Pushes engine state to every presentation channel.
///
/// Each channel is updated independently: an error from one is logged and
/// never prevents the others from being updated.
pub struct SyncFanout {
    title: Box<dyn TitleSink>,
    favicon: Box<dyn FaviconSink>,
    window: Box<dyn FloatingWindow>,
    audio: Box<dyn AudioPlayer>,
    window_handle: Option<WindowHandle>,
    theme: Theme,
    faded_in: bool,
    /// Last color pushed to the favicon.
    favicon_color: Option<&'static str>,
    volume: f32,
}

impl SyncFanout {
    pub fn new(
        title: Box<dyn TitleSink>,
        favicon: Box<dyn FaviconSink>,
        window: Box<dyn FloatingWindow>,
        audio: Box<dyn AudioPlayer>,
    ) -> Self {
        Self {
            title,
            favicon,
            window,
            audio,
            window_handle: None,
            theme: Theme::default(),
            faded_in: false,
            favicon_color: None,
            volume: 1.0,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Primary and dark colors currently on display. Neutral until the
    /// initial fade completes.
    pub fn display_colors(&self) -> (&'static str, &'static str) {
        if self.faded_in {
            (self.theme.primary(), self.theme.dark())
        } else {
            (NEUTRAL_COLOR, NEUTRAL_DARK_COLOR)
        }
    }

    /// Run every channel against the engine's current state.
    ///
    /// `event` is the change that triggered this sync, if any; it drives the
    /// audible cues and full floating-window refreshes.
    pub fn sync(&mut self, engine: &CountdownEngine, event: Option<&Event>, settings: &Settings) {
        let events = match event {
            Some(event) => std::slice::from_ref(event),
            None => &[],
        };
        self.sync_batch(engine, events, settings);
    }

    /// Like [`sync`](Self::sync) for several events applied back to back.
    ///
    /// Channels are pushed once and at most one audible event plays: the
    /// last completion in the batch, otherwise the last event.
    pub fn sync_batch(&mut self, engine: &CountdownEngine, events: &[Event], settings: &Settings) {
        self.sync_title(engine);
        self.sync_favicon();
        self.sync_window(engine, events.iter().any(Event::toggles_running));
        let audible = events
            .iter()
            .rev()
            .find(|e| e.is_completion())
            .or(events.last());
        if let Some(event) = audible {
            self.sync_audio(event, settings);
        }
    }

    fn sync_title(&mut self, engine: &CountdownEngine) {
        let title = if engine.is_running() {
            format!("{}{TITLE_SUFFIX}", engine.formatted())
        } else {
            IDLE_TITLE.to_string()
        };
        if let Err(e) = self.title.set_title(&title) {
            warn!(channel = "title", "update failed: {e}");
        }
    }

    fn sync_favicon(&mut self) {
        let (color, _) = self.display_colors();
        if self.favicon_color == Some(color) {
            return;
        }
        match self.favicon.recolor(color) {
            Ok(()) => self.favicon_color = Some(color),
            Err(e) => warn!(channel = "favicon", "recolor failed: {e}"),
        }
    }

    fn sync_window(&mut self, engine: &CountdownEngine, full: bool) {
        let Some(handle) = self.live_window() else {
            return;
        };
        let result = if full {
            let content = self.window_content(engine);
            self.window.update_content(handle, &content)
        } else {
            self.window.update_text(handle, &engine.formatted())
        };
        if let Err(e) = result {
            warn!(channel = "floating_window", "update failed: {e}");
        }
    }

    fn sync_audio(&mut self, event: &Event, settings: &Settings) {
        match event {
            Event::TimerCompleted { before_secs, .. } => {
                if settings.countdown_threshold.covers(*before_secs) {
                    self.play_countdown_cue();
                }
                self.play_alarm(settings);
            }
            Event::TimerTicked { before_secs, .. } => {
                if settings.countdown_threshold.covers(*before_secs) {
                    self.play_countdown_cue();
                }
            }
            _ => {}
        }
    }

    /// Play the configured alarm, falling back to the synthesized tone.
    pub fn play_alarm(&mut self, settings: &Settings) {
        let sound = settings.alarm_sound_id.as_str();
        if sound != DEFAULT_SOUND_ID {
            match self.audio.play(sound, self.volume) {
                Ok(()) => return,
                Err(e) => debug!(channel = "audio", "'{sound}' unavailable, using tone: {e}"),
            }
        }
        if let Err(e) = self.audio.play_tone(Tone::ALARM) {
            warn!(channel = "audio", "alarm tone failed: {e}");
        }
    }

    fn play_countdown_cue(&mut self) {
        if let Err(e) = self.audio.play_tone(Tone::COUNTDOWN) {
            debug!(channel = "audio", "countdown cue failed: {e}");
        }
    }

    // ── Theme and favicon fade ───────────────────────────────────────

    /// Switch theme. Recolors the favicon (once faded in) and repaints an
    /// open floating window.
    pub fn set_theme(&mut self, theme: Theme, engine: &CountdownEngine) {
        self.theme = theme;
        self.sync_favicon();
        self.sync_window(engine, true);
    }

    /// End the neutral start-up phase. Idempotent.
    pub fn finish_fade(&mut self, engine: &CountdownEngine) {
        if self.faded_in {
            return;
        }
        self.faded_in = true;
        self.sync_favicon();
        self.sync_window(engine, true);
    }

    // ── Floating window ──────────────────────────────────────────────

    pub fn window_supported(&self) -> bool {
        self.window.is_supported()
    }

    pub fn is_window_open(&mut self) -> bool {
        self.live_window().is_some()
    }

    /// Open the floating window. Returns whether a window is open
    /// afterwards. Unsupported hosts get `false` and nothing is logged.
    pub fn open_window(&mut self, engine: &CountdownEngine) -> bool {
        if self.live_window().is_some() {
            return true;
        }
        if !self.window.is_supported() {
            return false;
        }
        let content = self.window_content(engine);
        match self.window.open(&content) {
            Ok(handle) => {
                self.window_handle = Some(handle);
                true
            }
            Err(e) => {
                warn!(channel = "floating_window", "open failed: {e}");
                false
            }
        }
    }

    /// Close the floating window. Safe to call when nothing is open.
    pub fn close_window(&mut self) {
        if let Some(handle) = self.window_handle.take() {
            if let Err(e) = self.window.close(handle) {
                debug!(channel = "floating_window", "close failed: {e}");
            }
        }
    }

    /// Current handle, dropping it if the window was closed externally.
    fn live_window(&mut self) -> Option<WindowHandle> {
        let handle = self.window_handle?;
        if self.window.is_open(handle) {
            Some(handle)
        } else {
            debug!(channel = "floating_window", "window closed externally");
            self.window_handle = None;
            None
        }
    }

    fn window_content(&self, engine: &CountdownEngine) -> FloatingContent {
        let (primary, dark) = self.display_colors();
        FloatingContent {
            time: engine.formatted(),
            running: engine.is_running(),
            primary_color: primary.to_string(),
            dark_color: dark.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ChannelError;
    use crate::settings::CountdownThreshold;
    use crate::sync::Unsupported;
    use crate::timer::TimerDuration;

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<String>>>);

    impl Log {
        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    struct FailingTitle;

    impl TitleSink for FailingTitle {
        fn set_title(&mut self, _title: &str) -> Result<(), ChannelError> {
            Err(ChannelError::failed("title", "boom"))
        }
    }

    struct RecordingFavicon(Rc<RefCell<Vec<String>>>);

    impl FaviconSink for RecordingFavicon {
        fn recolor(&mut self, color: &str) -> Result<(), ChannelError> {
            self.0.borrow_mut().push(color.to_string());
            Ok(())
        }
    }

    struct RecordingAudio(Rc<RefCell<Vec<String>>>);

    impl AudioPlayer for RecordingAudio {
        fn play(&mut self, sound_id: &str, _volume: f32) -> Result<(), ChannelError> {
            Err(ChannelError::failed("audio", format!("no file for {sound_id}")))
        }

        fn play_tone(&mut self, tone: Tone) -> Result<(), ChannelError> {
            self.0.borrow_mut().push(tone.frequency_hz.to_string());
            Ok(())
        }
    }

    #[test]
    fn failing_title_does_not_block_other_channels() {
        let favicon = Log::default();
        let audio = Log::default();
        let mut fanout = SyncFanout::new(
            Box::new(FailingTitle),
            Box::new(RecordingFavicon(favicon.0.clone())),
            Box::new(Unsupported),
            Box::new(RecordingAudio(audio.0.clone())),
        );
        let mut engine = CountdownEngine::with_duration(TimerDuration::new(0, 0, 1));
        engine.start();
        let event = engine.tick();
        fanout.sync(&engine, event.as_ref(), &Settings::default());

        assert_eq!(favicon.entries(), [NEUTRAL_COLOR]);
        assert_eq!(audio.entries(), ["800"]);
    }

    #[test]
    fn missing_sound_falls_back_to_tone() {
        let audio = Log::default();
        let mut fanout = SyncFanout::new(
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(RecordingAudio(audio.0.clone())),
        );
        let mut settings = Settings::default();
        settings.set_alarm_sound("pop").unwrap();
        fanout.play_alarm(&settings);
        assert_eq!(audio.entries(), ["800"]);
    }

    #[test]
    fn fade_and_theme_recolor_favicon_once_each() {
        let favicon = Log::default();
        let mut fanout = SyncFanout::new(
            Box::new(Unsupported),
            Box::new(RecordingFavicon(favicon.0.clone())),
            Box::new(Unsupported),
            Box::new(Unsupported),
        );
        let engine = CountdownEngine::new();
        fanout.sync(&engine, None, &Settings::default());
        fanout.sync(&engine, None, &Settings::default());
        fanout.set_theme(Theme::Blue, &engine);
        fanout.finish_fade(&engine);
        fanout.finish_fade(&engine);
        fanout.set_theme(Theme::Red, &engine);
        assert_eq!(favicon.entries(), [NEUTRAL_COLOR, "#3b82f6", "#ef4444"]);
    }

    #[test]
    fn unsupported_window_is_silent() {
        let mut fanout = SyncFanout::new(
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(Unsupported),
        );
        let engine = CountdownEngine::new();
        assert!(!fanout.open_window(&engine));
        assert!(!fanout.is_window_open());
        fanout.close_window();
        fanout.close_window();
    }

    #[test]
    fn cue_only_inside_threshold() {
        let audio = Log::default();
        let mut fanout = SyncFanout::new(
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(RecordingAudio(audio.0.clone())),
        );
        let settings = Settings {
            countdown_threshold: CountdownThreshold::Seconds(3),
            ..Settings::default()
        };
        let mut engine = CountdownEngine::with_duration(TimerDuration::new(0, 0, 5));
        engine.start();
        while engine.is_running() {
            let event = engine.tick();
            fanout.sync(&engine, event.as_ref(), &settings);
        }
        // before = 5, 4 silent; 3, 2 cue; 1 cues and completes.
        assert_eq!(audio.entries(), ["600", "600", "600", "800"]);
    }

    #[test]
    fn batch_plays_one_audible_event() {
        let audio = Log::default();
        let mut fanout = SyncFanout::new(
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(Unsupported),
            Box::new(RecordingAudio(audio.0.clone())),
        );
        let settings = Settings {
            countdown_threshold: CountdownThreshold::Seconds(5),
            ..Settings::default()
        };
        let mut engine = CountdownEngine::with_duration(TimerDuration::new(0, 0, 5));
        engine.set_repeat(true);
        engine.start();
        let events: Vec<Event> = (0..12).filter_map(|_| engine.tick()).collect();
        fanout.sync_batch(&engine, &events, &settings);
        // The second completion is the last one; it cues at 1 s and alarms.
        assert_eq!(audio.entries(), ["600", "800"]);

        audio.0.borrow_mut().clear();
        fanout.sync_batch(&engine, &[], &settings);
        assert!(audio.entries().is_empty());
    }
}
