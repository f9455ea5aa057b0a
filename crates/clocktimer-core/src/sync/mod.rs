//! Presentation channels and the fan-out that keeps them in step with the
//! engine.
//!
//! Every channel is a narrow capability trait. The host provides an
//! implementation per channel; [`Unsupported`] stands in for any the host
//! lacks. Channels never see the engine, only the formatted values the
//! fan-out pushes to them.

mod fanout;

pub use fanout::{SyncFanout, FAVICON_FADE_DELAY, IDLE_TITLE, TITLE_SUFFIX};

use crate::error::ChannelError;
use crate::sound::Tone;

/// Page/window title.
pub trait TitleSink {
    fn set_title(&mut self, title: &str) -> Result<(), ChannelError>;
}

/// Favicon or any other single-color status glyph.
pub trait FaviconSink {
    fn recolor(&mut self, color: &str) -> Result<(), ChannelError>;
}

/// Opaque reference to an open floating window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Everything the floating window renders on a full refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingContent {
    pub time: String,
    /// Paused windows show a play affordance.
    pub running: bool,
    pub primary_color: String,
    pub dark_color: String,
}

/// Always-on-top mini-window.
pub trait FloatingWindow {
    fn is_supported(&self) -> bool;

    fn open(&mut self, content: &FloatingContent) -> Result<WindowHandle, ChannelError>;

    /// Whether the window behind `handle` is still open. Windows can be
    /// closed from outside.
    fn is_open(&self, handle: WindowHandle) -> bool;

    fn update_text(&mut self, handle: WindowHandle, text: &str) -> Result<(), ChannelError>;

    fn update_content(
        &mut self,
        handle: WindowHandle,
        content: &FloatingContent,
    ) -> Result<(), ChannelError>;

    /// Must tolerate handles that are already closed.
    fn close(&mut self, handle: WindowHandle) -> Result<(), ChannelError>;
}

/// Fire-and-forget audio playback.
pub trait AudioPlayer {
    /// Play a catalog sound at `volume` (0.0..=1.0).
    fn play(&mut self, sound_id: &str, volume: f32) -> Result<(), ChannelError>;

    /// Play a synthesized tone.
    fn play_tone(&mut self, tone: Tone) -> Result<(), ChannelError>;
}

/// Screen-wake suppression.
pub trait WakeLock {
    fn acquire(&mut self) -> Result<(), ChannelError>;

    fn release(&mut self) -> Result<(), ChannelError>;
}

/// Stand-in for a capability the host does not have.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl TitleSink for Unsupported {
    fn set_title(&mut self, _title: &str) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl FaviconSink for Unsupported {
    fn recolor(&mut self, _color: &str) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl FloatingWindow for Unsupported {
    fn is_supported(&self) -> bool {
        false
    }

    fn open(&mut self, _content: &FloatingContent) -> Result<WindowHandle, ChannelError> {
        Err(ChannelError::Unsupported("floating window"))
    }

    fn is_open(&self, _handle: WindowHandle) -> bool {
        false
    }

    fn update_text(&mut self, _handle: WindowHandle, _text: &str) -> Result<(), ChannelError> {
        Err(ChannelError::Closed)
    }

    fn update_content(
        &mut self,
        _handle: WindowHandle,
        _content: &FloatingContent,
    ) -> Result<(), ChannelError> {
        Err(ChannelError::Closed)
    }

    fn close(&mut self, _handle: WindowHandle) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl AudioPlayer for Unsupported {
    fn play(&mut self, _sound_id: &str, _volume: f32) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported("audio"))
    }

    fn play_tone(&mut self, _tone: Tone) -> Result<(), ChannelError> {
        Ok(())
    }
}

impl WakeLock for Unsupported {
    fn acquire(&mut self) -> Result<(), ChannelError> {
        Err(ChannelError::Unsupported("wake lock"))
    }

    fn release(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// One implementation per channel, handed to the controller at startup.
pub struct Channels {
    pub title: Box<dyn TitleSink>,
    pub favicon: Box<dyn FaviconSink>,
    pub window: Box<dyn FloatingWindow>,
    pub audio: Box<dyn AudioPlayer>,
    pub wake_lock: Box<dyn WakeLock>,
}

impl Channels {
    /// No presentation at all; used by one-shot commands.
    pub fn headless() -> Self {
        Self {
            title: Box::new(Unsupported),
            favicon: Box::new(Unsupported),
            window: Box::new(Unsupported),
            audio: Box::new(Unsupported),
            wake_lock: Box::new(Unsupported),
        }
    }
}
