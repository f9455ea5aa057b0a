//! Recording channel fakes shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use clocktimer_core::error::ChannelError;
use clocktimer_core::sync::{
    AudioPlayer, Channels, FaviconSink, FloatingContent, FloatingWindow, TitleSink, WakeLock,
    WindowHandle,
};
use clocktimer_core::Tone;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Title(String),
    Favicon(String),
    WindowOpen(FloatingContent),
    WindowText(String),
    WindowContent(FloatingContent),
    WindowClose,
    Sound(String),
    Tone(u32),
    WakeAcquire,
    WakeRelease,
}

/// Shared call log plus knobs for simulating failures.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    window_open: Rc<RefCell<bool>>,
    fail_title: Rc<RefCell<bool>>,
    fail_window: Rc<RefCell<bool>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn last_title(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::Title(t) => Some(t.clone()),
            _ => None,
        })
    }

    pub fn fail_title(&self, fail: bool) {
        *self.fail_title.borrow_mut() = fail;
    }

    pub fn fail_window(&self, fail: bool) {
        *self.fail_window.borrow_mut() = fail;
    }

    /// Simulate the user closing the window from its own chrome.
    pub fn close_window_externally(&self) {
        *self.window_open.borrow_mut() = false;
    }

    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    pub fn channels(&self) -> Channels {
        Channels {
            title: Box::new(self.clone()),
            favicon: Box::new(self.clone()),
            window: Box::new(self.clone()),
            audio: Box::new(self.clone()),
            wake_lock: Box::new(self.clone()),
        }
    }
}

impl TitleSink for Recorder {
    fn set_title(&mut self, title: &str) -> Result<(), ChannelError> {
        if *self.fail_title.borrow() {
            return Err(ChannelError::failed("title", "detached"));
        }
        self.push(Call::Title(title.to_string()));
        Ok(())
    }
}

impl FaviconSink for Recorder {
    fn recolor(&mut self, color: &str) -> Result<(), ChannelError> {
        self.push(Call::Favicon(color.to_string()));
        Ok(())
    }
}

impl FloatingWindow for Recorder {
    fn is_supported(&self) -> bool {
        true
    }

    fn open(&mut self, content: &FloatingContent) -> Result<WindowHandle, ChannelError> {
        *self.window_open.borrow_mut() = true;
        self.push(Call::WindowOpen(content.clone()));
        Ok(WindowHandle(1))
    }

    fn is_open(&self, _handle: WindowHandle) -> bool {
        *self.window_open.borrow()
    }

    fn update_text(&mut self, _handle: WindowHandle, text: &str) -> Result<(), ChannelError> {
        if *self.fail_window.borrow() {
            return Err(ChannelError::failed("floating window", "render failed"));
        }
        self.push(Call::WindowText(text.to_string()));
        Ok(())
    }

    fn update_content(
        &mut self,
        _handle: WindowHandle,
        content: &FloatingContent,
    ) -> Result<(), ChannelError> {
        if *self.fail_window.borrow() {
            return Err(ChannelError::failed("floating window", "render failed"));
        }
        self.push(Call::WindowContent(content.clone()));
        Ok(())
    }

    fn close(&mut self, _handle: WindowHandle) -> Result<(), ChannelError> {
        *self.window_open.borrow_mut() = false;
        self.push(Call::WindowClose);
        Ok(())
    }
}

impl AudioPlayer for Recorder {
    fn play(&mut self, sound_id: &str, _volume: f32) -> Result<(), ChannelError> {
        self.push(Call::Sound(sound_id.to_string()));
        Ok(())
    }

    fn play_tone(&mut self, tone: Tone) -> Result<(), ChannelError> {
        self.push(Call::Tone(tone.frequency_hz));
        Ok(())
    }
}

impl WakeLock for Recorder {
    fn acquire(&mut self) -> Result<(), ChannelError> {
        self.push(Call::WakeAcquire);
        Ok(())
    }

    fn release(&mut self) -> Result<(), ChannelError> {
        self.push(Call::WakeRelease);
        Ok(())
    }
}

pub fn is_alarm(call: &Call) -> bool {
    matches!(call, Call::Tone(800)) || matches!(call, Call::Sound(_))
}

pub fn is_cue(call: &Call) -> bool {
    matches!(call, Call::Tone(600))
}
