//! Terminal stand-ins for the presentation channels.

mod audio;
mod mini_window;
mod terminal;
mod wake_lock;

pub use audio::CommandAudio;
pub use mini_window::MiniWindowFile;
pub use terminal::{StatusGlyph, TerminalTitle};
pub use wake_lock::InhibitorLock;

use clocktimer_core::sync::{FloatingWindow, Unsupported};
use clocktimer_core::{Channels, Config};
use tracing::warn;

/// Build every channel for an interactive session. Also returns the glyph
/// so the status line can render the current favicon color.
pub fn terminal_channels(config: &Config) -> (Channels, StatusGlyph) {
    let glyph = StatusGlyph::default();

    let window: Box<dyn FloatingWindow> = match config.mini_window_path() {
        Ok(path) => Box::new(MiniWindowFile::new(path)),
        Err(e) => {
            warn!(channel = "floating_window", "mini-window disabled: {e}");
            Box::new(Unsupported)
        }
    };

    let channels = Channels {
        title: Box::new(TerminalTitle::stderr()),
        favicon: Box::new(glyph.clone()),
        window,
        audio: Box::new(CommandAudio::from_config(config)),
        wake_lock: Box::new(InhibitorLock::for_platform()),
    };
    (channels, glyph)
}
