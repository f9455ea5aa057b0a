use std::cell::Cell;
use std::io::IsTerminal;
use std::rc::Rc;

use clocktimer_core::error::ChannelError;
use clocktimer_core::sync::{FaviconSink, TitleSink};
use clocktimer_core::theme::parse_hex_color;
use crossterm::execute;
use crossterm::style::{Color, StyledContent, Stylize};
use crossterm::terminal::SetTitle;

const GLYPH: &str = "●";

/// Sets the terminal window title.
pub struct TerminalTitle {
    enabled: bool,
}

impl TerminalTitle {
    /// Writes only when stderr is a terminal; otherwise titles are dropped.
    pub fn stderr() -> Self {
        Self {
            enabled: std::io::stderr().is_terminal(),
        }
    }
}

impl TitleSink for TerminalTitle {
    fn set_title(&mut self, title: &str) -> Result<(), ChannelError> {
        if !self.enabled {
            return Ok(());
        }
        let clean: String = title.chars().filter(|c| !c.is_control()).collect();
        execute!(std::io::stderr(), SetTitle(clean)).map_err(|e| ChannelError::failed("title", e))
    }
}

/// The status-line glyph standing in for the favicon.
#[derive(Clone, Default)]
pub struct StatusGlyph {
    color: Rc<Cell<Option<Color>>>,
}

impl StatusGlyph {
    pub fn color(&self) -> Option<Color> {
        self.color.get()
    }

    /// `●` in the current color, or uncolored before the first recolor.
    pub fn render(&self) -> StyledContent<&'static str> {
        match self.color.get() {
            Some(color) => GLYPH.with(color),
            None => GLYPH.stylize(),
        }
    }
}

impl FaviconSink for StatusGlyph {
    fn recolor(&mut self, color: &str) -> Result<(), ChannelError> {
        let (r, g, b) = parse_hex_color(color)
            .ok_or_else(|| ChannelError::failed("favicon", format!("bad color '{color}'")))?;
        self.color.set(Some(Color::Rgb { r, g, b }));
        Ok(())
    }
}
