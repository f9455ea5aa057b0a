use std::fs;
use std::io;
use std::path::PathBuf;

use clocktimer_core::error::ChannelError;
use clocktimer_core::sync::{FloatingContent, FloatingWindow, WindowHandle};
use tracing::debug;

/// Floating "window" backed by a small text file that status bars or a
/// `watch cat` pane can follow.
///
/// File layout, one field per line: time, `running`/`paused`, primary
/// color, dark color. Deleting the file counts as closing the window.
pub struct MiniWindowFile {
    path: PathBuf,
    open: Option<WindowHandle>,
    next_id: u64,
    content: Option<FloatingContent>,
}

impl MiniWindowFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            open: None,
            next_id: 1,
            content: None,
        }
    }

    fn render(content: &FloatingContent) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            content.time,
            if content.running { "running" } else { "paused" },
            content.primary_color,
            content.dark_color
        )
    }

    /// Write through a sibling temp file so readers never see a torn write.
    fn write(&self, content: &FloatingContent) -> io::Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, Self::render(content))?;
        fs::rename(&tmp, &self.path)
    }

    fn ensure_open(&self, handle: WindowHandle) -> Result<(), ChannelError> {
        if self.is_open(handle) {
            Ok(())
        } else {
            Err(ChannelError::Closed)
        }
    }
}

impl FloatingWindow for MiniWindowFile {
    fn is_supported(&self) -> bool {
        true
    }

    fn open(&mut self, content: &FloatingContent) -> Result<WindowHandle, ChannelError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ChannelError::failed("floating window", e))?;
        }
        self.write(content)
            .map_err(|e| ChannelError::failed("floating window", e))?;

        let handle = WindowHandle(self.next_id);
        self.next_id += 1;
        self.open = Some(handle);
        self.content = Some(content.clone());
        debug!(path = %self.path.display(), "mini-window opened");
        Ok(handle)
    }

    fn is_open(&self, handle: WindowHandle) -> bool {
        self.open == Some(handle) && self.path.exists()
    }

    fn update_text(&mut self, handle: WindowHandle, text: &str) -> Result<(), ChannelError> {
        self.ensure_open(handle)?;
        let Some(content) = self.content.as_mut() else {
            return Err(ChannelError::Closed);
        };
        content.time = text.to_string();
        let content = content.clone();
        self.write(&content)
            .map_err(|e| ChannelError::failed("floating window", e))
    }

    fn update_content(
        &mut self,
        handle: WindowHandle,
        content: &FloatingContent,
    ) -> Result<(), ChannelError> {
        self.ensure_open(handle)?;
        self.write(content)
            .map_err(|e| ChannelError::failed("floating window", e))?;
        self.content = Some(content.clone());
        Ok(())
    }

    fn close(&mut self, handle: WindowHandle) -> Result<(), ChannelError> {
        if self.open != Some(handle) {
            return Ok(());
        }
        self.open = None;
        self.content = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ChannelError::failed("floating window", e)),
        }
    }
}
