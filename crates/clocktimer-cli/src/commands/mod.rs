pub mod completions;
pub mod config;
pub mod run;
pub mod settings;
pub mod theme;
pub mod timer;

use std::time::Instant;

use clocktimer_core::{Channels, PersistenceBridge, TimerApp};
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Controller over the on-disk stores with no presentation channels.
/// One-shot commands edit the stored state and exit.
pub(crate) fn open_headless() -> TimerApp {
    TimerApp::load(
        PersistenceBridge::open_default(),
        Channels::headless(),
        Instant::now(),
    )
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
