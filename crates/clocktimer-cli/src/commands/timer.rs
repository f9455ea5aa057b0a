use std::time::Instant;

use clap::{Subcommand, ValueEnum};
use clocktimer_core::{Event, TimerApp, QUICK_ADJUST_MINUTES};

use super::{open_headless, print_json, CommandResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown (pauses it when already running)
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and restore the last started duration
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Set the remaining time (only while stopped)
    Set {
        #[arg(allow_hyphen_values = true)]
        hours: String,
        #[arg(allow_hyphen_values = true)]
        minutes: String,
        #[arg(allow_hyphen_values = true)]
        seconds: String,
    },
    /// Add minutes to the remaining time (only while stopped)
    Add {
        #[arg(long, default_value_t = QUICK_ADJUST_MINUTES as u32)]
        minutes: u32,
    },
    /// Subtract minutes from the remaining time (only while stopped)
    Subtract {
        #[arg(long, default_value_t = QUICK_ADJUST_MINUTES as u32)]
        minutes: u32,
    },
    /// Restart automatically on completion
    Repeat {
        #[arg(value_enum)]
        mode: Toggle,
    },
}

pub fn run(action: TimerAction) -> CommandResult {
    let mut app = open_headless();
    let now = Instant::now();

    let event = match action {
        TimerAction::Start => app.start(now),
        TimerAction::Pause => app.pause(now),
        TimerAction::Reset => app.reset(now),
        TimerAction::Status => None,
        TimerAction::Set {
            hours,
            minutes,
            seconds,
        } => {
            let event = app.edit_remaining(&hours, &minutes, &seconds, now);
            edit(&app, event)
        }
        TimerAction::Add { minutes } => {
            let event = app.quick_adjust(minutes.min(i32::MAX as u32) as i32, now);
            edit(&app, event)
        }
        TimerAction::Subtract { minutes } => {
            let event = app.quick_adjust(-(minutes.min(i32::MAX as u32) as i32), now);
            edit(&app, event)
        }
        TimerAction::Repeat { mode } => app.set_repeat(matches!(mode, Toggle::On), now),
    };

    match event {
        Some(event) => print_json(&event),
        None => print_json(&app.snapshot()),
    }
}

/// Edits are ignored while running; say so instead of failing.
fn edit(app: &TimerApp, event: Option<Event>) -> Option<Event> {
    if event.is_none() && app.engine().is_running() {
        eprintln!("timer is running; pause it before editing");
    }
    event
}
