//! Interactive countdown session.
//!
//! A current-thread runtime multiplexes the tick poll, stdin commands, the
//! favicon fade and Ctrl-C. Everything runs on one thread, so the
//! controller needs no locking.

use std::fmt;
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::time::{Duration, Instant};

use clap::Args;
use clocktimer_core::sound::sound_display_name;
use clocktimer_core::sync::FAVICON_FADE_DELAY;
use clocktimer_core::{Config, Field, PersistenceBridge, Theme, TimerApp};
use crossterm::cursor::MoveToColumn;
use crossterm::style::{Print, PrintStyledContent};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{execute, queue};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::CommandResult;
use crate::channels::{terminal_channels, StatusGlyph};

/// How often the loop asks the scheduler for due ticks.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// A gap this long between polls means the process was suspended.
const STALL_THRESHOLD: Duration = Duration::from_secs(1);

const HELP: &str = "\
commands:
  s, start        start (or pause when running)
  p, pause        pause
  r, reset        stop and restore the last started duration
  +, -            add or subtract 5 minutes
  set H M S       set the remaining time
  h+ h- m+ m- s+ s-  nudge one field
  repeat          toggle repeat
  theme NAME      green, yellow, blue, purple, red
  float           toggle the mini-window
  test            play the alarm once
  status          print the state as JSON
  q, quit         exit";

#[derive(Args)]
pub struct RunArgs {
    /// Open the mini-window on start
    #[arg(long)]
    floating: bool,
    /// Do not keep the machine awake while running
    #[arg(long)]
    no_wake_lock: bool,
}

pub fn run(args: RunArgs) -> CommandResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> CommandResult {
    let config = Config::load_or_default();
    let (channels, glyph) = terminal_channels(&config);
    let mut app = TimerApp::load(PersistenceBridge::open_default(), channels, Instant::now());
    app.set_volume(config.audio.gain());
    app.set_wake_lock_enabled(config.wake_lock.enabled && !args.no_wake_lock);
    if (args.floating || config.window.floating) && !app.open_floating() {
        warn!(channel = "floating_window", "mini-window could not be opened");
    }

    let mut status = StatusLine::new(glyph);
    info!("session started; type `help` for commands");
    status.draw(&app);

    let fade = tokio::time::sleep(FAVICON_FADE_DELAY);
    tokio::pin!(fade);
    let mut faded = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut poll = tokio::time::interval(POLL_INTERVAL);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_poll = Instant::now();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = &mut fade, if !faded => {
                faded = true;
                app.finish_favicon_fade();
                status.draw(&app);
            }
            _ = poll.tick() => {
                let now = Instant::now();
                if now.duration_since(last_poll) > STALL_THRESHOLD {
                    debug!("resumed after a stall");
                    app.on_visibility_change(true);
                }
                last_poll = now;

                let events = app.on_timer(now);
                if !events.is_empty() {
                    if events.iter().any(|e| e.is_completion()) {
                        info!(repeat = app.engine().is_repeat(), "countdown finished");
                    }
                    status.draw(&app);
                }
                if !stdin_open && !app.engine().is_running() {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if handle_line(&mut app, &mut status, &line)? == Flow::Quit {
                            break;
                        }
                    }
                    // Input closed: keep counting until the timer stops.
                    None => stdin_open = false,
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    app.shutdown();
    status.finish();
    info!("session ended");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_line(
    app: &mut TimerApp,
    status: &mut StatusLine,
    line: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    let command = match line.parse::<LineCommand>() {
        Ok(command) => command,
        Err(e) => {
            status.message(&e);
            return Ok(Flow::Continue);
        }
    };
    let now = Instant::now();

    let edit = match command {
        LineCommand::Empty => return Ok(Flow::Continue),
        LineCommand::Quit => return Ok(Flow::Quit),
        LineCommand::Help => {
            status.message(HELP);
            return Ok(Flow::Continue);
        }
        LineCommand::Status => {
            status.print_json(&app.snapshot())?;
            return Ok(Flow::Continue);
        }
        LineCommand::Start => {
            app.start(now);
            None
        }
        LineCommand::Pause => {
            app.pause(now);
            None
        }
        LineCommand::Reset => {
            app.reset(now);
            None
        }
        LineCommand::Add => Some(app.quick_add(now)),
        LineCommand::Subtract => Some(app.quick_subtract(now)),
        LineCommand::Set(h, m, s) => Some(app.edit_remaining(&h, &m, &s, now)),
        LineCommand::Nudge(field, delta) => Some(app.nudge(field, delta, now)),
        LineCommand::ToggleRepeat => {
            let repeat = !app.engine().is_repeat();
            app.set_repeat(repeat, now);
            status.message(if repeat { "repeat on" } else { "repeat off" });
            None
        }
        LineCommand::Theme(theme) => {
            app.set_theme(theme);
            None
        }
        LineCommand::ToggleFloat => {
            if !app.floating_supported() {
                status.message("mini-window is not available");
            } else if !app.toggle_floating() {
                status.message("mini-window closed");
            }
            None
        }
        LineCommand::TestAlarm => {
            let sound = sound_display_name(&app.settings().alarm_sound_id);
            status.message(format!("alarm: {sound}"));
            app.test_alarm();
            None
        }
    };

    if let Some(None) = edit {
        if app.engine().is_running() {
            status.message("timer is running; pause it before editing");
        }
    }
    status.draw(app);
    Ok(Flow::Continue)
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
enum LineCommand {
    Empty,
    Start,
    Pause,
    Reset,
    Add,
    Subtract,
    Set(String, String, String),
    Nudge(Field, i32),
    ToggleRepeat,
    Theme(Theme),
    ToggleFloat,
    TestAlarm,
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
struct UnknownCommand(String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; type `help` for commands", self.0)
    }
}

impl FromStr for LineCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(LineCommand::Empty);
        };
        let rest: Vec<&str> = words.collect();
        let arg = |i: usize| rest.get(i).copied().unwrap_or("").to_string();

        let command = match head.to_ascii_lowercase().as_str() {
            "s" | "start" => LineCommand::Start,
            "p" | "pause" => LineCommand::Pause,
            "r" | "reset" => LineCommand::Reset,
            "+" => LineCommand::Add,
            "-" => LineCommand::Subtract,
            "set" => LineCommand::Set(arg(0), arg(1), arg(2)),
            "h+" => LineCommand::Nudge(Field::Hours, 1),
            "h-" => LineCommand::Nudge(Field::Hours, -1),
            "m+" => LineCommand::Nudge(Field::Minutes, 1),
            "m-" => LineCommand::Nudge(Field::Minutes, -1),
            "s+" => LineCommand::Nudge(Field::Seconds, 1),
            "s-" => LineCommand::Nudge(Field::Seconds, -1),
            "repeat" => LineCommand::ToggleRepeat,
            "theme" => {
                let theme = rest
                    .first()
                    .ok_or_else(|| UnknownCommand("usage: theme NAME".into()))?
                    .parse()
                    .map_err(|e: clocktimer_core::ValidationError| UnknownCommand(e.to_string()))?;
                LineCommand::Theme(theme)
            }
            "float" => LineCommand::ToggleFloat,
            "test" => LineCommand::TestAlarm,
            "status" => LineCommand::Status,
            "h" | "help" | "?" => LineCommand::Help,
            "q" | "quit" | "exit" => LineCommand::Quit,
            other => return Err(UnknownCommand(format!("unknown command '{other}'"))),
        };
        Ok(command)
    }
}

/// Single redrawn line on stdout when it is a terminal. Piped output only
/// gets messages and JSON.
struct StatusLine {
    glyph: StatusGlyph,
    tty: bool,
}

impl StatusLine {
    fn new(glyph: StatusGlyph) -> Self {
        Self {
            glyph,
            tty: std::io::stdout().is_terminal(),
        }
    }

    fn draw(&mut self, app: &TimerApp) {
        if !self.tty {
            return;
        }
        let engine = app.engine();
        let state = if engine.is_running() { "running" } else { "stopped" };
        let repeat = if engine.is_repeat() { " (repeat)" } else { "" };
        let mut out = std::io::stdout().lock();
        let _ = queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            PrintStyledContent(self.glyph.render()),
            Print(format!(" {}  {state}{repeat}", engine.formatted()))
        );
        let _ = out.flush();
    }

    fn clear(&self) {
        if self.tty {
            let _ = execute!(
                std::io::stdout(),
                MoveToColumn(0),
                Clear(ClearType::CurrentLine)
            );
        }
    }

    fn message(&mut self, message: impl fmt::Display) {
        self.clear();
        println!("{message}");
    }

    fn print_json<T: Serialize>(&mut self, value: &T) -> CommandResult {
        self.clear();
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn finish(&mut self) {
        if self.tty {
            println!();
        }
    }
}
