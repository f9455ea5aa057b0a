mod duration;
mod engine;
mod scheduler;

pub use duration::{clamp, Field, TimerDuration, MAX_HOURS, MAX_MINUTES, MAX_SECONDS, MAX_TOTAL_SECS};
pub use engine::{CountdownEngine, PersistedTimerState, DEFAULT_DURATION_MIN};
pub use scheduler::{TickScheduler, TICK};
