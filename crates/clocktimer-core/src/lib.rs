//! # ClockTimer Core Library
//!
//! The countdown state machine behind ClockTimer and the protocol that keeps
//! every presentation channel in step with it. Hosts (the CLI today) supply
//! the channels; this crate owns the rules.
//!
//! ## Architecture
//!
//! - **Timer**: [`TimerDuration`] value type, the [`CountdownEngine`] state
//!   machine, and a [`TickScheduler`] that turns wall-clock time into ticks
//! - **Sync**: [`SyncFanout`] pushes engine state to the title, favicon,
//!   floating-window and audio channels, isolating their failures
//! - **Storage**: SQLite key-value stores behind the [`PersistenceBridge`],
//!   plus the TOML [`Config`]
//! - **App**: [`TimerApp`], the controller that sequences all of the above

pub mod app;
pub mod error;
pub mod events;
pub mod settings;
pub mod sound;
pub mod storage;
pub mod sync;
pub mod theme;
pub mod timer;

pub use app::{TimerApp, QUICK_ADJUST_MINUTES};
pub use error::{ChannelError, ConfigError, CoreError, DatabaseError, StorageError, ValidationError};
pub use events::Event;
pub use settings::{CountdownThreshold, CustomThresholds, Settings};
pub use sound::{SoundOption, Tone, SOUND_OPTIONS};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, PersistenceBridge};
pub use sync::{Channels, SyncFanout};
pub use theme::Theme;
pub use timer::{CountdownEngine, Field, TickScheduler, TimerDuration};
