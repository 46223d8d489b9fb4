//! # Stillpoint Core Library
//!
//! Core business logic for the Stillpoint meditation timer. Everything is
//! CLI-first: the `stillpoint` binary drives this library, persisting the
//! timer between invocations, and any richer front end would be a thin
//! layer over the same types.
//!
//! ## Architecture
//!
//! - **Session Timer**: a wall-clock-based state machine; the caller passes
//!   the current instant into every transition and ticks it periodically
//! - **Storage**: a SQLite key-value store holding one flat JSON blob of
//!   practice data plus scalar settings entries
//! - **Statistics**: totals, per-level counters, and day-streak bookkeeping
//!   maintained incrementally as sessions are recorded
//! - **Snapshot**: tagged JSON export/import of the full practice state
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: countdown/overtime state machine
//! - [`PracticeData`]: the persisted statistics blob
//! - [`Settings`]: duration, sound, and auto-advance preferences
//! - [`Database`]: kv persistence

pub mod error;
pub mod events;
pub mod level;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{CoreError, ImportError, StorageError, ValidationError};
pub use events::Event;
pub use level::Level;
pub use stats::{AggregateStats, LevelGoal, LevelStats, PracticeData, SessionRecord};
pub use storage::{Database, Settings};
pub use timer::{SessionTimer, TimerState};
