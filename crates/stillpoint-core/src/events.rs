use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Every timer transition produces an Event.
/// The CLI prints them as JSON; the overtime event doubles as the bell cue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        level: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        overtime: bool,
        at: DateTime<Utc>,
    },
    SessionResumed {
        remaining_secs: u64,
        overtime: bool,
        at: DateTime<Utc>,
    },
    /// The countdown hit zero. Emitted exactly once per session; the bell
    /// rings on this event and the timer begins counting up.
    OvertimeStarted {
        level: u32,
        at: DateTime<Utc>,
    },
    SessionFinished {
        level: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        level: u32,
        remaining_secs: u64,
        overtime: bool,
        overtime_secs: u64,
        elapsed_secs: u64,
        progress_pct: f64,
        guidance_step: usize,
        at: DateTime<Utc>,
    },
}
