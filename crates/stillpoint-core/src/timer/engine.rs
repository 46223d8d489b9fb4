//! Timer engine implementation.
//!
//! The session timer is a wall-clock-based state machine. It does not use
//! internal threads or schedule anything itself - the caller passes the
//! current instant into every transition and is responsible for calling
//! `tick()` periodically. Tests drive it with synthetic instants.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Idle (finish)
//! ```
//!
//! Overtime is a flag, not a state: when the countdown reaches zero the
//! timer keeps Running but counts up instead of down, and `tick()` returns
//! the one-shot [`Event::OvertimeStarted`] bell cue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Countdown/overtime session timer.
///
/// Serializable so the CLI can park it in the kv store between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    level: u32,
    /// Configured session length in seconds.
    duration_secs: u64,
    state: TimerState,
    /// Remaining countdown time in milliseconds.
    remaining_ms: u64,
    /// True once the countdown has hit zero.
    overtime: bool,
    /// True once the one-shot overtime cue has been emitted.
    #[serde(default)]
    overtime_announced: bool,
    /// Time accumulated past the configured duration, in milliseconds.
    overtime_ms: u64,
    /// Instant (ms since epoch) of the last resume/start/tick.
    /// Used to compute elapsed wall time between ticks.
    #[serde(default)]
    last_tick_epoch_ms: Option<i64>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
}

impl SessionTimer {
    /// Create an idle timer for the given level and duration.
    pub fn new(level: u32, duration_secs: u64) -> Self {
        Self {
            level,
            duration_secs,
            state: TimerState::Idle,
            remaining_ms: duration_secs.saturating_mul(1000),
            overtime: false,
            overtime_announced: false,
            overtime_ms: 0,
            last_tick_epoch_ms: None,
            started_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn is_overtime(&self) -> bool {
        self.overtime
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms / 1000
    }

    pub fn overtime_secs(&self) -> u64 {
        self.overtime_ms / 1000
    }

    /// Total elapsed = (duration - remaining) + overtime.
    pub fn elapsed_secs(&self) -> u64 {
        let duration_ms = self.duration_secs.saturating_mul(1000);
        (duration_ms.saturating_sub(self.remaining_ms) + self.overtime_ms) / 1000
    }

    /// 0.0 .. 100.0 progress through the configured duration.
    pub fn progress_pct(&self) -> f64 {
        let total = self.duration_secs.saturating_mul(1000);
        if total == 0 {
            return 0.0;
        }
        ((total.saturating_sub(self.remaining_ms)) as f64 / total as f64 * 100.0).min(100.0)
    }

    /// Build a full state snapshot event. `auto_advance` gates the guidance
    /// step: when off, the first step stays displayed for the whole session.
    pub fn snapshot(&self, now: DateTime<Utc>, auto_advance: bool) -> Event {
        let guidance_step = if auto_advance {
            level::by_id(self.level)
                .map(|l| l.step_at(self.elapsed_secs()))
                .unwrap_or(0)
        } else {
            0
        };
        Event::StateSnapshot {
            state: self.state,
            level: self.level,
            remaining_secs: self.remaining_secs(),
            overtime: self.overtime,
            overtime_secs: self.overtime_secs(),
            elapsed_secs: self.elapsed_secs(),
            progress_pct: self.progress_pct(),
            guidance_step,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now.timestamp_millis());
                self.started_at = Some(now);
                Some(Event::SessionStarted {
                    level: self.level,
                    duration_secs: self.duration_secs,
                    at: now,
                })
            }
            // Double-start is a no-op.
            TimerState::Running | TimerState::Paused => None,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.flush_elapsed(now);
                self.state = TimerState::Paused;
                self.last_tick_epoch_ms = None;
                Some(Event::SessionPaused {
                    remaining_secs: self.remaining_secs(),
                    overtime: self.overtime,
                    at: now,
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                self.last_tick_epoch_ms = Some(now.timestamp_millis());
                Some(Event::SessionResumed {
                    remaining_secs: self.remaining_secs(),
                    overtime: self.overtime,
                    at: now,
                })
            }
            _ => None,
        }
    }

    /// Call periodically. Returns the one-shot `OvertimeStarted` event the
    /// first time it observes the countdown past zero, even when the
    /// boundary was crossed inside a `pause` or `finish` flush.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state == TimerState::Running {
            self.flush_elapsed(now);
        }
        if self.overtime && !self.overtime_announced {
            self.overtime_announced = true;
            return Some(Event::OvertimeStarted {
                level: self.level,
                at: now,
            });
        }
        None
    }

    /// Stop the clock and report total elapsed time. Whether the session is
    /// recorded (>= 10s) or discarded is the statistics layer's decision.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Running | TimerState::Paused => {
                if self.state == TimerState::Running {
                    self.flush_elapsed(now);
                }
                self.state = TimerState::Idle;
                self.last_tick_epoch_ms = None;
                Some(Event::SessionFinished {
                    level: self.level,
                    elapsed_secs: self.elapsed_secs(),
                    at: now,
                })
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Advance the countdown/overtime counters by the wall-clock delta
    /// since the last flush. A boundary crossing sets the overtime flag;
    /// the next `tick` announces it.
    fn flush_elapsed(&mut self, now: DateTime<Utc>) {
        let Some(last) = self.last_tick_epoch_ms else {
            return;
        };
        let now_ms = now.timestamp_millis();
        let delta = now_ms.saturating_sub(last).max(0) as u64;
        self.last_tick_epoch_ms = Some(now_ms);

        if self.overtime {
            self.overtime_ms += delta;
            return;
        }
        if delta >= self.remaining_ms {
            // Excess past the boundary rolls into overtime so elapsed time
            // is preserved exactly.
            let excess = delta - self.remaining_ms;
            self.remaining_ms = 0;
            self.overtime = true;
            self.overtime_ms += excess;
            return;
        }
        self.remaining_ms -= delta;
    }
}
