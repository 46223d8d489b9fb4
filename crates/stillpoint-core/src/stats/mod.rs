//! Persisted practice data and statistics aggregation.
//!
//! The entire practice record is one flat JSON blob (`PracticeData`) stored
//! under a fixed kv key. Totals are maintained incrementally on each
//! recorded session; the invariant that they equal the sum over history is
//! exercised by the tests below.

pub mod streak;

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::Database;

/// Sessions shorter than this are treated as accidental and discarded.
pub const MIN_SESSION_SECS: u64 = 10;

/// History is bounded; oldest entries are dropped beyond this cap.
pub const HISTORY_CAP: usize = 50;

/// Fixed kv key for the persisted blob.
pub const PRACTICE_DATA_KEY: &str = "practice_data_v1";

/// One completed practice interval. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub level: u32,
    /// Elapsed seconds, including overtime.
    pub duration: u64,
    pub date: DateTime<Utc>,
}

/// Per-level aggregate counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelStats {
    pub sessions: u64,
    /// Total practiced seconds on this level.
    pub time: u64,
    pub last_practiced: Option<NaiveDate>,
}

/// Per-level practice goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelGoal {
    /// Per-session target, minutes.
    pub target_minutes: u32,
    pub enabled: bool,
    /// Cumulative practice target, hours.
    pub total_target_hours: f64,
    pub total_enabled: bool,
}

impl Default for LevelGoal {
    fn default() -> Self {
        Self {
            target_minutes: 5,
            enabled: false,
            total_target_hours: 10.0,
            total_enabled: false,
        }
    }
}

/// The persisted statistics blob.
///
/// Every field carries a serde default so payloads from older versions (or
/// imports with missing optional fields) backfill cleanly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeData {
    pub total_sessions: u64,
    /// Total recorded seconds across all levels.
    pub total_time: u64,
    pub levels: BTreeMap<u32, LevelStats>,
    pub streak: u32,
    pub streak_last_date: Option<NaiveDate>,
    pub last_session_date: Option<NaiveDate>,
    /// Newest first, capped at [`HISTORY_CAP`].
    pub history: Vec<SessionRecord>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub goals: BTreeMap<u32, LevelGoal>,
}

/// Display summary derived from [`PracticeData`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_sessions: u64,
    pub total_time: u64,
    pub current_streak: u32,
    pub last_session_date: Option<NaiveDate>,
    pub levels: Vec<LevelSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSummary {
    pub level: u32,
    pub sessions: u64,
    pub time: u64,
    pub last_practiced: Option<NaiveDate>,
    /// Progress toward the cumulative goal, when one is enabled.
    pub goal_progress_pct: Option<f64>,
}

impl PracticeData {
    /// Record a completed session of `elapsed_secs` on `level`.
    ///
    /// Sessions below [`MIN_SESSION_SECS`] are discarded untouched and
    /// `false` is returned. `today` is the session's calendar day in the
    /// user's time zone and drives streak bookkeeping.
    pub fn record_session(
        &mut self,
        level: u32,
        elapsed_secs: u64,
        at: DateTime<Utc>,
        today: NaiveDate,
    ) -> bool {
        if elapsed_secs < MIN_SESSION_SECS {
            return false;
        }

        self.total_sessions += 1;
        self.total_time += elapsed_secs;
        self.last_session_date = Some(today);

        let entry = self.levels.entry(level).or_default();
        entry.sessions += 1;
        entry.time += elapsed_secs;
        entry.last_practiced = Some(today);

        self.streak = streak::bump(self.streak, self.streak_last_date, today);
        self.streak_last_date = Some(today);

        self.history.insert(
            0,
            SessionRecord {
                level,
                duration: elapsed_secs,
                date: at,
            },
        );
        self.history.truncate(HISTORY_CAP);
        true
    }

    /// Manually adjust a level's practiced time by whole minutes. Rejected
    /// (returning false, with no mutation) if the adjustment would drive
    /// the level's total negative. Never touches history or streak.
    pub fn adjust_time(&mut self, level: u32, delta_minutes: i64) -> bool {
        let delta_secs = match delta_minutes.checked_mul(60) {
            Some(d) => d,
            None => return false,
        };
        let current = self.levels.get(&level).map(|l| l.time).unwrap_or(0);
        let new_time = current as i64 + delta_secs;
        if new_time < 0 {
            return false;
        }

        self.levels.entry(level).or_default().time = new_time as u64;
        self.total_time = (self.total_time as i64 + delta_secs).max(0) as u64;
        true
    }

    /// Streak as it should be displayed on `today`: a gap of more than one
    /// calendar day since the last session reads as 0, without waiting for
    /// the next recorded session to reset the stored counter.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        match self.streak_last_date {
            Some(last) if (today - last).num_days() <= 1 => self.streak,
            _ => 0,
        }
    }

    /// Rebuild the streak counter from history alone using the backward
    /// scan. `tz` maps each record's timestamp to a calendar day.
    pub fn recompute_streak<Tz: TimeZone>(&mut self, today: NaiveDate, tz: &Tz) {
        let dates = self
            .history
            .iter()
            .map(|r| r.date.with_timezone(tz).date_naive());
        self.streak = streak::scan(dates, today);
        self.streak_last_date = self
            .history
            .first()
            .map(|r| r.date.with_timezone(tz).date_naive());
    }

    /// Update a level's goal configuration. Only the provided fields change.
    /// Values are validated before any mutation: a zero per-session target
    /// or a non-positive cumulative target rejects the whole update.
    pub fn set_goal(
        &mut self,
        level: u32,
        target_minutes: Option<u32>,
        session_enabled: Option<bool>,
        total_target_hours: Option<f64>,
        total_enabled: Option<bool>,
    ) -> Result<(), ValidationError> {
        if target_minutes == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "target_minutes".into(),
                message: "per-session target must be greater than zero".into(),
            });
        }
        if let Some(hours) = total_target_hours {
            if hours <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "total_hours".into(),
                    message: "cumulative target must be greater than zero".into(),
                });
            }
        }

        let goal = self.goals.entry(level).or_default();
        if let Some(minutes) = target_minutes {
            goal.target_minutes = minutes;
        }
        if let Some(enabled) = session_enabled {
            goal.enabled = enabled;
        }
        if let Some(hours) = total_target_hours {
            goal.total_target_hours = hours;
        }
        if let Some(enabled) = total_enabled {
            goal.total_enabled = enabled;
        }
        Ok(())
    }

    /// Whether a session of `elapsed_secs` meets the level's per-session
    /// goal. None when the level has no enabled per-session goal.
    pub fn session_goal_met(&self, level: u32, elapsed_secs: u64) -> Option<bool> {
        let goal = self.goals.get(&level)?;
        if !goal.enabled {
            return None;
        }
        Some(elapsed_secs >= u64::from(goal.target_minutes) * 60)
    }

    /// Progress toward a level's cumulative practice goal, clamped to 100.
    /// None when no goal is enabled for the level.
    pub fn goal_progress_pct(&self, level: u32) -> Option<f64> {
        let goal = self.goals.get(&level)?;
        if !goal.total_enabled || goal.total_target_hours <= 0.0 {
            return None;
        }
        let time = self.levels.get(&level).map(|l| l.time).unwrap_or(0);
        let target_secs = goal.total_target_hours * 3600.0;
        Some((time as f64 / target_secs * 100.0).min(100.0))
    }

    /// Build a display summary as of `today`.
    pub fn summary(&self, today: NaiveDate) -> AggregateStats {
        AggregateStats {
            total_sessions: self.total_sessions,
            total_time: self.total_time,
            current_streak: self.current_streak(today),
            last_session_date: self.last_session_date,
            levels: self
                .levels
                .iter()
                .map(|(&level, stats)| LevelSummary {
                    level,
                    sessions: stats.sessions,
                    time: stats.time,
                    last_practiced: stats.last_practiced,
                    goal_progress_pct: self.goal_progress_pct(level),
                })
                .collect(),
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load from the kv store. Malformed or missing data yields the default
    /// empty state; corruption is logged, never propagated.
    pub fn load(db: &Database) -> Self {
        match db.kv_get(PRACTICE_DATA_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("malformed practice data, starting empty: {e}");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("failed to read practice data: {e}");
                Self::default()
            }
        }
    }

    /// Write to the kv store. Failures are logged and dropped; there is no
    /// retry and the caller proceeds regardless.
    pub fn persist(&self, db: &Database) {
        let json = match serde_json::to_string(self) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("failed to serialize practice data: {e}");
                return;
            }
        };
        if let Err(e) = db.kv_set(PRACTICE_DATA_KEY, &json) {
            tracing::warn!("failed to persist practice data: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn short_sessions_are_discarded() {
        let mut data = PracticeData::default();
        assert!(!data.record_session(1, MIN_SESSION_SECS - 1, at(1), d(1)));
        assert_eq!(data.total_sessions, 0);
        assert_eq!(data.total_time, 0);
        assert!(data.history.is_empty());
        assert!(data.levels.is_empty());
        assert_eq!(data.streak, 0);
    }

    #[test]
    fn totals_equal_sum_of_recorded_sessions() {
        let mut data = PracticeData::default();
        let durations = [120u64, 300, 45, 600];
        for &secs in &durations {
            assert!(data.record_session(1, secs, at(1), d(1)));
        }
        let sum: u64 = durations.iter().sum();
        assert_eq!(data.total_time, sum);
        assert_eq!(data.total_sessions, durations.len() as u64);
        assert_eq!(data.history.iter().map(|r| r.duration).sum::<u64>(), sum);
    }

    #[test]
    fn per_level_counters_track_their_level() {
        let mut data = PracticeData::default();
        data.record_session(1, 100, at(1), d(1));
        data.record_session(2, 200, at(1), d(1));
        data.record_session(2, 50, at(2), d(2));

        assert_eq!(data.levels[&1].sessions, 1);
        assert_eq!(data.levels[&1].time, 100);
        assert_eq!(data.levels[&2].sessions, 2);
        assert_eq!(data.levels[&2].time, 250);
        assert_eq!(data.levels[&2].last_practiced, Some(d(2)));
    }

    #[test]
    fn five_consecutive_days_yield_streak_five() {
        let mut data = PracticeData::default();
        for day in 1..=5 {
            data.record_session(1, 60, at(day), d(day));
        }
        assert_eq!(data.streak, 5);
        assert_eq!(data.current_streak(d(5)), 5);
    }

    #[test]
    fn skipping_a_day_resets_streak() {
        let mut data = PracticeData::default();
        for day in 1..=3 {
            data.record_session(1, 60, at(day), d(day));
        }
        data.record_session(1, 60, at(5), d(5));
        assert_eq!(data.streak, 1);
    }

    #[test]
    fn same_day_sessions_leave_streak_unchanged() {
        let mut data = PracticeData::default();
        data.record_session(1, 60, at(1), d(1));
        data.record_session(2, 60, at(1), d(1));
        assert_eq!(data.streak, 1);
    }

    #[test]
    fn displayed_streak_decays_after_gap() {
        let mut data = PracticeData::default();
        data.record_session(1, 60, at(1), d(1));
        data.record_session(1, 60, at(2), d(2));
        assert_eq!(data.current_streak(d(3)), 2);
        assert_eq!(data.current_streak(d(4)), 0);
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut data = PracticeData::default();
        for i in 0..(HISTORY_CAP as u64 + 10) {
            data.record_session(1, 60 + i, at(1), d(1));
        }
        assert_eq!(data.history.len(), HISTORY_CAP);
        // Newest entry carries the last duration recorded.
        assert_eq!(data.history[0].duration, 60 + HISTORY_CAP as u64 + 9);
        // Aggregates still count everything, including dropped entries.
        assert_eq!(data.total_sessions, HISTORY_CAP as u64 + 10);
    }

    #[test]
    fn adjust_time_rejects_negative_totals() {
        let mut data = PracticeData::default();
        data.record_session(1, 600, at(1), d(1));
        assert!(!data.adjust_time(1, -11));
        assert_eq!(data.levels[&1].time, 600);
        assert_eq!(data.total_time, 600);

        assert!(data.adjust_time(1, -5));
        assert_eq!(data.levels[&1].time, 300);
        assert_eq!(data.total_time, 300);
        // History and streak untouched by manual adjustments.
        assert_eq!(data.history.len(), 1);
        assert_eq!(data.streak, 1);
    }

    #[test]
    fn adjust_time_on_fresh_level_adds_counters() {
        let mut data = PracticeData::default();
        assert!(data.adjust_time(3, 10));
        assert_eq!(data.levels[&3].time, 600);
        assert_eq!(data.levels[&3].sessions, 0);
        assert_eq!(data.total_time, 600);
    }

    #[test]
    fn recompute_streak_matches_incremental_for_contiguous_days() {
        let mut data = PracticeData::default();
        for day in 3..=6 {
            data.record_session(1, 60, at(day), d(day));
        }
        let incremental = data.streak;
        data.recompute_streak(d(6), &Utc);
        assert_eq!(data.streak, incremental);
    }

    #[test]
    fn recompute_streak_tolerates_missing_today() {
        let mut data = PracticeData::default();
        data.record_session(1, 60, at(3), d(3));
        data.record_session(1, 60, at(4), d(4));
        data.recompute_streak(d(5), &Utc);
        assert_eq!(data.streak, 2);
    }

    #[test]
    fn set_goal_updates_only_provided_fields() {
        let mut data = PracticeData::default();
        data.set_goal(1, Some(15), Some(true), None, None).unwrap();
        let goal = &data.goals[&1];
        assert_eq!(goal.target_minutes, 15);
        assert!(goal.enabled);
        // Untouched fields keep their defaults.
        assert_eq!(goal.total_target_hours, 10.0);
        assert!(!goal.total_enabled);

        data.set_goal(1, None, None, Some(2.5), Some(true)).unwrap();
        let goal = &data.goals[&1];
        assert_eq!(goal.target_minutes, 15);
        assert_eq!(goal.total_target_hours, 2.5);
        assert!(goal.total_enabled);
    }

    #[test]
    fn set_goal_rejects_invalid_targets_without_mutation() {
        let mut data = PracticeData::default();
        data.set_goal(1, Some(15), Some(true), None, None).unwrap();

        assert!(data.set_goal(1, Some(0), None, None, None).is_err());
        assert!(data.set_goal(1, None, None, Some(0.0), None).is_err());
        assert!(data.set_goal(1, None, None, Some(-1.0), None).is_err());
        assert_eq!(data.goals[&1].target_minutes, 15);
    }

    #[test]
    fn session_goal_met_requires_enabled_goal() {
        let mut data = PracticeData::default();
        assert_eq!(data.session_goal_met(1, 600), None);

        data.set_goal(1, Some(10), Some(true), None, None).unwrap();
        assert_eq!(data.session_goal_met(1, 599), Some(false));
        assert_eq!(data.session_goal_met(1, 600), Some(true));

        data.set_goal(1, None, Some(false), None, None).unwrap();
        assert_eq!(data.session_goal_met(1, 600), None);
    }

    #[test]
    fn goal_progress_clamps_at_hundred() {
        let mut data = PracticeData::default();
        data.goals.insert(
            1,
            LevelGoal {
                total_target_hours: 1.0,
                total_enabled: true,
                ..Default::default()
            },
        );
        assert_eq!(data.goal_progress_pct(1), Some(0.0));
        data.record_session(1, 1800, at(1), d(1));
        assert_eq!(data.goal_progress_pct(1), Some(50.0));
        data.record_session(1, 7200, at(1), d(1));
        assert_eq!(data.goal_progress_pct(1), Some(100.0));
        // Disabled or absent goals report nothing.
        assert_eq!(data.goal_progress_pct(2), None);
    }

    #[test]
    fn summary_reflects_counters() {
        let mut data = PracticeData::default();
        data.record_session(1, 300, at(1), d(1));
        data.record_session(2, 120, at(2), d(2));
        let summary = data.summary(d(2));
        assert_eq!(summary.total_sessions, 2);
        assert_eq!(summary.total_time, 420);
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.levels.len(), 2);
    }

    #[test]
    fn persisted_layout_uses_camel_case_keys() {
        let mut data = PracticeData::default();
        data.record_session(1, 60, at(1), d(1));
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("totalSessions").is_some());
        assert!(json.get("totalTime").is_some());
        assert!(json.get("streakLastDate").is_some());
        assert!(json.get("lastSessionDate").is_some());
        assert!(json["levels"]["1"].get("lastPracticed").is_some());
    }

    #[test]
    fn load_replaces_malformed_blob_with_default() {
        let db = Database::open_memory().unwrap();
        db.kv_set(PRACTICE_DATA_KEY, "{ not json").unwrap();
        let data = PracticeData::load(&db);
        assert_eq!(data, PracticeData::default());
    }

    #[test]
    fn persist_then_load_roundtrips() {
        let db = Database::open_memory().unwrap();
        let mut data = PracticeData::default();
        data.record_session(2, 300, at(1), d(1));
        data.persist(&db);
        assert_eq!(PracticeData::load(&db), data);
    }

    proptest! {
        #[test]
        fn aggregate_sum_invariant(durations in prop::collection::vec(0u64..3600, 0..40)) {
            let mut data = PracticeData::default();
            let mut day = d(1);
            let mut stamp = at(1);
            for &secs in &durations {
                data.record_session(1, secs, stamp, day);
                day = day.succ_opt().unwrap();
                stamp = stamp + Duration::days(1);
            }
            let expected: u64 = durations.iter().filter(|&&s| s >= MIN_SESSION_SECS).sum();
            let expected_count = durations.iter().filter(|&&s| s >= MIN_SESSION_SECS).count() as u64;
            prop_assert_eq!(data.total_time, expected);
            prop_assert_eq!(data.total_sessions, expected_count);
        }
    }
}
