//! Consecutive-day streak computation.
//!
//! Two algorithms exist in the wild for this data model. The incremental
//! day-diff rule (`bump`) is canonical and runs when a session is recorded;
//! the full-history backward scan (`scan`) is kept for recomputing a streak
//! from history alone.

use std::collections::HashSet;

use chrono::NaiveDate;

/// Furthest the backward scan will walk.
const SCAN_LIMIT_DAYS: u32 = 365;

/// Incremental streak update applied when a session is recorded on `today`.
///
/// Same day as the last recorded session: unchanged. Exactly one day later:
/// +1. Anything else (including no prior session): reset to 1.
pub fn bump(streak: u32, last: Option<NaiveDate>, today: NaiveDate) -> u32 {
    match last {
        None => 1,
        Some(last) => match (today - last).num_days() {
            0 => streak,
            1 => streak + 1,
            _ => 1,
        },
    }
}

/// Count consecutive practice days walking backward from `today` over the
/// set of session dates. A missing "today" entry does not break the count;
/// the walk simply starts from yesterday.
pub fn scan<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = NaiveDate>,
{
    let set: HashSet<NaiveDate> = dates.into_iter().collect();
    if set.is_empty() {
        return 0;
    }

    let mut streak = 0;
    let mut check = today;
    for i in 0..SCAN_LIMIT_DAYS {
        if set.contains(&check) {
            streak += 1;
        } else if i > 0 {
            break;
        }
        match check.pred_opt() {
            Some(prev) => check = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn bump_first_session_starts_at_one() {
        assert_eq!(bump(0, None, d(2026, 3, 1)), 1);
    }

    #[test]
    fn bump_same_day_unchanged() {
        assert_eq!(bump(4, Some(d(2026, 3, 1)), d(2026, 3, 1)), 4);
    }

    #[test]
    fn bump_next_day_increments() {
        assert_eq!(bump(4, Some(d(2026, 3, 1)), d(2026, 3, 2)), 5);
    }

    #[test]
    fn bump_gap_resets() {
        assert_eq!(bump(4, Some(d(2026, 3, 1)), d(2026, 3, 4)), 1);
    }

    #[test]
    fn scan_empty_is_zero() {
        assert_eq!(scan(std::iter::empty(), d(2026, 3, 1)), 0);
    }

    #[test]
    fn scan_counts_consecutive_days() {
        let dates = vec![d(2026, 3, 1), d(2026, 3, 2), d(2026, 3, 3)];
        assert_eq!(scan(dates, d(2026, 3, 3)), 3);
    }

    #[test]
    fn scan_tolerates_missing_today() {
        let dates = vec![d(2026, 3, 1), d(2026, 3, 2)];
        assert_eq!(scan(dates, d(2026, 3, 3)), 2);
    }

    #[test]
    fn scan_breaks_on_gap() {
        let dates = vec![d(2026, 2, 25), d(2026, 3, 2), d(2026, 3, 3)];
        assert_eq!(scan(dates, d(2026, 3, 3)), 2);
    }

    #[test]
    fn scan_duplicate_dates_count_once() {
        let dates = vec![d(2026, 3, 3), d(2026, 3, 3), d(2026, 3, 2)];
        assert_eq!(scan(dates, d(2026, 3, 3)), 2);
    }
}
