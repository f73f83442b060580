//! Consecutive-day streaks and the activity calendar.
//!
//! Everything here works on a sparse map of `date -> completed goal count`, so the
//! same code serves the unified log store and the legacy streak cache.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::models::{
    COMPLETED_GOAL_THRESHOLD, CalendarDay, DailyLogEntry, LegacyStreakDay, StreakSnapshot,
};

/// Lookback used by the activity widget.
pub const DEFAULT_WINDOW_DAYS: u32 = 35;

/// Weeks shown in the activity calendar.
pub const DEFAULT_CALENDAR_WEEKS: u32 = 5;

/// Project log entries to completed-goal counts per day.
#[must_use]
pub fn goal_counts(entries: &[DailyLogEntry]) -> BTreeMap<NaiveDate, u8> {
    entries
        .iter()
        .map(|e| (e.date, e.completed_goals()))
        .collect()
}

/// Walk back from `today` for `window` days and derive the current and longest
/// streak.
///
/// Today is allowed to be unfinished: if it does not (yet) meet the threshold the
/// walk moves on to yesterday without breaking anything. The first other gap
/// either ends the current streak, or, when no current streak exists, resets the
/// running counter so older runs still count towards the longest streak.
#[must_use]
pub fn compute_streak(
    history: &BTreeMap<NaiveDate, u8>,
    today: NaiveDate,
    window: u32,
) -> StreakSnapshot {
    let mut current: u32 = 0;
    let mut longest: u32 = 0;
    let mut run: u32 = 0;
    let mut unbroken = true;

    for offset in 0..window {
        let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
            break;
        };
        let completed = history
            .get(&date)
            .is_some_and(|&count| count >= COMPLETED_GOAL_THRESHOLD);

        if completed {
            run += 1;
            if unbroken {
                current = run;
            }
        } else if offset == 0 {
            continue;
        } else {
            longest = longest.max(run);
            if current > 0 {
                break;
            }
            unbroken = false;
            run = 0;
        }
    }

    StreakSnapshot {
        current_streak: current,
        longest_streak: longest.max(run),
    }
}

/// Days inside the window that have a record, newest first, in the legacy cache
/// shape.
#[must_use]
pub fn window_days(
    history: &BTreeMap<NaiveDate, u8>,
    today: NaiveDate,
    window: u32,
) -> Vec<LegacyStreakDay> {
    let Some(oldest) = today.checked_sub_days(Days::new(u64::from(window.saturating_sub(1))))
    else {
        return Vec::new();
    };
    if window == 0 {
        return Vec::new();
    }
    history
        .range(oldest..=today)
        .rev()
        .map(|(&date, &completed_goals)| LegacyStreakDay {
            date,
            completed_goals,
        })
        .collect()
}

/// Calendar grid of `weeks` rows, each starting on a Sunday, ending with the week
/// that contains `today`.
#[must_use]
pub fn calendar_weeks(
    history: &BTreeMap<NaiveDate, u8>,
    today: NaiveDate,
    weeks: u32,
) -> Vec<Vec<CalendarDay>> {
    if weeks == 0 {
        return Vec::new();
    }
    let back = u64::from(weeks - 1) * 7 + u64::from(today.weekday().num_days_from_sunday());
    let Some(start) = today.checked_sub_days(Days::new(back)) else {
        return Vec::new();
    };

    start
        .iter_days()
        .take(weeks as usize * 7)
        .map(|date| CalendarDay {
            date,
            completed_goals: history.get(&date).copied().unwrap_or(0),
            is_today: date == today,
            is_future: date > today,
        })
        .collect::<Vec<_>>()
        .chunks(7)
        .map(<[CalendarDay]>::to_vec)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2024, 6, 19).unwrap()
    }

    fn ago(days: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(days)).unwrap()
    }

    fn history(days: &[(u64, u8)]) -> BTreeMap<NaiveDate, u8> {
        days.iter().map(|&(back, count)| (ago(back), count)).collect()
    }

    #[test]
    fn test_empty_history() {
        let snap = compute_streak(&BTreeMap::new(), today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap, StreakSnapshot::default());
    }

    #[test]
    fn test_current_run_ending_today() {
        // today..4 days back complete, 5 back missing, 6 back incomplete, 7 back complete
        let h = history(&[(0, 4), (1, 3), (2, 3), (3, 4), (4, 3), (6, 1), (7, 4)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 5);
        assert!(snap.longest_streak >= 5);
    }

    #[test]
    fn test_today_missing_does_not_break_streak() {
        let h = history(&[(1, 3), (2, 3), (3, 4), (4, 3), (5, 4), (6, 3)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 6);
        assert_eq!(snap.longest_streak, 6);
    }

    #[test]
    fn test_today_incomplete_is_skipped() {
        let h = history(&[(0, 2), (1, 3), (2, 3)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 2);
    }

    #[test]
    fn test_gap_right_before_today() {
        let h = history(&[(0, 4), (2, 4), (3, 4)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 1);
        assert_eq!(snap.longest_streak, 1);
    }

    #[test]
    fn test_no_current_streak_finds_longest_past_run() {
        // yesterday missing, then a 2-run, a gap, then a 4-run
        let h = history(&[(2, 3), (3, 3), (5, 4), (6, 4), (7, 4), (8, 4), (10, 3)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 0);
        assert_eq!(snap.longest_streak, 4);
    }

    #[test]
    fn test_full_window() {
        let h: BTreeMap<_, _> = (0..10).map(|d| (ago(d), 4)).collect();
        let snap = compute_streak(&h, today(), 7);
        assert_eq!(snap.current_streak, 7);
        assert_eq!(snap.longest_streak, 7);

        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert_eq!(snap.current_streak, 10);
        assert_eq!(snap.longest_streak, 10);
    }

    #[test]
    fn test_zero_window() {
        let h = history(&[(0, 4)]);
        assert_eq!(compute_streak(&h, today(), 0), StreakSnapshot::default());
        assert!(window_days(&h, today(), 0).is_empty());
    }

    #[test]
    fn test_current_never_exceeds_longest() {
        let h = history(&[(0, 3), (1, 3), (3, 3), (4, 3), (5, 3)]);
        let snap = compute_streak(&h, today(), DEFAULT_WINDOW_DAYS);
        assert!(snap.current_streak <= snap.longest_streak);
        assert_eq!(snap.current_streak, 2);
    }

    #[test]
    fn test_window_days_newest_first_and_bounded() {
        let h = history(&[(0, 1), (3, 2), (6, 3), (7, 4)]);
        let days = window_days(&h, today(), 7);
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![ago(0), ago(3), ago(6)]);
        assert_eq!(days[1].completed_goals, 2);
    }

    #[test]
    fn test_calendar_starts_on_sunday() {
        let h = history(&[(0, 4), (1, 2)]);
        let weeks = calendar_weeks(&h, today(), DEFAULT_CALENDAR_WEEKS);
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.len() == 7));
        assert_eq!(
            weeks[0][0].date,
            NaiveDate::from_ymd_opt(2024, 5, 19).unwrap()
        );

        let last = &weeks[4];
        // Sunday 16th .. Saturday 22nd, today is the Wednesday.
        assert!(last[3].is_today);
        assert_eq!(last[3].completed_goals, 4);
        assert_eq!(last[2].completed_goals, 2);
        assert!(last[4].is_future);
        assert!(!last[2].is_future);
    }
}
