//! Backfill of the unified daily log from older storage shapes.
//!
//! The translations are pure; `DailyLogService::migrate_legacy` decides which of
//! the produced patches are applied (only dates with no unified entry yet).

use crate::models::{Goal, LegacyChecklist, LegacyShape, LegacyStreakCache, LogPatch};

/// Translate a legacy shape into the entries it implies.
#[must_use]
pub fn backfill_patches(shape: &LegacyShape) -> Vec<LogPatch> {
    match shape {
        LegacyShape::Checklist(checklist) => vec![from_checklist(checklist)],
        LegacyShape::StreakCache(cache) => from_streak_cache(cache),
    }
}

fn from_checklist(checklist: &LegacyChecklist) -> LogPatch {
    LogPatch::new(checklist.date).with_flags(
        checklist.protein,
        checklist.steps,
        checklist.water,
        checklist.workout,
    )
}

/// The cache only kept a goal count per day, so flags are reconstructed by
/// filling `Goal::ALL` in order up to that count. This is lossy: a day with two
/// goals always comes back as protein + steps.
fn from_streak_cache(cache: &LegacyStreakCache) -> Vec<LogPatch> {
    cache
        .days
        .iter()
        .filter(|day| day.completed_goals > 0)
        .map(|day| {
            Goal::ALL
                .iter()
                .enumerate()
                .fold(LogPatch::new(day.date), |patch, (i, goal)| {
                    patch.with_goal(*goal, usize::from(day.completed_goals) > i)
                })
        })
        .collect()
}
