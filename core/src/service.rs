use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Days, Local, NaiveDate, Utc, Weekday};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::csv_export;
use crate::db::Database;
use crate::error::StoreError;
use crate::migrate;
use crate::models::{
    BACKUP_VERSION, BackupDocument, CalendarDay, DailyLogEntry, Goal, GoalExtras, ImportMode,
    ImportSummary, LegacyChecklist, LegacyShape, LegacyStreakCache, LogPatch, LogStats, MAX_LOGS,
    MetricEntry, MigrationSummary, NewMetricEntry, StreakSnapshot, WaterIntake, WorkoutDays,
    WorkoutWeek,
};
use crate::store::{
    CHECKLIST_KEY, DAILY_LOGS_KEY, LogStore, METRICS_KEY, STREAK_KEY, WATER_KEY,
    WORKOUT_BADGES_KEY,
};
use crate::streak;

/// Weeks of workout badges kept.
const MAX_BADGE_WEEKS: usize = 8;

/// The caller's current local date.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Daily goal log on top of a [`LogStore`].
///
/// Every operation is a full read-modify-write of the stored collection. Two
/// writers interleaving on the same store can lose an update (last write wins);
/// the service assumes one interactive session at a time.
pub struct DailyLogService<S: LogStore> {
    store: S,
}

impl DailyLogService<Database> {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(db_path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }
}

impl<S: LogStore> DailyLogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Raw namespace access ---

    fn read_json<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        match self.store.read(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Corrupt { key, source }),
            None => Ok(None),
        }
    }

    /// Like `read_json`, but a corrupt payload reads as absent.
    fn read_json_lenient<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>> {
        match self.read_json(key) {
            Ok(value) => Ok(value),
            Err(e) if e.is_corrupt() => {
                warn!(key, error = %e, "ignoring unreadable stored payload");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Strict read for read-modify-write paths: an unreadable payload aborts the
    /// write instead of being replaced by a collection built from nothing.
    fn read_for_update<T: DeserializeOwned + Default>(&self, key: &'static str) -> Result<T> {
        Ok(self
            .read_json(key)
            .with_context(|| format!("Refusing to overwrite unreadable data under '{key}'"))?
            .unwrap_or_default())
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<()> {
        let raw =
            serde_json::to_string(value).map_err(|source| StoreError::Serialize { key, source })?;
        self.store.write(key, &raw)?;
        Ok(())
    }

    fn save_logs(&self, logs: &[DailyLogEntry]) -> Result<()> {
        self.write_json(DAILY_LOGS_KEY, logs)
    }

    // --- Unified daily log ---

    /// Full retained history, newest insertion first. A corrupt collection reads
    /// as empty.
    pub fn get_all(&self) -> Result<Vec<DailyLogEntry>> {
        Ok(self
            .read_json_lenient::<Vec<DailyLogEntry>>(DAILY_LOGS_KEY)?
            .unwrap_or_default())
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Result<Option<DailyLogEntry>> {
        Ok(self.get_all()?.into_iter().find(|e| e.date == date))
    }

    pub fn get_today(&self) -> Result<Option<DailyLogEntry>> {
        self.get_by_date(today())
    }

    /// Merge `patch` into the entry for its date, or create that entry.
    ///
    /// New entries go to the head of the collection, which is then cut back to
    /// [`MAX_LOGS`] from the tail.
    ///
    /// Fails without writing when the stored collection cannot be decoded.
    pub fn upsert(&self, patch: LogPatch) -> Result<DailyLogEntry> {
        let mut logs: Vec<DailyLogEntry> = self.read_for_update(DAILY_LOGS_KEY)?;
        let now = Utc::now();

        if let Some(existing) = logs.iter_mut().find(|e| e.date == patch.date) {
            patch.apply_to(existing);
            existing.updated_at = existing.updated_at.max(now);
            let updated = existing.clone();
            self.save_logs(&logs)?;
            debug!(date = %updated.date, "updated daily log");
            return Ok(updated);
        }

        let entry = patch.into_entry(now);
        logs.insert(0, entry.clone());
        if logs.len() > MAX_LOGS {
            debug!(dropped = logs.len() - MAX_LOGS, "trimming daily logs");
            logs.truncate(MAX_LOGS);
        }
        self.save_logs(&logs)?;
        debug!(date = %entry.date, "created daily log");
        Ok(entry)
    }

    /// Set one goal flag for today, leaving the other flags as they are.
    pub fn update_goal(&self, goal: Goal, value: bool, extras: &GoalExtras) -> Result<DailyLogEntry> {
        self.update_goal_on(today(), goal, value, extras)
    }

    pub fn update_goal_on(
        &self,
        date: NaiveDate,
        goal: Goal,
        value: bool,
        extras: &GoalExtras,
    ) -> Result<DailyLogEntry> {
        let patch = LogPatch::new(date)
            .with_goal(goal, value)
            .with_extras(extras);
        self.upsert(patch)
    }

    pub fn set_notes(&self, date: NaiveDate, notes: &str) -> Result<DailyLogEntry> {
        let mut patch = LogPatch::new(date);
        patch.notes = Some(notes.to_string());
        self.upsert(patch)
    }

    /// Entries with `start <= date <= end`, in stored order.
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyLogEntry>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect())
    }

    pub fn get_recent(&self, days: u32) -> Result<Vec<DailyLogEntry>> {
        self.get_recent_from(today(), days)
    }

    /// Entries dated on or after `today - days`, newest date first.
    pub fn get_recent_from(&self, today: NaiveDate, days: u32) -> Result<Vec<DailyLogEntry>> {
        let cutoff = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        let mut logs: Vec<DailyLogEntry> = self
            .get_all()?
            .into_iter()
            .filter(|e| e.date >= cutoff)
            .collect();
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    pub fn get_stats(&self, days: u32) -> Result<LogStats> {
        self.get_stats_from(today(), days)
    }

    pub fn get_stats_from(&self, today: NaiveDate, days: u32) -> Result<LogStats> {
        Ok(LogStats::from_entries(&self.get_recent_from(today, days)?))
    }

    pub fn export_all(&self) -> Result<Vec<DailyLogEntry>> {
        self.get_all()
    }

    /// Bring `entries` into the store. Returns how many dates were added.
    ///
    /// Merging only adds dates not stored yet, so importing the same export
    /// twice is a no-op the second time; the merged collection is re-sorted
    /// newest date first and capped at [`MAX_LOGS`]. Replacing keeps the first
    /// occurrence of each date in input order and cuts the tail past
    /// [`MAX_LOGS`], the same insertion-order rule as [`Self::upsert`].
    pub fn import_merge(&self, entries: Vec<DailyLogEntry>, mode: ImportMode) -> Result<usize> {
        match mode {
            ImportMode::Merge => {
                let mut logs: Vec<DailyLogEntry> = self.read_for_update(DAILY_LOGS_KEY)?;
                let mut seen: HashSet<NaiveDate> = logs.iter().map(|e| e.date).collect();
                let before = logs.len();
                logs.extend(entries.into_iter().filter(|e| seen.insert(e.date)));
                let added = logs.len() - before;

                if added == 0 {
                    debug!("import added no new dates");
                    return Ok(0);
                }

                logs.sort_by(|a, b| b.date.cmp(&a.date));
                logs.truncate(MAX_LOGS);
                self.save_logs(&logs)?;
                debug!(added, total = logs.len(), "merged daily logs");
                Ok(added)
            }
            ImportMode::Replace => {
                let mut seen = HashSet::new();
                let mut logs: Vec<DailyLogEntry> = entries
                    .into_iter()
                    .filter(|e| seen.insert(e.date))
                    .collect();
                logs.truncate(MAX_LOGS);
                self.save_logs(&logs)?;
                debug!(total = logs.len(), "replaced daily logs");
                Ok(logs.len())
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(DAILY_LOGS_KEY)?;
        Ok(())
    }

    // --- Widget state (legacy namespaces) ---

    pub fn get_checklist(&self) -> Result<Option<LegacyChecklist>> {
        self.read_json_lenient(CHECKLIST_KEY)
    }

    /// Store the single-day checklist and mirror its flags into the daily log.
    pub fn record_checklist(&self, checklist: &LegacyChecklist) -> Result<DailyLogEntry> {
        self.write_json(CHECKLIST_KEY, checklist)?;
        self.upsert(LogPatch::new(checklist.date).with_flags(
            checklist.protein,
            checklist.steps,
            checklist.water,
            checklist.workout,
        ))
    }

    pub fn get_water_intake(&self) -> Result<Option<WaterIntake>> {
        self.read_json_lenient(WATER_KEY)
    }

    pub fn set_water_glasses(&self, glasses: u32) -> Result<DailyLogEntry> {
        self.set_water_glasses_on(today(), glasses)
    }

    /// Record today's glass count. The water goal is met at
    /// [`crate::models::WATER_GOAL_ML`]; a checklist for the same day is kept in
    /// step.
    pub fn set_water_glasses_on(&self, today: NaiveDate, glasses: u32) -> Result<DailyLogEntry> {
        let intake = WaterIntake {
            date: today,
            glasses,
        };
        let goal_met = intake.goal_met();
        self.write_json(WATER_KEY, &intake)?;

        let extras = GoalExtras {
            water_glasses: Some(glasses),
            notes: None,
        };
        let entry = self.update_goal_on(today, Goal::Water, goal_met, &extras)?;

        if let Some(mut checklist) = self.get_checklist()? {
            if checklist.date == today {
                checklist.water = goal_met;
                self.write_json(CHECKLIST_KEY, &checklist)?;
            }
        }
        Ok(entry)
    }

    pub fn get_workout_badges(&self) -> Result<Vec<WorkoutWeek>> {
        Ok(self
            .read_json_lenient::<Vec<WorkoutWeek>>(WORKOUT_BADGES_KEY)?
            .unwrap_or_default())
    }

    /// Mark a Monday/Wednesday/Friday session in the week containing `today`.
    pub fn set_workout_badge_on(
        &self,
        today: NaiveDate,
        day: Weekday,
        done: bool,
    ) -> Result<Vec<WorkoutWeek>> {
        let Some(week_start) = today.checked_sub_days(Days::new(u64::from(
            today.weekday().num_days_from_monday(),
        ))) else {
            bail!("Date out of range: {today}");
        };
        let mut weeks = self.get_workout_badges()?;

        if !weeks.iter().any(|w| w.week_start == week_start) {
            weeks.push(WorkoutWeek {
                week_start,
                completed: WorkoutDays::default(),
            });
            if weeks.len() > MAX_BADGE_WEEKS {
                weeks.drain(..weeks.len() - MAX_BADGE_WEEKS);
            }
        }

        let Some(week) = weeks.iter_mut().find(|w| w.week_start == week_start) else {
            bail!("Current week missing from workout badges");
        };
        match day {
            Weekday::Mon => week.completed.monday = done,
            Weekday::Wed => week.completed.wednesday = done,
            Weekday::Fri => week.completed.friday = done,
            other => bail!("No scheduled workout on {other}. Use mon, wed, or fri"),
        }

        self.write_json(WORKOUT_BADGES_KEY, &weeks)?;
        Ok(weeks)
    }

    // --- Body metrics ---

    pub fn get_metrics(&self) -> Result<Vec<MetricEntry>> {
        Ok(self
            .read_json_lenient::<Vec<MetricEntry>>(METRICS_KEY)?
            .unwrap_or_default())
    }

    /// Record a check-in. Ids are millisecond timestamps, bumped past the
    /// largest stored id so two check-ins in the same millisecond stay distinct.
    pub fn add_metric(&self, new: NewMetricEntry) -> Result<MetricEntry> {
        if new.is_empty() {
            bail!("Provide at least one of waist, weight, or photos");
        }
        for (name, value) in [("Waist", new.waist), ("Weight", new.weight)] {
            if value.is_some_and(|v| !v.is_finite() || v <= 0.0) {
                bail!("{name} must be greater than 0");
            }
        }

        let mut entries: Vec<MetricEntry> = self.read_for_update(METRICS_KEY)?;
        let next_id = entries
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(i64::MIN, |m| m.saturating_add(1));
        let entry = new.into_entry(Utc::now().timestamp_millis().max(next_id));

        entries.insert(0, entry.clone());
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        self.write_json(METRICS_KEY, &entries)?;
        debug!(id = entry.id, date = %entry.date, "added metric entry");
        Ok(entry)
    }

    /// Returns false when no entry has `id`.
    pub fn delete_metric(&self, id: i64) -> Result<bool> {
        let mut entries: Vec<MetricEntry> = self.read_for_update(METRICS_KEY)?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_json(METRICS_KEY, &entries)?;
        debug!(id, "deleted metric entry");
        Ok(true)
    }

    /// Metrics from a backup: merge adds unknown ids, replace overwrites.
    fn import_metrics(&self, incoming: Vec<MetricEntry>, mode: ImportMode) -> Result<usize> {
        let mut entries: Vec<MetricEntry> = match mode {
            ImportMode::Merge => self.read_for_update(METRICS_KEY)?,
            ImportMode::Replace => Vec::new(),
        };
        let mut seen: HashSet<i64> = entries.iter().map(|e| e.id).collect();
        let before = entries.len();
        entries.extend(incoming.into_iter().filter(|e| seen.insert(e.id)));
        let added = entries.len() - before;

        if mode == ImportMode::Merge && added == 0 {
            return Ok(0);
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        self.write_json(METRICS_KEY, &entries)?;
        Ok(added)
    }

    // --- Streaks ---

    pub fn cached_streak(&self) -> Result<Option<LegacyStreakCache>> {
        self.read_json_lenient(STREAK_KEY)
    }

    pub fn refresh_streak(&self, window: u32) -> Result<StreakSnapshot> {
        self.refresh_streak_on(today(), window)
    }

    /// Recompute streaks from the daily log and rewrite the streak cache.
    ///
    /// The cached best streak is kept when it beats what the window shows, since
    /// older runs may have scrolled out of the window.
    pub fn refresh_streak_on(&self, today: NaiveDate, window: u32) -> Result<StreakSnapshot> {
        let history = streak::goal_counts(&self.get_all()?);
        let mut snapshot = streak::compute_streak(&history, today, window);

        if let Some(cached) = self.cached_streak()? {
            snapshot.longest_streak = snapshot.longest_streak.max(cached.longest_streak);
        }

        let cache = LegacyStreakCache {
            days: streak::window_days(&history, today, window),
            current_streak: snapshot.current_streak,
            longest_streak: snapshot.longest_streak,
        };
        self.write_json(STREAK_KEY, &cache)?;
        debug!(
            current = snapshot.current_streak,
            longest = snapshot.longest_streak,
            "refreshed streak cache"
        );
        Ok(snapshot)
    }

    pub fn calendar_on(&self, today: NaiveDate, weeks: u32) -> Result<Vec<Vec<CalendarDay>>> {
        let history = streak::goal_counts(&self.get_all()?);
        Ok(streak::calendar_weeks(&history, today, weeks))
    }

    // --- Legacy migration ---

    /// Backfill the daily log from the legacy checklist and streak cache.
    ///
    /// Only dates without a unified entry are written; legacy data is left in
    /// place, so running this repeatedly changes nothing after the first run.
    pub fn migrate_legacy(&self) -> Result<MigrationSummary> {
        let mut summary = MigrationSummary::default();
        let mut known: HashSet<NaiveDate> = self.get_all()?.iter().map(|e| e.date).collect();

        let mut sources = Vec::new();
        if let Some(checklist) = self.get_checklist()? {
            sources.push(LegacyShape::Checklist(checklist));
        }
        if let Some(cache) = self.cached_streak()? {
            sources.push(LegacyShape::StreakCache(cache));
        }

        for shape in &sources {
            for patch in migrate::backfill_patches(shape) {
                if !known.insert(patch.date) {
                    summary.skipped_existing += 1;
                    continue;
                }
                self.upsert(patch)?;
                match shape {
                    LegacyShape::Checklist(_) => summary.checklist_migrated += 1,
                    LegacyShape::StreakCache(_) => summary.streak_days_migrated += 1,
                }
            }
        }

        debug!(
            checklist = summary.checklist_migrated,
            streak_days = summary.streak_days_migrated,
            skipped = summary.skipped_existing,
            "legacy migration finished"
        );
        Ok(summary)
    }

    // --- Backup / export ---

    pub fn export_backup(&self) -> Result<BackupDocument> {
        let badges = self.get_workout_badges()?;
        let metrics = self.get_metrics()?;
        Ok(BackupDocument {
            version: BACKUP_VERSION,
            exported_at: Some(Utc::now()),
            daily_logs: Some(self.export_all()?),
            checklist: self.get_checklist()?,
            workout_badges: if badges.is_empty() { None } else { Some(badges) },
            water_intake: self.get_water_intake()?,
            progress_metrics: if metrics.is_empty() { None } else { Some(metrics) },
        })
    }

    pub fn export_backup_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_backup()?)?)
    }

    /// Restore a backup document.
    ///
    /// The document is fully parsed before anything is written; a malformed
    /// document is an error and the store stays as it was. Sections missing from
    /// the document are left alone.
    pub fn import_backup(&self, text: &str, mode: ImportMode) -> Result<ImportSummary> {
        let doc: BackupDocument =
            serde_json::from_str(text).map_err(StoreError::MalformedBackup)?;

        let logs_before = self.get_all()?.len();
        let logs_added = match doc.daily_logs {
            Some(logs) => self.import_merge(logs, mode)?,
            None => 0,
        };
        let logs_after = self.get_all()?.len();

        let mut summary = ImportSummary {
            logs_before,
            logs_after,
            logs_added,
            ..ImportSummary::default()
        };

        if let Some(checklist) = &doc.checklist {
            self.write_json(CHECKLIST_KEY, checklist)?;
            summary.checklist_restored = true;
        }
        if let Some(water) = &doc.water_intake {
            self.write_json(WATER_KEY, water)?;
            summary.water_restored = true;
        }
        if let Some(badges) = &doc.workout_badges {
            self.write_json(WORKOUT_BADGES_KEY, badges)?;
            summary.badges_restored = true;
        }
        if let Some(metrics) = doc.progress_metrics {
            summary.metrics_added = self.import_metrics(metrics, mode)?;
        }

        Ok(summary)
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        csv_export::write_logs_csv(&self.get_all()?, writer)
    }
}
