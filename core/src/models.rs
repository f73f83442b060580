use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;

/// Maximum number of daily log records kept in the unified collection.
pub const MAX_LOGS: usize = 365;

/// A day counts towards a streak once this many goals are met.
pub const COMPLETED_GOAL_THRESHOLD: u8 = 3;

pub const WATER_GLASS_ML: u32 = 250;
pub const WATER_GOAL_ML: u32 = 2500;

pub const BACKUP_VERSION: u32 = 1;

/// One of the four daily goal flags.
///
/// `Goal::ALL` is also the fixed order used when a legacy goal count has to be
/// turned back into individual flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Protein,
    Steps,
    Water,
    Workout,
}

impl Goal {
    pub const ALL: [Goal; 4] = [Goal::Protein, Goal::Steps, Goal::Water, Goal::Workout];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Goal::Protein => "protein",
            Goal::Steps => "steps",
            Goal::Water => "water",
            Goal::Workout => "workout",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "protein" => Ok(Goal::Protein),
            "steps" => Ok(Goal::Steps),
            "water" => Ok(Goal::Water),
            "workout" => Ok(Goal::Workout),
            _ => Err(StoreError::InvalidGoal(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLogEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub protein: bool,
    #[serde(default)]
    pub steps: bool,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub workout: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_glasses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl DailyLogEntry {
    #[must_use]
    pub fn goal(&self, goal: Goal) -> bool {
        match goal {
            Goal::Protein => self.protein,
            Goal::Steps => self.steps,
            Goal::Water => self.water,
            Goal::Workout => self.workout,
        }
    }

    pub fn set_goal(&mut self, goal: Goal, value: bool) {
        match goal {
            Goal::Protein => self.protein = value,
            Goal::Steps => self.steps = value,
            Goal::Water => self.water = value,
            Goal::Workout => self.workout = value,
        }
    }

    #[must_use]
    pub fn completed_goals(&self) -> u8 {
        Goal::ALL.iter().filter(|g| self.goal(**g)).count() as u8
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.completed_goals() == 4
    }

    /// Whether the day counts towards a streak.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_goals() >= COMPLETED_GOAL_THRESHOLD
    }
}

/// Partial entry used for merge-on-write.
///
/// `None` fields leave the stored value untouched; on a brand-new entry missing
/// flags default to `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPatch {
    pub date: NaiveDate,
    pub protein: Option<bool>,
    pub steps: Option<bool>,
    pub water: Option<bool>,
    pub workout: Option<bool>,
    pub water_glasses: Option<u32>,
    pub notes: Option<String>,
}

impl LogPatch {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            protein: None,
            steps: None,
            water: None,
            workout: None,
            water_glasses: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_goal(mut self, goal: Goal, value: bool) -> Self {
        let slot = match goal {
            Goal::Protein => &mut self.protein,
            Goal::Steps => &mut self.steps,
            Goal::Water => &mut self.water,
            Goal::Workout => &mut self.workout,
        };
        *slot = Some(value);
        self
    }

    #[must_use]
    pub fn with_flags(self, protein: bool, steps: bool, water: bool, workout: bool) -> Self {
        self.with_goal(Goal::Protein, protein)
            .with_goal(Goal::Steps, steps)
            .with_goal(Goal::Water, water)
            .with_goal(Goal::Workout, workout)
    }

    #[must_use]
    pub fn with_extras(mut self, extras: &GoalExtras) -> Self {
        if extras.water_glasses.is_some() {
            self.water_glasses = extras.water_glasses;
        }
        if extras.notes.is_some() {
            self.notes.clone_from(&extras.notes);
        }
        self
    }

    /// Shallow merge into an existing entry.
    pub fn apply_to(&self, entry: &mut DailyLogEntry) {
        for goal in Goal::ALL {
            if let Some(value) = self.goal(goal) {
                entry.set_goal(goal, value);
            }
        }
        if self.water_glasses.is_some() {
            entry.water_glasses = self.water_glasses;
        }
        if self.notes.is_some() {
            entry.notes.clone_from(&self.notes);
        }
    }

    #[must_use]
    pub fn into_entry(self, updated_at: DateTime<Utc>) -> DailyLogEntry {
        DailyLogEntry {
            date: self.date,
            protein: self.protein.unwrap_or(false),
            steps: self.steps.unwrap_or(false),
            water: self.water.unwrap_or(false),
            workout: self.workout.unwrap_or(false),
            water_glasses: self.water_glasses,
            notes: self.notes,
            updated_at,
        }
    }

    fn goal(&self, goal: Goal) -> Option<bool> {
        match goal {
            Goal::Protein => self.protein,
            Goal::Steps => self.steps,
            Goal::Water => self.water,
            Goal::Workout => self.workout,
        }
    }
}

/// Auxiliary fields that ride along with a single goal update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalExtras {
    pub water_glasses: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total_days: u32,
    pub protein_days: u32,
    pub steps_days: u32,
    pub water_days: u32,
    pub workout_days: u32,
    pub perfect_days: u32,
    pub protein_rate: u32,
    pub steps_rate: u32,
    pub water_rate: u32,
    pub workout_rate: u32,
    pub perfect_rate: u32,
}

impl LogStats {
    #[must_use]
    pub fn from_entries(entries: &[DailyLogEntry]) -> Self {
        let count = |pred: &dyn Fn(&DailyLogEntry) -> bool| -> u32 {
            entries.iter().filter(|e| pred(*e)).count() as u32
        };

        let total_days = entries.len() as u32;
        let protein_days = count(&|e: &DailyLogEntry| e.protein);
        let steps_days = count(&|e: &DailyLogEntry| e.steps);
        let water_days = count(&|e: &DailyLogEntry| e.water);
        let workout_days = count(&|e: &DailyLogEntry| e.workout);
        let perfect_days = count(&DailyLogEntry::is_perfect);

        Self {
            total_days,
            protein_days,
            steps_days,
            water_days,
            workout_days,
            perfect_days,
            protein_rate: rate(protein_days, total_days),
            steps_rate: rate(steps_days, total_days),
            water_rate: rate(water_days, total_days),
            workout_rate: rate(workout_days, total_days),
            perfect_rate: rate(perfect_days, total_days),
        }
    }
}

/// Whole-number percentage, 0 when there is nothing to divide by.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn rate(count: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(count) / f64::from(total) * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSnapshot {
    pub current_streak: u32,
    pub longest_streak: u32,
}

// --- Legacy storage shapes ---

/// The single-day checklist written by the legacy tracking widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyChecklist {
    pub date: NaiveDate,
    #[serde(default)]
    pub protein: bool,
    #[serde(default)]
    pub steps: bool,
    #[serde(default)]
    pub water: bool,
    #[serde(default)]
    pub workout: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyStreakDay {
    pub date: NaiveDate,
    #[serde(rename = "completedGoals", alias = "completedGoalCount", default)]
    pub completed_goals: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStreakCache {
    #[serde(default)]
    pub days: Vec<LegacyStreakDay>,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
}

#[derive(Debug, Clone)]
pub enum LegacyShape {
    Checklist(LegacyChecklist),
    StreakCache(LegacyStreakCache),
}

// --- Widget state carried in backups ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterIntake {
    pub date: NaiveDate,
    #[serde(default)]
    pub glasses: u32,
}

impl WaterIntake {
    #[must_use]
    pub fn millilitres(&self) -> u32 {
        self.glasses.saturating_mul(WATER_GLASS_ML)
    }

    #[must_use]
    pub fn goal_met(&self) -> bool {
        self.millilitres() >= WATER_GOAL_ML
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDays {
    #[serde(rename = "Monday", default)]
    pub monday: bool,
    #[serde(rename = "Wednesday", default)]
    pub wednesday: bool,
    #[serde(rename = "Friday", default)]
    pub friday: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutWeek {
    pub week_start: NaiveDate,
    #[serde(default)]
    pub completed: WorkoutDays,
}

// --- Body metrics ---

/// A body-metrics check-in. Stored newest date first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricEntry {
    pub id: i64,
    pub date: NaiveDate,
    /// Waist circumference in cm.
    #[serde(
        default,
        deserialize_with = "measurement",
        skip_serializing_if = "Option::is_none"
    )]
    pub waist: Option<f64>,
    /// Body weight in kg.
    #[serde(
        default,
        deserialize_with = "measurement",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    #[serde(default)]
    pub photos_taken: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NewMetricEntry {
    pub date: NaiveDate,
    pub waist: Option<f64>,
    pub weight: Option<f64>,
    pub photos_taken: bool,
}

impl NewMetricEntry {
    /// A check-in needs at least one measurement or the photo flag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waist.is_none() && self.weight.is_none() && !self.photos_taken
    }

    #[must_use]
    pub fn into_entry(self, id: i64) -> MetricEntry {
        MetricEntry {
            id,
            date: self.date,
            waist: self.waist,
            weight: self.weight,
            photos_taken: self.photos_taken,
        }
    }
}

/// Browser-written metrics keep form input as text, `""` meaning not measured.
fn measurement<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// --- Backup / import ---

fn default_backup_version() -> u32 {
    BACKUP_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default = "default_backup_version")]
    pub version: u32,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    /// Absent means the document carries no log section, which is different
    /// from an empty one under [`ImportMode::Replace`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_logs: Option<Vec<DailyLogEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<LegacyChecklist>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_badges: Option<Vec<WorkoutWeek>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<WaterIntake>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_metrics: Option<Vec<MetricEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Add dates not yet present, keep everything already stored.
    Merge,
    /// Replace the stored collection outright.
    Replace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ImportSummary {
    pub logs_before: usize,
    pub logs_after: usize,
    pub logs_added: usize,
    pub checklist_restored: bool,
    pub water_restored: bool,
    pub badges_restored: bool,
    pub metrics_added: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub checklist_migrated: usize,
    pub streak_days_migrated: usize,
    pub skipped_existing: usize,
}

/// One cell of the activity calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub completed_goals: u8,
    pub is_today: bool,
    pub is_future: bool,
}
