mod backup;
mod goal;
mod helpers;
mod metrics;
mod streak;
mod summary;

use fitlog_core::DailyLogService;
use fitlog_core::db::Database;

/// Every command runs against the SQLite-backed service.
pub(crate) type Service = DailyLogService<Database>;

pub(crate) use backup::{cmd_backup_export, cmd_backup_import, cmd_clear, cmd_export_csv, cmd_migrate};
pub(crate) use goal::{cmd_goal, cmd_note, cmd_water, cmd_workout};
pub(crate) use metrics::{cmd_metrics_add, cmd_metrics_delete, cmd_metrics_list};
pub(crate) use streak::{cmd_calendar, cmd_streak};
pub(crate) use summary::{cmd_history, cmd_show, cmd_stats};
