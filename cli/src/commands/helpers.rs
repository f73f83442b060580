use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, Weekday};
use serde::Serialize;

use fitlog_core::models::{DailyLogEntry, Goal};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")
            }),
        },
    }
}

pub(crate) fn parse_goal(s: &str) -> Result<Goal> {
    Ok(s.parse::<Goal>()?)
}

/// Only the three scheduled training days carry a badge.
pub(crate) fn parse_workout_day(s: &str) -> Result<Weekday> {
    match s.trim().to_lowercase().as_str() {
        "mon" | "monday" | "a" => Ok(Weekday::Mon),
        "wed" | "wednesday" | "b" => Ok(Weekday::Wed),
        "fri" | "friday" | "c" => Ok(Weekday::Fri),
        _ => bail!("Invalid workout day '{s}'. Use mon, wed, or fri (or A/B/C)"),
    }
}

pub(crate) fn mark(done: bool) -> &'static str {
    if done { "✓" } else { "·" }
}

/// One-line rendering: `Protein ✓  Steps ·  Water ✓  Workout ·`.
pub(crate) fn goal_line(entry: &DailyLogEntry) -> String {
    Goal::ALL
        .iter()
        .map(|g| format!("{} {}", goal_label(*g), mark(entry.goal(*g))))
        .collect::<Vec<_>>()
        .join("  ")
}

pub(crate) fn goal_label(goal: Goal) -> &'static str {
    match goal {
        Goal::Protein => "Protein",
        Goal::Steps => "Steps",
        Goal::Water => "Water",
        Goal::Workout => "Workout",
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fitlog_core::models::LogPatch;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_goal() {
        assert_eq!(parse_goal("Water").unwrap(), Goal::Water);
        assert!(parse_goal("sleep").is_err());
    }

    #[test]
    fn test_parse_workout_day() {
        assert_eq!(parse_workout_day("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_workout_day("b").unwrap(), Weekday::Wed);
        assert_eq!(parse_workout_day("fri").unwrap(), Weekday::Fri);
        assert!(parse_workout_day("tue").is_err());
    }

    #[test]
    fn test_goal_line() {
        let entry = LogPatch::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .with_flags(true, false, true, false)
            .into_entry(Utc::now());
        assert_eq!(
            goal_line(&entry),
            "Protein ✓  Steps ·  Water ✓  Workout ·"
        );
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("nope"), r#"{"error":"nope"}"#);
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }
}
