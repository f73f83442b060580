use std::io::Write;

use anyhow::{Context, Result};

use crate::models::DailyLogEntry;

const HEADER: [&str; 8] = [
    "date",
    "protein",
    "steps",
    "water",
    "workout",
    "waterGlasses",
    "notes",
    "updatedAt",
];

/// Write daily logs as CSV, newest date first. Returns the number of data rows.
pub fn write_logs_csv<W: Write>(entries: &[DailyLogEntry], writer: W) -> Result<usize> {
    let mut sorted: Vec<&DailyLogEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)
        .context("Failed to write CSV header")?;

    for e in &sorted {
        wtr.write_record([
            e.date.format("%Y-%m-%d").to_string(),
            e.protein.to_string(),
            e.steps.to_string(),
            e.water.to_string(),
            e.workout.to_string(),
            e.water_glasses.map(|g| g.to_string()).unwrap_or_default(),
            e.notes.clone().unwrap_or_default(),
            e.updated_at.to_rfc3339(),
        ])
        .with_context(|| format!("Failed to write CSV row for {}", e.date))?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(sorted.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogPatch;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_write_logs_csv() {
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let older = LogPatch::new(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap())
            .with_flags(true, false, false, false)
            .into_entry(at);
        let mut newer = LogPatch::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
            .with_flags(true, true, true, true)
            .into_entry(at);
        newer.water_glasses = Some(10);
        newer.notes = Some("felt strong, ran 5k".to_string());

        let mut out = Vec::new();
        let rows = write_logs_csv(&[older, newer], &mut out).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "date,protein,steps,water,workout,waterGlasses,notes,updatedAt"
        );
        assert!(lines[1].starts_with("2024-06-15,true,true,true,true,10,\"felt strong, ran 5k\","));
        assert!(lines[2].starts_with("2024-06-14,true,false,false,false,,,"));
    }

    #[test]
    fn test_write_logs_csv_empty() {
        let mut out = Vec::new();
        assert_eq!(write_logs_csv(&[], &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
