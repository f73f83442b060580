use anyhow::Result;
use chrono::Local;
use tabled::{Table, builder::Builder, settings::Style};

use super::Service;

pub(crate) fn cmd_streak(svc: &Service, window: u32, json: bool) -> Result<()> {
    let snapshot = svc.refresh_streak(window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("Current streak: {} days", snapshot.current_streak);
        println!("Best streak:    {} days", snapshot.longest_streak);
        println!("\nComplete 3+ daily goals to build your streak.");
    }
    Ok(())
}

fn cell(completed_goals: u8, is_future: bool) -> &'static str {
    if is_future {
        return " ";
    }
    match completed_goals {
        0 => "·",
        1 => "░",
        2 => "▒",
        3 => "▓",
        _ => "█",
    }
}

pub(crate) fn cmd_calendar(svc: &Service, weeks: u32, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let grid = svc.calendar_on(today, weeks)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Week of", "S", "M", "T", "W", "T", "F", "S"]);
    for week in &grid {
        let mut record = vec![week[0].date.format("%b %d").to_string()];
        for day in week {
            let symbol = cell(day.completed_goals, day.is_future);
            if day.is_today {
                record.push(format!("[{symbol}]"));
            } else {
                record.push(symbol.to_string());
            }
        }
        builder.push_record(record);
    }

    let mut table: Table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
    println!("Less · ░ ▒ ▓ █ More   [ ] = today");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_levels() {
        assert_eq!(cell(0, false), "·");
        assert_eq!(cell(3, false), "▓");
        assert_eq!(cell(4, false), "█");
        assert_eq!(cell(4, true), " ");
    }
}
