use anyhow::Result;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::models::Goal;

use super::Service;
use super::helpers::{goal_label, goal_line, json_error, mark, parse_date, truncate};

pub(crate) fn cmd_show(svc: &Service, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;

    let Some(entry) = svc.get_by_date(date)? else {
        if json {
            println!("{}", json_error(&format!("No entry for {date}")));
        } else {
            eprintln!("No entry for {date}. Use `fitlog goal <name>` to start one.");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("=== {date} ===\n");
    for goal in Goal::ALL {
        println!("  {} {}", mark(entry.goal(goal)), goal_label(goal));
    }
    if let Some(glasses) = entry.water_glasses {
        println!("\n  Water glasses: {glasses}");
    }
    if let Some(notes) = &entry.notes {
        println!("  Notes: {notes}");
    }
    println!("\n  {}/4 goals", entry.completed_goals());
    Ok(())
}

pub(crate) fn cmd_history(svc: &Service, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Protein")]
        protein: &'static str,
        #[tabled(rename = "Steps")]
        steps: &'static str,
        #[tabled(rename = "Water")]
        water: &'static str,
        #[tabled(rename = "Workout")]
        workout: &'static str,
        #[tabled(rename = "Done")]
        done: String,
        #[tabled(rename = "Notes")]
        notes: String,
    }

    let entries = svc.get_recent(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("No entries in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = entries
        .iter()
        .map(|e| HistoryRow {
            date: e.date.to_string(),
            protein: mark(e.protein),
            steps: mark(e.steps),
            water: mark(e.water),
            workout: mark(e.workout),
            done: format!("{}/4", e.completed_goals()),
            notes: e.notes.as_deref().map(|n| truncate(n, 30)).unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..6)).with(Alignment::center()))
        .to_string();
    println!("{table}");

    if let Some(latest) = entries.first() {
        println!("\nLatest: {}", goal_line(latest));
    }
    Ok(())
}

pub(crate) fn cmd_stats(svc: &Service, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct StatRow {
        #[tabled(rename = "Goal")]
        goal: &'static str,
        #[tabled(rename = "Days")]
        days: u32,
        #[tabled(rename = "Rate")]
        rate: String,
    }

    let stats = svc.get_stats(days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let row = |goal, days, rate: u32| StatRow {
        goal,
        days,
        rate: format!("{rate}%"),
    };
    let rows = vec![
        row("Protein", stats.protein_days, stats.protein_rate),
        row("Steps", stats.steps_days, stats.steps_rate),
        row("Water", stats.water_days, stats.water_rate),
        row("Workout", stats.workout_days, stats.workout_rate),
        row("Perfect day", stats.perfect_days, stats.perfect_rate),
    ];

    println!("Last {days} days: {} logged\n", stats.total_days);
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}
