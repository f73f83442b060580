use anyhow::Result;
use chrono::Local;

use fitlog_core::models::{GoalExtras, WATER_GLASS_ML, WATER_GOAL_ML};

use super::Service;
use super::helpers::{goal_line, mark, parse_date, parse_goal, parse_workout_day};

pub(crate) fn cmd_goal(
    svc: &Service,
    goal: &str,
    undo: bool,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let goal = parse_goal(goal)?;
    let date = parse_date(date)?;
    let entry = svc.update_goal_on(date, goal, !undo, &GoalExtras::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let verb = if undo { "Unmarked" } else { "Marked" };
        println!("{verb} {goal} for {date}");
        println!("  {}  ({}/4)", goal_line(&entry), entry.completed_goals());
    }
    Ok(())
}

pub(crate) fn cmd_water(svc: &Service, glasses: u32, json: bool) -> Result<()> {
    let entry = svc.set_water_glasses_on(Local::now().date_naive(), glasses)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let ml = glasses.saturating_mul(WATER_GLASS_ML);
        let litres = f64::from(ml) / 1000.0;
        println!(
            "Water: {glasses} glasses ({litres:.2} L of {:.1} L) {}",
            f64::from(WATER_GOAL_ML) / 1000.0,
            mark(entry.water)
        );
    }
    Ok(())
}

pub(crate) fn cmd_note(svc: &Service, text: &str, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entry = svc.set_notes(date, text)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Saved note for {}", entry.date);
    }
    Ok(())
}

pub(crate) fn cmd_workout(svc: &Service, day: &str, undo: bool, json: bool) -> Result<()> {
    let weekday = parse_workout_day(day)?;
    let today = Local::now().date_naive();
    let weeks = svc.set_workout_badge_on(today, weekday, !undo)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&weeks)?);
        return Ok(());
    }

    for week in weeks.iter().rev() {
        let c = &week.completed;
        println!(
            "  week of {}  A {}  B {}  C {}",
            week.week_start,
            mark(c.monday),
            mark(c.wednesday),
            mark(c.friday)
        );
    }
    Ok(())
}
