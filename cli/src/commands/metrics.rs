use anyhow::{Result, bail};
use chrono::{Days, Local};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitlog_core::models::NewMetricEntry;

use super::Service;
use super::helpers::{mark, parse_date};

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

fn weight_to_kg(value: f64, unit: &str) -> Result<f64> {
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => Ok(value * KG_PER_LB),
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

fn measure(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

pub(crate) fn cmd_metrics_add(
    svc: &Service,
    waist: Option<f64>,
    weight: Option<f64>,
    unit: &str,
    photos: bool,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let weight = match weight {
        Some(value) => {
            let kg = weight_to_kg(value, unit)?;
            if !unit.eq_ignore_ascii_case("kg") {
                eprintln!("Converting {value:.1} {unit} → {kg:.2} kg");
            }
            Some(kg)
        }
        None => None,
    };

    let entry = svc.add_metric(NewMetricEntry {
        date: parse_date(date)?,
        waist,
        weight,
        photos_taken: photos,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("Logged check-in {} for {}", entry.id, entry.date);
    if let Some(w) = entry.waist {
        println!("  Waist:  {w:.1} cm");
    }
    if let Some(kg) = entry.weight {
        println!("  Weight: {kg:.1} kg ({:.1} lbs)", kg * LBS_PER_KG);
    }
    if entry.photos_taken {
        println!("  Photos taken");
    }
    Ok(())
}

pub(crate) fn cmd_metrics_list(svc: &Service, days: Option<u32>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct MetricRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Waist (cm)")]
        waist: String,
        #[tabled(rename = "Weight (kg)")]
        weight: String,
        #[tabled(rename = "Photos")]
        photos: &'static str,
    }

    let mut entries = svc.get_metrics()?;
    if let Some(days) = days {
        let today = Local::now().date_naive();
        if let Some(cutoff) = today.checked_sub_days(Days::new(u64::from(days))) {
            entries.retain(|e| e.date >= cutoff);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        eprintln!("No check-ins found. Use `fitlog metrics add` to record one.");
        return Ok(());
    }

    let rows: Vec<MetricRow> = entries
        .iter()
        .map(|e| MetricRow {
            id: e.id,
            date: e.date.to_string(),
            waist: measure(e.waist),
            weight: measure(e.weight),
            photos: mark(e.photos_taken),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    let weighed: Vec<_> = entries
        .iter()
        .filter_map(|e| e.weight.map(|w| (e.date, w)))
        .collect();
    if let [(_, now), .., (since, then)] = weighed.as_slice() {
        println!("\nWeight change since {since}: {:+.1} kg", now - then);
    }
    Ok(())
}

pub(crate) fn cmd_metrics_delete(svc: &Service, id: i64, json: bool) -> Result<()> {
    if !svc.delete_metric(id)? {
        bail!("No check-in with ID {id}");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        println!("Deleted check-in {id}");
    }
    Ok(())
}
