use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};

use fitlog_core::models::ImportMode;

use super::Service;

pub(crate) fn cmd_backup_export(svc: &Service, file: Option<&Path>) -> Result<()> {
    let json = svc.export_backup_json()?;

    match file {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write backup: {}", path.display()))?;
            let count = svc.get_all()?.len();
            eprintln!("Exported {count} daily logs to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) fn cmd_backup_import(svc: &Service, path: &Path, replace: bool, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    let summary = svc
        .import_backup(&text, mode)
        .with_context(|| format!("Import failed, nothing was changed: {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Import complete.\n");
    println!("  Logs before:  {}", summary.logs_before);
    println!("  Logs added:   {}", summary.logs_added);
    println!("  Logs after:   {}", summary.logs_after);
    if summary.checklist_restored {
        println!("  Checklist restored");
    }
    if summary.water_restored {
        println!("  Water intake restored");
    }
    if summary.badges_restored {
        println!("  Workout badges restored");
    }
    if summary.metrics_added > 0 {
        println!("  Check-ins added: {}", summary.metrics_added);
    }
    Ok(())
}

pub(crate) fn cmd_export_csv(svc: &Service, file: Option<&Path>) -> Result<()> {
    let rows = match file {
        Some(path) => {
            let out = std::fs::File::create(path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            svc.export_csv(out)?
        }
        None => svc.export_csv(io::stdout().lock())?,
    };
    if let Some(path) = file {
        eprintln!("Wrote {rows} rows to {}", path.display());
    }
    Ok(())
}

pub(crate) fn cmd_migrate(svc: &Service, json: bool) -> Result<()> {
    let summary = svc.migrate_legacy()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Migration complete.\n");
        println!("  From checklist:    {}", summary.checklist_migrated);
        println!("  From streak cache: {}", summary.streak_days_migrated);
        println!("  Already present:   {}", summary.skipped_existing);
    }
    Ok(())
}

pub(crate) fn cmd_clear(svc: &Service, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to clear all daily logs without --yes");
    }
    let count = svc.get_all()?.len();
    svc.clear()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": count }));
    } else {
        println!("Cleared {count} daily logs");
    }
    Ok(())
}
