use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

use fitlog_core::streak::DEFAULT_WINDOW_DAYS;

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub streak_window: u32,
}

impl Config {
    /// Resolve the data directory (`FITLOG_DATA_DIR`, else the platform data
    /// dir) and make sure it exists.
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os("FITLOG_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "fitlog")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };

        let streak_window = match std::env::var("FITLOG_STREAK_WINDOW") {
            Ok(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid FITLOG_STREAK_WINDOW '{v}'"))?,
            Err(_) => DEFAULT_WINDOW_DAYS,
        };

        Self::in_dir(data_dir, streak_window)
    }

    pub fn in_dir(data_dir: PathBuf, streak_window: u32) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("fitlog.db");

        Ok(Config {
            db_path,
            data_dir,
            streak_window,
        })
    }
}
