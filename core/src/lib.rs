//! Daily goal logging for the fitlog coach: the persisted log store, merge-on-write
//! daily entries, rolling statistics, streaks, and migration from older storage
//! shapes.

pub mod csv_export;
pub mod db;
pub mod error;
pub mod migrate;
pub mod models;
pub mod service;
pub mod store;
pub mod streak;

pub use error::StoreError;
pub use service::DailyLogService;
pub use store::{LogStore, MemoryStore};
