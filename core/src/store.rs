use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::StoreError;

/// Unified daily log collection, newest insertion first.
pub const DAILY_LOGS_KEY: &str = "fitness_daily_logs";
/// Legacy single-day checklist.
pub const CHECKLIST_KEY: &str = "fitness_daily_checklist";
/// Legacy streak cache.
pub const STREAK_KEY: &str = "fitness_streak_data";
pub const WATER_KEY: &str = "fitness_water_intake";
pub const WORKOUT_BADGES_KEY: &str = "fitness_workout_badges";
/// Body-metrics check-ins, newest date first.
pub const METRICS_KEY: &str = "fitness_progress_metrics";

/// Durable key-value text storage.
///
/// Values are opaque JSON blobs; decoding and the corrupt-payload policy live in
/// the service layer. Implementations are used from a single thread, every call
/// completes before the next one starts.
pub trait LogStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Returns true when a value was present.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.values.borrow_mut().remove(key).is_some())
    }
}

impl<S: LogStore + ?Sized> LogStore for &S {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        (**self).remove(key)
    }
}
