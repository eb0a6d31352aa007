use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Source of unique ids and wall-clock timestamps.
pub trait ModelUtils: Send + Sync {
    fn generate_id(&self) -> String;
    fn get_timestamp(&self) -> DateTime<Utc>;
}

/// Random v4 UUIDs and the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemModelUtils;

impl ModelUtils for SystemModelUtils {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn get_timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic ids (`{prefix}-1`, `{prefix}-2`, …) and a clock that
/// advances one second per call. Used in tests and replays.
#[derive(Debug)]
pub struct SequentialModelUtils {
    prefix: String,
    counter: Mutex<(u64, i64)>,
}

impl SequentialModelUtils {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Mutex::new((0, 0)),
        }
    }
}

impl Default for SequentialModelUtils {
    fn default() -> Self {
        Self::new("id")
    }
}

impl ModelUtils for SequentialModelUtils {
    fn generate_id(&self) -> String {
        let mut counter = self.counter.lock();
        counter.0 += 1;
        format!("{}-{}", self.prefix, counter.0)
    }

    fn get_timestamp(&self) -> DateTime<Utc> {
        let mut counter = self.counter.lock();
        counter.1 += 1;
        Utc.timestamp_opt(1_700_000_000 + counter.1, 0)
            .single()
            .unwrap_or_default()
    }
}
