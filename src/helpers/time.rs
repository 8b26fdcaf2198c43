use chrono::Utc;
use tokio::time::Instant;

/// Source of wall-clock time for token expiry bookkeeping.
pub trait Clock: Send + Sync {
    /// Current time as unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        now_ms()
    }
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn today_utc() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

pub fn get_instant() -> Instant {
    Instant::now()
}
