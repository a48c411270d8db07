use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        crate::utils::time::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct TimerService;

impl TimerService {
    /// Whole seconds left, clamped at zero. Partial seconds are truncated.
    pub fn remaining(started_at: DateTime<Utc>, duration_seconds: u64, now: DateTime<Utc>) -> u64 {
        let elapsed_ms = (now - started_at).num_milliseconds().max(0);
        let total_ms = i64::try_from(duration_seconds)
            .unwrap_or(i64::MAX / 1000)
            .saturating_mul(1000);
        (total_ms - elapsed_ms).max(0) as u64 / 1000
    }

    pub fn deadline(started_at: DateTime<Utc>, duration_seconds: u64) -> DateTime<Utc> {
        started_at + Duration::seconds(i64::try_from(duration_seconds).unwrap_or(i64::MAX / 1000))
    }

    /// `MM:SS`, minutes growing past two digits for long quizzes.
    pub fn format_countdown(seconds: u64) -> String {
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}
