use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Human-readable timestamp written into result rows.
pub fn completion_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Timestamp fragment used in result file names.
pub fn file_stamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}
