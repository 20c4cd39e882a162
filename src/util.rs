use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Milliseconds from `start` to `end`, 0 if the clock went backwards
pub fn time_diff_ms(start: SystemTime, end: SystemTime) -> u64 {
    end.duration_since(start).unwrap_or_default().as_millis() as u64
}

/// Fractional seconds from `start` to `end`
pub fn elapsed_secs(start: SystemTime, end: SystemTime) -> f64 {
    end.duration_since(start).unwrap_or_default().as_secs_f64()
}

/// Milliseconds since the Unix epoch, the timestamp format used in history files
pub fn epoch_millis(at: SystemTime) -> i64 {
    DateTime::<Utc>::from(at).timestamp_millis()
}
