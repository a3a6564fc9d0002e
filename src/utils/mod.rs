pub mod logging;

use chrono::Utc;

/// Current time as a millisecond timestamp, as the exchange expects it.
pub fn current_timestamp_ms() -> i64 {
    let now = Utc::now();
    now.timestamp() * 1000 + now.timestamp_subsec_millis() as i64
}
