//! Thin timestamp alias so every crate agrees on one representation.

use chrono::{DateTime, Utc};

/// Wall-clock timestamp used on events, messages, and metrics snapshots.
pub type Timestamp = DateTime<Utc>;

/// Current time, in one place so tests can see where to inject a clock if
/// that's ever needed.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
