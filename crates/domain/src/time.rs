//! Time and timestamp helpers.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// UTC timestamp used for boolean last-change times, last-seen markers, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether less than `window` has passed between `since` and `at`.
///
/// Timestamps in the future relative to `at` count as "within".
#[must_use]
pub fn is_within(since: Timestamp, at: Timestamp, window: Duration) -> bool {
    match (at - since).to_std() {
        Ok(elapsed) => elapsed < window,
        Err(_) => true,
    }
}
