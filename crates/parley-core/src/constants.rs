//! Shared constants for the conversation core.

use chrono::Duration;

/// Maximum gap, in seconds, between two consecutive messages for them to
/// belong to the same author run (and for the later one to hide its
/// timestamp).  Comparisons are strictly-less-than.
pub const RUN_GAP_SECS: i64 = 3_600;

/// [`RUN_GAP_SECS`] as a `chrono::Duration`.
pub fn run_gap() -> Duration {
    Duration::seconds(RUN_GAP_SECS)
}
