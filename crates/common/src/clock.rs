//! Clock conversions between the event log and the video timeline.
//!
//! Event logs stamp each input event with wall-clock epoch milliseconds.
//! The video carries its own presentation timeline in seconds since the
//! first frame. A single alignment reference (the wall-clock millisecond at
//! which the video started) links the two domains.

/// Milliseconds per second.
pub const MS_PER_SEC: f64 = 1000.0;

/// Seconds between `reference_ms` and `timestamp_ms`, negative when the
/// timestamp precedes the reference.
///
/// The difference is taken in 128-bit space so any pair of `i64` values is
/// representable before the single rounding step to `f64`.
pub fn offset_secs(timestamp_ms: i64, reference_ms: i64) -> f64 {
    let delta = timestamp_ms as i128 - reference_ms as i128;
    delta as f64 / MS_PER_SEC
}

/// Render an epoch-millisecond timestamp as an RFC 3339 UTC string.
///
/// Returns `None` when the value falls outside chrono's representable range.
pub fn epoch_ms_to_rfc3339(epoch_ms: i64) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(epoch_ms).map(|dt| dt.to_rfc3339())
}
