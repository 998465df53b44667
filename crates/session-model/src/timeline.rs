//! Alignment of click timestamps onto the video timeline.
//!
//! `timestamps.txt` is written by the recorder alongside the video: a header
//! line followed by the wall-clock millisecond of the first frame. Clicks are
//! shifted by that reference and converted to seconds, then given a fixed
//! visibility window.

use std::path::Path;

use clickbox_common::clock::offset_secs;
use clickbox_common::config::OutOfRangePolicy;
use serde::Serialize;

use crate::error::SessionError;
use crate::event::{ClickEvent, TimestampMs};

/// How long each click marker stays visible.
pub const CLICK_WINDOW_SECS: f64 = 0.1;

/// A click placed on the video timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedClick {
    /// Screen X coordinate in pixels.
    pub x: f64,
    /// Screen Y coordinate in pixels.
    pub y: f64,
    /// Seconds since video start at which the marker appears.
    pub start_secs: f64,
    /// Seconds since video start at which the marker disappears.
    pub end_secs: f64,
}

/// Read the alignment reference from a `timestamps.txt` sidecar.
pub fn read_alignment_reference(path: impl AsRef<Path>) -> Result<TimestampMs, SessionError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SessionError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| SessionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_alignment_reference(&content, path)
}

/// Parse the line immediately after the header as an integer timestamp.
///
/// Later lines (the per-frame timestamps of the recorder) are ignored.
pub fn parse_alignment_reference(
    content: &str,
    source: &Path,
) -> Result<TimestampMs, SessionError> {
    let line = content
        .lines()
        .nth(1)
        .ok_or_else(|| SessionError::MissingReference {
            path: source.to_path_buf(),
        })?;

    let value = line.trim();
    value
        .parse::<TimestampMs>()
        .map_err(|_| SessionError::InvalidReference {
            path: source.to_path_buf(),
            value: value.to_string(),
        })
}

/// Place a single click on the video timeline.
pub fn align(event: &ClickEvent, reference_ms: TimestampMs) -> AlignedClick {
    let start_secs = offset_secs(event.timestamp_ms, reference_ms);
    AlignedClick {
        x: event.x,
        y: event.y,
        start_secs,
        end_secs: start_secs + CLICK_WINDOW_SECS,
    }
}

/// Place every click on the video timeline, preserving order.
pub fn align_all(events: &[ClickEvent], reference_ms: TimestampMs) -> Vec<AlignedClick> {
    events.iter().map(|e| align(e, reference_ms)).collect()
}

/// Result of applying an [`OutOfRangePolicy`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyOutcome {
    /// Clicks that will be drawn, in input order.
    pub clicks: Vec<AlignedClick>,
    /// Clicks removed because their marker could never be visible.
    pub dropped: usize,
    /// Clicks moved to start at time zero.
    pub clamped: usize,
    /// Clicks that start before the video, whatever the policy did.
    pub before_start: usize,
    /// Clicks that start after the known video duration.
    pub after_end: usize,
}

/// Apply the out-of-range policy to aligned clicks.
///
/// `duration_secs` is the probed video length, when known. Without it only
/// the lower bound is checked.
pub fn apply_policy(
    clicks: Vec<AlignedClick>,
    policy: OutOfRangePolicy,
    duration_secs: Option<f64>,
) -> PolicyOutcome {
    let mut outcome = PolicyOutcome {
        clicks: Vec::with_capacity(clicks.len()),
        ..PolicyOutcome::default()
    };

    for mut click in clicks {
        let before_start = click.start_secs < 0.0;
        let after_end = duration_secs.is_some_and(|d| click.start_secs > d);
        if before_start {
            outcome.before_start += 1;
        }
        if after_end {
            outcome.after_end += 1;
        }

        match policy {
            OutOfRangePolicy::Keep => {}
            OutOfRangePolicy::Drop => {
                if click.end_secs < 0.0 || after_end {
                    outcome.dropped += 1;
                    continue;
                }
            }
            OutOfRangePolicy::Clamp => {
                if before_start {
                    click.start_secs = 0.0;
                    click.end_secs = CLICK_WINDOW_SECS;
                    outcome.clamped += 1;
                }
            }
        }

        outcome.clicks.push(click);
    }

    if outcome.before_start > 0 || outcome.after_end > 0 {
        tracing::warn!(
            policy = policy.as_str(),
            before_start = outcome.before_start,
            after_end = outcome.after_end,
            dropped = outcome.dropped,
            clamped = outcome.clamped,
            "Clicks fall outside the video timeline"
        );
    }

    outcome
}
