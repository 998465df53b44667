//! Click events read from the session's `events.csv` log.
//!
//! The recorder writes one row per input event with at least the columns
//! `event_type`, `timestamp`, `mouse_x` and `mouse_y`; any other columns are
//! ignored. Only left-button presses are kept.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Wall-clock timestamp in epoch milliseconds, as written by the recorder.
pub type TimestampMs = i64;

/// `event_type` value that marks a left-button press.
pub const LEFT_PRESS_EVENT_TYPE: &str = "ButtonPress(Left)";

const COLUMN_EVENT_TYPE: &str = "event_type";
const COLUMN_TIMESTAMP: &str = "timestamp";
const COLUMN_MOUSE_X: &str = "mouse_x";
const COLUMN_MOUSE_Y: &str = "mouse_y";

/// A single left-button press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Epoch milliseconds in the recorder's clock.
    pub timestamp_ms: TimestampMs,
    /// Screen X coordinate in pixels.
    pub x: f64,
    /// Screen Y coordinate in pixels.
    pub y: f64,
}

impl ClickEvent {
    pub fn new(timestamp_ms: TimestampMs, x: f64, y: f64) -> Self {
        Self { timestamp_ms, x, y }
    }
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    event_type: usize,
    timestamp: usize,
    mouse_x: usize,
    mouse_y: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self, SessionError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SessionError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };

        Ok(Self {
            event_type: find(COLUMN_EVENT_TYPE)?,
            timestamp: find(COLUMN_TIMESTAMP)?,
            mouse_x: find(COLUMN_MOUSE_X)?,
            mouse_y: find(COLUMN_MOUSE_Y)?,
        })
    }
}

/// Read every left-button press from an event log on disk.
pub fn read_click_events(path: impl AsRef<Path>) -> Result<Vec<ClickEvent>, SessionError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SessionError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| SessionError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_click_events(file, path)
}

/// Parse left-button presses from CSV content, preserving row order.
///
/// `source` is only used to label errors. An empty log holds no clicks. Rows
/// of other event types are skipped without looking at their numeric fields;
/// a malformed number in a left-press row fails the whole log.
pub fn parse_click_events<R: Read>(
    reader: R,
    source: &Path,
) -> Result<Vec<ClickEvent>, SessionError> {
    let csv_error = |e: csv::Error| SessionError::Csv {
        path: source.to_path_buf(),
        source: e,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(csv_error)?.clone();
    if headers.is_empty() {
        // The recorder leaves a zero-byte log when nothing was captured.
        tracing::debug!(source = %source.display(), "Event log is empty");
        return Ok(Vec::new());
    }
    let columns = ColumnIndex::resolve(&headers, source)?;

    let mut events = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        if record.get(columns.event_type) != Some(LEFT_PRESS_EVENT_TYPE) {
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_ts = field(&record, columns.timestamp, COLUMN_TIMESTAMP, source, line)?;
        let timestamp_ms = raw_ts
            .parse::<TimestampMs>()
            .map_err(|_| invalid_field(source, line, COLUMN_TIMESTAMP, raw_ts))?;

        let raw_x = field(&record, columns.mouse_x, COLUMN_MOUSE_X, source, line)?;
        let x = raw_x
            .parse::<f64>()
            .map_err(|_| invalid_field(source, line, COLUMN_MOUSE_X, raw_x))?;

        let raw_y = field(&record, columns.mouse_y, COLUMN_MOUSE_Y, source, line)?;
        let y = raw_y
            .parse::<f64>()
            .map_err(|_| invalid_field(source, line, COLUMN_MOUSE_Y, raw_y))?;

        events.push(ClickEvent { timestamp_ms, x, y });
    }

    tracing::debug!(
        source = %source.display(),
        clicks = events.len(),
        "Parsed click events"
    );

    Ok(events)
}

/// Trimmed field value; a short row counts as an empty, invalid value.
fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    column: &str,
    source: &Path,
    line: u64,
) -> Result<&'r str, SessionError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| invalid_field(source, line, column, ""))
}

fn invalid_field(path: &Path, line: u64, column: &str, value: &str) -> SessionError {
    SessionError::InvalidField {
        path: path.to_path_buf(),
        line,
        column: column.to_string(),
        value: value.to_string(),
    }
}
