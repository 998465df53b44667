//! Click-marker descriptors and their ffmpeg filter rendering.
//!
//! Each aligned click becomes one independent `drawbox` filter gated by a
//! time predicate on the output timestamp `t`. The filters are chained in
//! click order; since every box is gated on its own window, the order only
//! affects layering of overlapping boxes.

use serde::Serialize;

use clickbox_session::timeline::AlignedClick;

/// Marker edge length in pixels.
pub const BOX_SIZE_PX: f64 = 30.0;

/// Marker stroke color (ffmpeg color name).
pub const BOX_COLOR: &str = "red";

/// Marker stroke thickness in pixels.
pub const BOX_THICKNESS_PX: u32 = 2;

/// One rectangle-draw operation on the video stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxOverlay {
    /// Top-left X in pixels.
    pub x: f64,
    /// Top-left Y in pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
    pub thickness: u32,
    /// Window start in seconds since video start (inclusive).
    pub start_secs: f64,
    /// Window end in seconds since video start (inclusive).
    pub end_secs: f64,
}

impl BoxOverlay {
    /// The fixed-size marker centered on a click.
    pub fn around_click(click: &AlignedClick) -> Self {
        Self {
            x: click.x - BOX_SIZE_PX / 2.0,
            y: click.y - BOX_SIZE_PX / 2.0,
            width: BOX_SIZE_PX,
            height: BOX_SIZE_PX,
            color: BOX_COLOR,
            thickness: BOX_THICKNESS_PX,
            start_secs: click.start_secs,
            end_secs: click.end_secs,
        }
    }

    /// Visibility predicate evaluated per frame by ffmpeg.
    pub fn enable_expr(&self) -> String {
        format!("gte(t,{})*lte(t,{})", self.start_secs, self.end_secs)
    }

    /// The `drawbox` filter for this marker.
    ///
    /// The enable expression is single-quoted so its commas do not split the
    /// filter chain.
    pub fn drawbox_filter(&self) -> String {
        format!(
            "drawbox=x={x}:y={y}:w={w}:h={h}:color={color}:thickness={t}:enable='{enable}'",
            x = self.x,
            y = self.y,
            w = self.width,
            h = self.height,
            color = self.color,
            t = self.thickness,
            enable = self.enable_expr(),
        )
    }
}

/// One marker per click, in click order. Duplicates are kept.
pub fn build_overlays(clicks: &[AlignedClick]) -> Vec<BoxOverlay> {
    clicks.iter().map(BoxOverlay::around_click).collect()
}

/// Join the markers into a single video filter chain.
///
/// Returns `None` when there is nothing to draw, so the caller can skip the
/// filter argument entirely.
pub fn build_filter_chain(overlays: &[BoxOverlay]) -> Option<String> {
    if overlays.is_empty() {
        return None;
    }
    Some(
        overlays
            .iter()
            .map(BoxOverlay::drawbox_filter)
            .collect::<Vec<_>>()
            .join(","),
    )
}
