//! clickbox render engine
//!
//! Turns aligned clicks into timed `drawbox` markers and hands them to a
//! render backend that writes the annotated video.
//!
//! # Pipeline
//!
//! ```text
//! events.csv ──────┐
//!                  ├── align (timestamps.txt reference)
//! timestamps.txt ──┘         │
//!                            ├── out-of-range policy (ffprobe duration)
//!                            │
//!                            ├── one drawbox per click
//!                            ▼
//! recording.mkv ──────── ffmpeg ──► output_with_boxes.mp4
//! ```

pub mod export;
pub mod overlay;
pub mod pipeline;

pub use export::*;
pub use overlay::*;
pub use pipeline::*;
