//! clickbox session model
//!
//! Defines the data contracts for a recorded session folder:
//! - **Job:** The fixed set of sibling files that make up one session
//! - **Events:** Left-button clicks read from the `events.csv` log
//! - **Timeline:** The alignment reference from `timestamps.txt` and the
//!   conversion of click timestamps into video-relative windows
//!
//! Click coordinates are raw screen pixels as written by the recorder.

pub mod error;
pub mod event;
pub mod job;
pub mod timeline;

pub use error::*;
pub use event::*;
pub use job::*;
pub use timeline::*;
