//! clickbox common utilities
//!
//! Shared infrastructure for all clickbox crates:
//! - Error types and result aliases
//! - Clock conversions between the event-log and video timelines
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
