//! Wall-clock job scheduler driven by cron expressions.
//!
//! Jobs are registered in memory at startup and fire on a background tokio
//! task. Nothing is persisted; a failed run is logged and the job simply
//! waits for its next slot.

pub mod error;
pub mod schedule;
pub mod service;
pub mod types;

pub use error::{Error, Result};
