//! Process configuration for the bot, sourced from environment variables.
//!
//! Every required key is checked once at startup; a missing secret fails the
//! process before the server binds instead of surfacing on the first
//! outbound call.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{DEFAULT_PORT, DEFAULT_TIMEZONE, REQUIRED_KEYS},
    schema::{BotConfig, Endpoints},
};
