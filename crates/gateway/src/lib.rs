//! HTTP front end and scheduled pushes for the bot.
//!
//! `POST /callback` receives webhook events; the job catalogue pushes
//! summaries to a single recipient on a daily schedule.

pub mod jobs;
pub mod server;
pub mod state;
pub mod webhook_routes;
