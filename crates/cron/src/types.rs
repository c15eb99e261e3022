//! Core data types for the scheduler.

use std::{future::Future, pin::Pin, sync::Arc};

use {chrono_tz::Tz, serde::Serialize};

/// When a job fires: a cron expression evaluated in an optional timezone.
///
/// Accepts the standard 5-field form (`min hour dom month dow`) as well as
/// the 6/7-field form with seconds (and year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    pub expr: String,
    pub tz: Option<Tz>,
}

impl CronSchedule {
    #[must_use]
    pub fn new(expr: impl Into<String>, tz: Option<Tz>) -> Self {
        Self {
            expr: expr.into(),
            tz,
        }
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tz {
            Some(tz) => write!(f, "{} ({tz})", self.expr),
            None => write!(f, "{} (UTC)", self.expr),
        }
    }
}

/// Future returned by a job body.
pub type JobFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Zero-argument job body. Each invocation builds a fresh future.
pub type JobFn = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// A job to register with the scheduler.
#[derive(Clone)]
pub struct JobSpec {
    pub name: String,
    pub schedule: CronSchedule,
    pub run: JobFn,
}

impl JobSpec {
    pub fn new<F, Fut>(name: impl Into<String>, schedule: CronSchedule, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            schedule,
            run: Arc::new(move || -> JobFuture { Box::pin(run()) }),
        }
    }
}

impl std::fmt::Debug for JobSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSpec")
            .field("name", &self.name)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

/// Outcome of a single job run.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Mutable runtime state of a job.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run_at_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<RunStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_duration_ms: Option<u64>,
    pub run_count: u64,
}

/// Snapshot of a registered job, as reported by [`crate::service::CronService::list`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub name: String,
    pub schedule: String,
    #[serde(flatten)]
    pub state: JobState,
}

/// Scheduler summary.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CronStatus {
    pub running: bool,
    pub job_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run_at_ms: Option<u64>,
}
