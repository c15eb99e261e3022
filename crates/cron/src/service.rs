//! Core scheduler: timer loop, job registry, job execution.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use {
    tokio::{
        sync::{Mutex, Notify, RwLock},
        task::JoinHandle,
    },
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result,
    schedule::compute_next_run,
    types::{CronStatus, JobSpec, JobState, JobStatus, RunStatus},
};

/// Poll interval when no job has a pending run.
const IDLE_POLL_MS: u64 = 60_000;

struct JobEntry {
    spec: JobSpec,
    state: JobState,
}

impl JobEntry {
    fn status(&self) -> JobStatus {
        JobStatus {
            name: self.spec.name.clone(),
            schedule: self.spec.schedule.to_string(),
            state: self.state.clone(),
        }
    }
}

/// The scheduler.
///
/// Owns the registered jobs and a single background timer task. Due jobs are
/// each spawned on their own task, so a slow job never delays another.
pub struct CronService {
    jobs: RwLock<Vec<JobEntry>>,
    timer_handle: Mutex<Option<JoinHandle<()>>>,
    wake_notify: Arc<Notify>,
    running: RwLock<bool>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl CronService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            jobs: RwLock::new(Vec::new()),
            timer_handle: Mutex::new(None),
            wake_notify: Arc::new(Notify::new()),
            running: RwLock::new(false),
        })
    }

    /// Register a job. Names must be unique.
    pub async fn add(&self, spec: JobSpec) -> Result<JobStatus> {
        let next_run_at_ms = compute_next_run(&spec.schedule, now_ms())?;

        let status = {
            let mut jobs = self.jobs.write().await;
            if jobs.iter().any(|j| j.spec.name == spec.name) {
                return Err(Error::DuplicateJob { name: spec.name });
            }
            let entry = JobEntry {
                spec,
                state: JobState {
                    next_run_at_ms,
                    ..JobState::default()
                },
            };
            let status = entry.status();
            jobs.push(entry);
            status
        };

        self.wake_notify.notify_one();
        info!(name = %status.name, schedule = %status.schedule, "cron job added");
        Ok(status)
    }

    /// Start the timer loop. Calling this twice is a no-op.
    pub async fn start(self: &Arc<Self>) {
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        let svc = Arc::clone(self);
        let handle = tokio::spawn(async move {
            svc.timer_loop().await;
        });
        *self.timer_handle.lock().await = Some(handle);

        info!(count = self.jobs.read().await.len(), "cron service started");
    }

    /// Stop the timer loop. Jobs already spawned run to completion.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        self.wake_notify.notify_one();

        let mut handle = self.timer_handle.lock().await;
        if let Some(h) = handle.take() {
            h.abort();
        }
        info!("cron service stopped");
    }

    /// Snapshot of every registered job.
    pub async fn list(&self) -> Vec<JobStatus> {
        self.jobs.read().await.iter().map(JobEntry::status).collect()
    }

    pub async fn status(&self) -> CronStatus {
        let jobs = self.jobs.read().await;
        CronStatus {
            running: *self.running.read().await,
            job_count: jobs.len(),
            next_run_at_ms: jobs.iter().filter_map(|j| j.state.next_run_at_ms).min(),
        }
    }

    /// Run a job immediately, outside its schedule, and wait for it.
    pub async fn run_now(self: &Arc<Self>, name: &str) -> Result<()> {
        let spec = {
            let mut jobs = self.jobs.write().await;
            let entry = jobs
                .iter_mut()
                .find(|j| j.spec.name == name)
                .ok_or_else(|| Error::job_not_found(name))?;
            if entry.state.running_at_ms.is_some() {
                return Err(Error::message(format!("job {name} is already running")));
            }
            entry.state.running_at_ms = Some(now_ms());
            entry.spec.clone()
        };

        match self.execute_job(&spec).await {
            Some(message) => Err(Error::JobFailed {
                name: name.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    // ── Internal ────────────────────────────────────────────────────────

    async fn timer_loop(self: &Arc<Self>) {
        loop {
            if !*self.running.read().await {
                break;
            }

            let sleep_ms = self.ms_until_next_wake().await;

            if sleep_ms > 0 {
                let notify = Arc::clone(&self.wake_notify);
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {},
                    () = notify.notified() => {
                        debug!("timer loop woken by notify");
                        continue;
                    },
                }
            }

            if !*self.running.read().await {
                break;
            }

            self.process_due_jobs().await;
        }
    }

    async fn ms_until_next_wake(&self) -> u64 {
        let jobs = self.jobs.read().await;
        let now = now_ms();
        jobs.iter()
            .filter_map(|j| j.state.next_run_at_ms)
            .map(|t| t.saturating_sub(now))
            .min()
            .unwrap_or(IDLE_POLL_MS)
    }

    async fn process_due_jobs(self: &Arc<Self>) {
        let now = now_ms();
        let due: Vec<JobSpec> = {
            let mut jobs = self.jobs.write().await;
            let mut due = Vec::new();
            for job in jobs.iter_mut() {
                if !job.state.next_run_at_ms.is_some_and(|t| t <= now) {
                    continue;
                }
                // Advance past this slot under the write lock so the next
                // tick cannot pick the same occurrence again.
                job.state.next_run_at_ms =
                    compute_next_run(&job.spec.schedule, now).unwrap_or_else(|e| {
                        warn!(name = %job.spec.name, error = %e, "failed to compute next run");
                        None
                    });
                if job.state.running_at_ms.is_some() {
                    warn!(name = %job.spec.name, "previous run still in progress, skipping slot");
                    continue;
                }
                job.state.running_at_ms = Some(now);
                due.push(job.spec.clone());
            }
            due
        };

        for spec in due {
            let svc = Arc::clone(self);
            tokio::spawn(async move {
                svc.execute_job(&spec).await;
            });
        }
    }

    /// Run a job body and record the outcome. Returns the error message on
    /// failure.
    async fn execute_job(&self, spec: &JobSpec) -> Option<String> {
        let started = now_ms();
        info!(name = %spec.name, "executing cron job");

        let result = (spec.run)().await;

        let finished = now_ms();
        let duration_ms = finished.saturating_sub(started);
        let (status, error_msg) = match result {
            Ok(()) => (RunStatus::Ok, None),
            Err(e) => {
                let message = format!("{e:#}");
                error!(name = %spec.name, error = %message, "cron job failed");
                (RunStatus::Error, Some(message))
            },
        };

        {
            let mut jobs = self.jobs.write().await;
            if let Some(job) = jobs.iter_mut().find(|j| j.spec.name == spec.name) {
                job.state.running_at_ms = None;
                job.state.last_run_at_ms = Some(finished);
                job.state.last_status = Some(status);
                job.state.last_error = error_msg.clone();
                job.state.last_duration_ms = Some(duration_ms);
                job.state.run_count += 1;
            }
        }

        info!(name = %spec.name, status = ?status, duration_ms, "cron job finished");
        error_msg
    }
}
