use {
    anyhow::Context,
    chrono::{DateTime, Utc},
    chrono_tz::Tz,
    dailybot_config::BotConfig,
    dailybot_cron::schedule::{compute_next_run, daily_at},
    dailybot_gateway::{
        jobs::{JobDefinition, catalogue, find_job},
        server::job_context,
    },
};

fn lookup(name: &str) -> anyhow::Result<JobDefinition> {
    find_job(name).with_context(|| {
        let known: Vec<_> = catalogue().into_iter().map(|j| j.name).collect();
        format!("unknown job {name:?}; known jobs: {}", known.join(", "))
    })
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Print the catalogue with each job's next fire time.
pub fn list(timezone: Tz) -> anyhow::Result<()> {
    let now = now_ms();
    for job in catalogue() {
        let schedule = daily_at(job.hour, job.minute, Some(timezone))?;
        let next = compute_next_run(&schedule, now)?
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
            .map(|at| at.with_timezone(&timezone).format("%Y-%m-%d %H:%M %Z").to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<16} {:02}:{:02}  next {next}",
            job.name, job.hour, job.minute
        );
    }
    Ok(())
}

/// Build one job's message and print it instead of pushing.
pub async fn preview(config: &BotConfig, name: &str) -> anyhow::Result<()> {
    let job = lookup(name)?;
    let text = job_context(config)?.build(job.kind).await?;
    println!("{text}");
    Ok(())
}

/// Build one job's message and push it to the configured recipient now.
pub async fn run(config: &BotConfig, name: &str) -> anyhow::Result<()> {
    let job = lookup(name)?;
    job_context(config)?.push(&job).await?;
    eprintln!("pushed {} to {}", job.name, config.user_id);
    Ok(())
}
