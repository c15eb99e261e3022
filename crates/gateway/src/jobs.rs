//! Scheduled pushes: what each job says and when it fires.
//!
//! Every job is described by a [`JobDefinition`] in [`catalogue`]. At
//! registration each definition is moved into its own closure, so a job only
//! ever sees the hour and message kind it was created with.

use std::{ops::RangeInclusive, sync::Arc};

use {
    anyhow::Context,
    chrono::{NaiveDate, Utc},
    chrono_tz::Tz,
    dailybot_config::BotConfig,
    dailybot_cron::{schedule::daily_at, service::CronService, types::JobSpec},
    dailybot_feeds::{
        DEFAULT_INDICES, NewsClient, QuoteClient, WeatherClient, news_digest, stock_summary,
        weather_line,
    },
    dailybot_line::LineOutbound,
    tracing::info,
};

/// City sent to the weather provider.
pub const CITY_QUERY: &str = "Taipei";
/// City name shown in messages.
pub const CITY_LABEL: &str = "台北";
/// Headlines per news push.
pub const NEWS_LIMIT: usize = 5;
/// Hours that get a standalone weather update.
pub const HOURLY_WEATHER_HOURS: RangeInclusive<u32> = 9..=21;

/// The external data sources scheduled messages are built from.
#[derive(Clone)]
pub struct Feeds {
    pub weather: WeatherClient,
    pub quotes: QuoteClient,
    pub news: NewsClient,
}

impl Feeds {
    pub fn new(weather: WeatherClient, quotes: QuoteClient, news: NewsClient) -> Self {
        Self {
            weather,
            quotes,
            news,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &BotConfig) -> Self {
        let endpoints = &config.endpoints;
        Self::new(
            WeatherClient::new(
                http.clone(),
                endpoints.weather_api.clone(),
                config.weather_api_key.clone(),
            ),
            QuoteClient::new(http.clone(), endpoints.quote_api.clone()),
            NewsClient::new(http, endpoints.news_api.clone(), config.news_api_key.clone()),
        )
    }

    async fn weather_line(&self) -> anyhow::Result<String> {
        let weather = self
            .weather
            .current(CITY_QUERY)
            .await
            .context("weather lookup failed")?;
        Ok(weather_line(CITY_LABEL, &weather))
    }

    async fn stock_summary(&self) -> anyhow::Result<String> {
        let moves = self
            .quotes
            .moves(DEFAULT_INDICES)
            .await
            .context("quote lookup failed")?;
        Ok(stock_summary(&moves))
    }
}

/// Which message a job sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    MorningSummary,
    StockClose,
    News,
    HourlyWeather { hour: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub name: String,
    pub hour: u32,
    pub minute: u32,
    pub kind: JobKind,
}

impl JobDefinition {
    fn daily(name: impl Into<String>, hour: u32, kind: JobKind) -> Self {
        Self {
            name: name.into(),
            hour,
            minute: 0,
            kind,
        }
    }
}

/// Every scheduled push, in firing order within a day's groups.
pub fn catalogue() -> Vec<JobDefinition> {
    let mut jobs = vec![
        JobDefinition::daily("morning-summary", 8, JobKind::MorningSummary),
        JobDefinition::daily("news-noon", 12, JobKind::News),
        JobDefinition::daily("stock-close", 14, JobKind::StockClose),
        JobDefinition::daily("news-evening", 18, JobKind::News),
    ];
    jobs.extend(HOURLY_WEATHER_HOURS.map(|hour| {
        JobDefinition::daily(
            format!("weather-{hour:02}"),
            hour,
            JobKind::HourlyWeather { hour },
        )
    }));
    jobs
}

pub fn find_job(name: &str) -> Option<JobDefinition> {
    catalogue().into_iter().find(|job| job.name == name)
}

/// `☀️ 早安！今天是 2026/10/19 (Monday)`
pub fn daily_greeting(today: NaiveDate) -> String {
    format!("☀️ 早安！今天是 {}", today.format("%Y/%m/%d (%A)"))
}

pub async fn morning_summary(today: NaiveDate, feeds: &Feeds) -> anyhow::Result<String> {
    let weather = feeds.weather_line().await?;
    let stocks = feeds.stock_summary().await?;
    Ok(format!("{}\n{weather}\n\n{stocks}", daily_greeting(today)))
}

pub async fn stock_close(feeds: &Feeds) -> anyhow::Result<String> {
    feeds.stock_summary().await
}

pub async fn news_push(feeds: &Feeds) -> anyhow::Result<String> {
    let articles = feeds
        .news
        .top_headlines(NEWS_LIMIT)
        .await
        .context("news lookup failed")?;
    Ok(news_digest(&articles))
}

pub async fn hourly_weather(hour: u32, feeds: &Feeds) -> anyhow::Result<String> {
    let weather = feeds.weather_line().await?;
    Ok(format!("⏰ {hour:02}:00 天氣更新\n{weather}"))
}

/// Everything a job needs at run time, shared by all jobs.
pub struct JobContext {
    outbound: Arc<dyn LineOutbound>,
    feeds: Feeds,
    recipient: String,
    timezone: Tz,
}

impl JobContext {
    pub fn new(
        outbound: Arc<dyn LineOutbound>,
        feeds: Feeds,
        recipient: impl Into<String>,
        timezone: Tz,
    ) -> Self {
        Self {
            outbound,
            feeds,
            recipient: recipient.into(),
            timezone,
        }
    }

    pub fn outbound(&self) -> Arc<dyn LineOutbound> {
        Arc::clone(&self.outbound)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Build the message text for `kind` without sending it.
    pub async fn build(&self, kind: JobKind) -> anyhow::Result<String> {
        match kind {
            JobKind::MorningSummary => morning_summary(self.today(), &self.feeds).await,
            JobKind::StockClose => stock_close(&self.feeds).await,
            JobKind::News => news_push(&self.feeds).await,
            JobKind::HourlyWeather { hour } => hourly_weather(hour, &self.feeds).await,
        }
    }

    /// Build the message for `job` and push it to the recipient.
    pub async fn push(&self, job: &JobDefinition) -> anyhow::Result<()> {
        let text = self.build(job.kind).await?;
        self.outbound
            .push_text(&self.recipient, &text)
            .await
            .with_context(|| format!("push for {} failed", job.name))?;
        info!(job = %job.name, chars = text.chars().count(), "scheduled message pushed");
        Ok(())
    }
}

/// Register every catalogue job with the scheduler. Returns the job count.
pub async fn register_jobs(
    cron: &CronService,
    ctx: Arc<JobContext>,
) -> dailybot_cron::Result<usize> {
    let jobs = catalogue();
    for job in &jobs {
        let schedule = daily_at(job.hour, job.minute, Some(ctx.timezone()))?;
        let job = job.clone();
        let ctx = Arc::clone(&ctx);
        let spec = JobSpec::new(job.name.clone(), schedule, move || {
            let ctx = Arc::clone(&ctx);
            let job = job.clone();
            async move { ctx.push(&job).await }
        });
        cron.add(spec).await?;
    }
    Ok(jobs.len())
}
